// ==========================================
// 厨卫展厅管理后台 - 应用层
// ==========================================
// 职责: axum 集成,连接后台前端与导入API
// ==========================================

pub mod auth;
pub mod http;
pub mod state;

// 重导出
pub use http::{router, BULK_IMPORT_PATH};
pub use state::AppState;

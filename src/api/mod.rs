// ==========================================
// 厨卫展厅管理后台 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 HTTP 处理函数调用
// ==========================================

pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{BulkImportRequest, BulkImportResponse, ImportApi, UploadedFile};

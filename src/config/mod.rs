// ==========================================
// 厨卫展厅管理后台 - 配置层
// ==========================================
// 职责: 进程级设置（环境变量）+ 导入参数（config_kv 表）
// ==========================================

pub mod config_manager;
pub mod import_config_trait;
pub mod settings;

// 重导出核心配置管理器
pub use config_manager::{config_keys, defaults, ConfigManager};
pub use import_config_trait::{ConfigResult, ImportConfigReader};
pub use settings::{get_default_db_path, ServerSettings};

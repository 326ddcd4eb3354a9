// ==========================================
// 厨卫展厅管理后台 - 产品批量导入核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 管道: 解析 → 列映射 → 行转换 → 校验 + 重名检测 → 分块写入
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 表格文件
pub mod importer;

// 配置层 - 进程设置与导入参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - axum 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{FileType, ProductField, ProductStatus, UserRole};

// 领域实体
pub use domain::{
    BatchCommit, ImportOptions, ImportResult, ImportValidationError, ImportedProduct, Product,
    SessionUser, UpsertSummary,
};

// 导入器
pub use importer::{ProductImporter, ProductImporterImpl};

// API
pub use api::{ApiError, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "厨卫展厅管理后台 - 产品批量导入";

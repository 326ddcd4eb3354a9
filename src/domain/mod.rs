// ==========================================
// 厨卫展厅管理后台 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod product;
pub mod session;
pub mod types;

// 重导出核心类型
pub use product::{
    BatchCommit, ColumnMapping, ImportBatchSummary, ImportOptions, ImportResult, ImportResultSummary,
    ImportValidationError, ImportedProduct, ParsedSheet, Product, RawRow, Specifications,
    UpsertSummary,
};
pub use session::SessionUser;
pub use types::{FileType, ProductField, ProductStatus, UserRole};

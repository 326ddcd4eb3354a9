// ==========================================
// 厨卫展厅管理后台 - 导入层
// ==========================================
// 职责: 表格文件 → 产品数据（解析 / 映射 / 转换 / 校验 / 写入）
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod column_mapper;
pub mod duplicate_detector;
pub mod error;
pub mod file_parser;
pub mod product_importer_impl;
pub mod product_importer_trait;
pub mod row_transformer;
pub mod upsert_driver;
pub mod validator;

// 重导出核心类型
pub use column_mapper::ColumnMapper as ColumnMapperImpl;
pub use duplicate_detector::DuplicateDetector as DuplicateDetectorImpl;
pub use error::{ImportError, ImporterResult};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use product_importer_impl::ProductImporterImpl;
pub use row_transformer::RowTransformer as RowTransformerImpl;
pub use upsert_driver::{BatchUpsertDriver, UpsertOutcome};
pub use validator::{ProductValidator as ProductValidatorImpl, ValidationLimits};

// 重导出 Trait 接口
pub use product_importer_trait::{
    ColumnMapper, DuplicateDetector, FileParser, ProductImporter, ProductValidator,
    RowTransformer,
};

// ==========================================
// 厨卫展厅管理后台 - 产品导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 解析 → 列映射 → 行转换 → 校验 + 重名检测 → 分块写入
// ==========================================

use crate::domain::product::{
    BatchCommit, ColumnMapping, ImportOptions, ImportResult, ImportValidationError,
    ImportedProduct, ParsedSheet, RawRow,
};
use crate::domain::types::FileType;
use crate::importer::error::ImporterResult;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// ProductImporter Trait
// ==========================================
// 用途: 产品导入主接口
// 实现者: ProductImporterImpl
#[async_trait]
pub trait ProductImporter: Send + Sync {
    /// 解析并校验上传内容（不落库）
    ///
    /// # 参数
    /// - bytes: 文件内容
    /// - file_type: 调用方声明的文件类型
    /// - mapping: 显式列映射；None 时自动识别
    ///
    /// # 返回
    /// - Ok(ImportResult): 全部行 + 校验错误 + 重名提示
    /// - Err: 文件格式错误（行处理之前）
    async fn analyze(
        &self,
        bytes: &[u8],
        file_type: FileType,
        mapping: Option<&ColumnMapping>,
    ) -> ImporterResult<ImportResult>;

    /// 提交：剔除关键错误行后分块写入
    ///
    /// # 说明
    /// - 单行失败只记入 errors，不影响其他行
    async fn commit(
        &self,
        result: &ImportResult,
        options: &ImportOptions,
    ) -> ImporterResult<BatchCommit>;

    /// 导入本地文件（CLI 使用）：analyze + commit
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        mapping: Option<&ColumnMapping>,
        options: &ImportOptions,
    ) -> ImporterResult<(ImportResult, BatchCommit)>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析内存中的文件内容
    fn parse_bytes(&self, bytes: &[u8]) -> ImporterResult<ParsedSheet>;

    /// 解析磁盘文件
    fn parse_path(&self, file_path: &Path) -> ImporterResult<ParsedSheet> {
        if !file_path.exists() {
            return Err(crate::importer::error::ImportError::FileNotFound(
                file_path.display().to_string(),
            ));
        }
        let bytes = std::fs::read(file_path)?;
        self.parse_bytes(&bytes)
    }
}

// ==========================================
// ColumnMapper Trait
// ==========================================
// 用途: 表头自动识别（阶段 1）
// 实现者: ColumnMapperImpl
pub trait ColumnMapper: Send + Sync {
    /// 表头 → 字段映射；无任何匹配时返回空映射
    fn detect(&self, headers: &[String]) -> ColumnMapping;
}

// ==========================================
// RowTransformer Trait
// ==========================================
// 用途: 单元格类型转换（阶段 2）
// 实现者: RowTransformerImpl
pub trait RowTransformer: Send + Sync {
    /// 转换单行；任何转换失败只会让字段留空，不会报错
    fn transform(&self, row: &RawRow, mapping: &ColumnMapping) -> ImportedProduct;
}

// ==========================================
// ProductValidator Trait
// ==========================================
// 用途: 行级校验（阶段 3）
// 实现者: ProductValidatorImpl
pub trait ProductValidator: Send + Sync {
    /// 校验单行（row 为 1-based 序号），不短路
    fn validate_row(&self, row: usize, product: &ImportedProduct) -> Vec<ImportValidationError>;

    /// 校验全部行
    fn validate_all(&self, products: &[ImportedProduct]) -> Vec<ImportValidationError> {
        products
            .iter()
            .enumerate()
            .flat_map(|(idx, p)| self.validate_row(idx + 1, p))
            .collect()
    }
}

// ==========================================
// DuplicateDetector Trait
// ==========================================
// 用途: 同文件内重名检测（仅提示，不阻断）
// 实现者: DuplicateDetectorImpl
pub trait DuplicateDetector: Send + Sync {
    /// 每个出现多次的名称返回一条描述
    fn detect_duplicates(&self, products: &[ImportedProduct]) -> Vec<String>;
}

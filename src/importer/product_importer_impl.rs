// ==========================================
// 厨卫展厅管理后台 - 产品导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 解析 → 列映射 → 行转换 → 校验 + 重名检测 → 分块写入
// ==========================================

use crate::config::{ConfigResult, ImportConfigReader};
use crate::domain::product::{
    BatchCommit, ColumnMapping, ImportOptions, ImportResult, ParsedSheet,
};
use crate::domain::types::{FileType, ProductField};
use crate::i18n::{t, t_with_args};
use crate::importer::column_mapper::{unmapped_headers, ColumnMapper as ColumnMapperImpl};
use crate::importer::duplicate_detector::DuplicateDetector as DuplicateDetectorImpl;
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::product_importer_trait::{
    ColumnMapper, DuplicateDetector, ProductImporter, ProductValidator, RowTransformer,
};
use crate::importer::row_transformer::RowTransformer as RowTransformerImpl;
use crate::importer::upsert_driver::BatchUpsertDriver;
use crate::importer::validator::{ProductValidator as ProductValidatorImpl, ValidationLimits};
use crate::repository::ProductRepository;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

fn config_error(err: Box<dyn std::error::Error + Send + Sync>) -> ImportError {
    ImportError::InternalError(format!("failed to read import config: {}", err))
}

// ==========================================
// ProductImporterImpl - 产品导入器实现
// ==========================================
pub struct ProductImporterImpl<R, C>
where
    R: ProductRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    product_repo: Arc<R>,

    // 配置读取器
    config: Arc<C>,

    // 导入组件
    file_parser: UniversalFileParser,
    column_mapper: Box<dyn ColumnMapper>,
    row_transformer: Box<dyn RowTransformer>,
    duplicate_detector: Box<dyn DuplicateDetector>,
}

impl<R, C> ProductImporterImpl<R, C>
where
    R: ProductRepository,
    C: ImportConfigReader,
{
    /// 创建新的 ProductImporter 实例（使用默认组件）
    ///
    /// # 参数
    /// - product_repo: 产品仓储
    /// - config: 配置读取器
    pub fn new(product_repo: Arc<R>, config: Arc<C>) -> Self {
        Self {
            product_repo,
            config,
            file_parser: UniversalFileParser,
            column_mapper: Box::new(ColumnMapperImpl),
            row_transformer: Box::new(RowTransformerImpl),
            duplicate_detector: Box::new(DuplicateDetectorImpl),
        }
    }

    /// 按配置构造校验器
    async fn load_validator(&self) -> ConfigResult<ProductValidatorImpl> {
        Ok(ProductValidatorImpl::new(ValidationLimits {
            name_max_len: self.config.get_name_max_len().await?,
            description_max_len: self.config.get_description_max_len().await?,
            price_max: self.config.get_price_max().await?,
        }))
    }

    async fn check_size(&self, size: usize) -> ImporterResult<()> {
        let limit = self.config.get_max_file_bytes().await.map_err(config_error)?;
        if size > limit {
            warn!(size, limit, "upload exceeds size limit");
            return Err(ImportError::FileTooLarge { size, limit });
        }
        Ok(())
    }

    /// 解析后的表格 → ImportResult（不落库）
    fn build_result(
        &self,
        sheet: ParsedSheet,
        mapping: Option<&ColumnMapping>,
        validator: &dyn ProductValidator,
    ) -> ImportResult {
        let mut warnings = Vec::new();

        // === 步骤 1: 列映射 ===
        let mapping = match mapping {
            Some(explicit) => {
                for header in explicit.values() {
                    if !sheet.headers.contains(header) {
                        warnings.push(t_with_args(
                            "warnings.mapped_column_missing",
                            &[("column", header)],
                        ));
                    }
                }
                explicit.clone()
            }
            None => self.column_mapper.detect(&sheet.headers),
        };
        debug!(mapped_fields = mapping.len(), "column mapping resolved");

        if !mapping.contains_key(&ProductField::Name) {
            warnings.push(t("warnings.name_column_missing"));
        }
        let ignored = unmapped_headers(&sheet.headers, &mapping);
        if !ignored.is_empty() {
            warnings.push(t_with_args(
                "warnings.ignored_columns",
                &[("columns", &ignored.join(", "))],
            ));
        }

        // === 步骤 2: 行转换 ===
        let data: Vec<_> = sheet
            .rows
            .iter()
            .map(|row| self.row_transformer.transform(row, &mapping))
            .collect();

        // === 步骤 3: 校验 + 重名检测 ===
        let errors = validator.validate_all(&data);
        let duplicates = self.duplicate_detector.detect_duplicates(&data);
        if !duplicates.is_empty() {
            warnings.push(t_with_args(
                "warnings.duplicates_found",
                &[("count", &duplicates.len().to_string())],
            ));
        }

        let mut result = ImportResult {
            total_rows: data.len(),
            data,
            errors,
            duplicates,
            warnings,
            valid_rows: 0,
        };
        result.valid_rows = result.total_rows - result.critical_rows().len();
        result
    }
}

#[async_trait::async_trait]
impl<R, C> ProductImporter for ProductImporterImpl<R, C>
where
    R: ProductRepository + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip(self, bytes, mapping), fields(size = bytes.len()))]
    async fn analyze(
        &self,
        bytes: &[u8],
        file_type: FileType,
        mapping: Option<&ColumnMapping>,
    ) -> ImporterResult<ImportResult> {
        let start_time = Instant::now();
        self.check_size(bytes.len()).await?;

        let validator = self.load_validator().await.map_err(config_error)?;

        let sheet = self
            .file_parser
            .parse_bytes(bytes, file_type)
            .map_err(|e| {
                error!(error = %e, "file parsing failed");
                e
            })?;
        info!(
            headers = sheet.headers.len(),
            rows = sheet.rows.len(),
            "file parsed"
        );

        let result = self.build_result(sheet, mapping, &validator);
        info!(
            total_rows = result.total_rows,
            valid_rows = result.valid_rows,
            errors = result.errors.len(),
            duplicates = result.duplicates.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "import analysis finished"
        );
        Ok(result)
    }

    #[instrument(skip(self, result, options), fields(batch_id))]
    async fn commit(
        &self,
        result: &ImportResult,
        options: &ImportOptions,
    ) -> ImporterResult<BatchCommit> {
        let batch_id = options
            .bulk_import_batch
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let rows = result.importable_rows();
        let excluded = result.data.len() - rows.len();
        if excluded > 0 {
            warn!(excluded, "rows with critical errors excluded from commit");
        }

        let chunk_size = self
            .config
            .get_upsert_chunk_size()
            .await
            .map_err(config_error)?;
        let driver = BatchUpsertDriver::new(Arc::clone(&self.product_repo), chunk_size);
        let results = driver.run(&rows, options, &batch_id).await;

        Ok(BatchCommit { batch_id, results })
    }

    #[instrument(skip(self, file_path, mapping, options))]
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        mapping: Option<&ColumnMapping>,
        options: &ImportOptions,
    ) -> ImporterResult<(ImportResult, BatchCommit)> {
        let path = file_path.as_ref();
        info!(file_path = %path.display(), "importing products from file");

        if let Ok(meta) = std::fs::metadata(path) {
            self.check_size(meta.len() as usize).await?;
        }

        let validator = self.load_validator().await.map_err(config_error)?;
        let sheet = self.file_parser.parse(path)?;
        let result = self.build_result(sheet, mapping, &validator);
        let commit = self.commit(&result, options).await?;

        Ok((result, commit))
    }
}

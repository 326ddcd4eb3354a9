// ==========================================
// 厨卫展厅管理后台 - 产品批量导入API
// ==========================================
// 职责: 封装上传校验、元数据解析、预览/提交、导入历史
// 调用方: app::http 中的 axum 处理函数
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::domain::product::{
    ImportBatchSummary, ImportOptions, ImportResult, ImportResultSummary, Product, UpsertSummary,
};
use crate::domain::types::FileType;
use crate::i18n::t;
use crate::importer::column_mapper::mapping_from_keys;
use crate::importer::{ImportError, ProductImporter, ProductImporterImpl};
use crate::repository::{ProductRepository, ProductRepositoryImpl};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 允许上传的 MIME 类型（xlsx / xls / csv）
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "text/csv",
];

/// 默认导入器类型（SQLite 仓储 + config_kv 配置）
pub type DefaultProductImporter = ProductImporterImpl<ProductRepositoryImpl, ConfigManager>;

// ==========================================
// 请求结构
// ==========================================

/// 已接收的上传文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// multipart 中 metadata 字段的 JSON 结构
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportMetadata {
    pub file_type: FileType,
    /// 字段名 → 表头
    #[serde(default)]
    pub column_mapping: Option<HashMap<String, String>>,
    #[serde(default)]
    pub import_options: ImportOptions,
}

/// 一次批量导入请求（multipart 各字段）
#[derive(Debug, Clone, Default)]
pub struct BulkImportRequest {
    pub file: Option<UploadedFile>,
    pub metadata: Option<String>,
    pub preview: bool,
}

// ==========================================
// 响应结构
// ==========================================

/// 预览响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub success: bool,
    /// 恒为 true
    pub preview: bool,
    /// data 截断为前 N 行，其余字段完整
    pub result: ImportResult,
}

/// 提交响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub success: bool,
    pub batch_id: String,
    pub results: UpsertSummary,
    pub original_result: ImportResultSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BulkImportResponse {
    Preview(PreviewResponse),
    Committed(CommitResponse),
}

/// 导入历史响应
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ImportHistoryResponse {
    /// 全部批次（按最近导入时间倒序）
    Batches {
        success: bool,
        batches: Vec<ImportBatchSummary>,
    },
    /// 指定批次下的产品
    #[serde(rename_all = "camelCase")]
    BatchProducts {
        success: bool,
        batch_id: String,
        products: Vec<Product>,
    },
}

// ==========================================
// ImportApi
// ==========================================

/// 产品批量导入API
pub struct ImportApi {
    importer: Arc<DefaultProductImporter>,
    product_repo: Arc<ProductRepositoryImpl>,
    config: Arc<ConfigManager>,
}

impl ImportApi {
    pub fn new(
        importer: Arc<DefaultProductImporter>,
        product_repo: Arc<ProductRepositoryImpl>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            importer,
            product_repo,
            config,
        }
    }

    /// 批量导入（预览或提交）
    ///
    /// # 流程
    /// 1. 校验文件/元数据是否齐全、MIME 类型、大小
    /// 2. 解析元数据，执行解析 + 校验
    /// 3. preview=true 时直接返回截断结果
    /// 4. 存在关键错误时整批拒绝（400，附带完整结果）
    /// 5. 否则分块写入并返回统计
    #[instrument(skip(self, request), fields(preview = request.preview))]
    pub async fn bulk_import(&self, request: BulkImportRequest) -> ApiResult<BulkImportResponse> {
        let file = request
            .file
            .ok_or_else(|| ApiError::InvalidInput(t("api.missing_file")))?;
        let raw_metadata = request
            .metadata
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| ApiError::InvalidInput(t("api.missing_metadata")))?;

        self.validate_upload(&file).await?;
        let metadata = Self::parse_metadata(&raw_metadata)?;
        let mapping = metadata.column_mapping.as_ref().map(mapping_from_keys);

        info!(
            file_name = file.file_name.as_deref().unwrap_or(""),
            size = file.bytes.len(),
            file_type = ?metadata.file_type,
            explicit_mapping = mapping.is_some(),
            "bulk import request accepted"
        );

        let result = self
            .importer
            .analyze(&file.bytes, metadata.file_type, mapping.as_ref())
            .await?;

        if request.preview {
            let preview_rows = self
                .config
                .get_preview_rows()
                .await
                .map_err(|e| ApiError::InternalError(e.to_string()))?;
            return Ok(BulkImportResponse::Preview(PreviewResponse {
                success: true,
                preview: true,
                result: result.preview(preview_rows),
            }));
        }

        if result.has_critical_errors() {
            warn!(
                critical_rows = result.critical_rows().len(),
                "bulk import rejected: critical validation errors"
            );
            return Err(ApiError::CriticalValidation(Box::new(result)));
        }

        let commit = self
            .importer
            .commit(&result, &metadata.import_options)
            .await?;
        info!(
            batch_id = %commit.batch_id,
            imported = commit.results.imported,
            updated = commit.results.updated,
            skipped = commit.results.skipped,
            failed = commit.results.errors.len(),
            "bulk import committed"
        );

        Ok(BulkImportResponse::Committed(CommitResponse {
            success: true,
            batch_id: commit.batch_id,
            results: commit.results,
            original_result: result.summary(),
        }))
    }

    /// 导入历史：无 batch_id 时按批次聚合，否则列出该批次产品
    #[instrument(skip(self))]
    pub async fn import_history(&self, batch_id: Option<&str>) -> ApiResult<ImportHistoryResponse> {
        match batch_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(batch_id) => {
                let products = self.product_repo.list_by_batch(batch_id).await?;
                Ok(ImportHistoryResponse::BatchProducts {
                    success: true,
                    batch_id: batch_id.to_string(),
                    products,
                })
            }
            None => {
                let batches = self.product_repo.list_import_batches().await?;
                Ok(ImportHistoryResponse::Batches {
                    success: true,
                    batches,
                })
            }
        }
    }

    /// 上传文件校验：MIME 白名单 + 大小上限
    pub async fn validate_upload(&self, file: &UploadedFile) -> ApiResult<()> {
        if !is_allowed_mime(file.content_type.as_deref()) {
            warn!(content_type = ?file.content_type, "rejected upload with unsupported MIME type");
            return Err(ApiError::InvalidFile(t("api.invalid_file_type")));
        }

        let limit = self
            .config
            .get_max_file_bytes()
            .await
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        if file.bytes.len() > limit {
            return Err(ImportError::FileTooLarge {
                size: file.bytes.len(),
                limit,
            }
            .into());
        }

        Ok(())
    }

    /// 解析 metadata JSON
    pub fn parse_metadata(raw: &str) -> ApiResult<ImportMetadata> {
        serde_json::from_str(raw).map_err(|e| {
            warn!(error = %e, "failed to parse import metadata");
            ImportError::InvalidMetadata(e.to_string()).into()
        })
    }
}

/// MIME 是否在白名单内（忽略参数部分与大小写）
pub fn is_allowed_mime(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_MIME_TYPES.contains(&essence.as_str())
}

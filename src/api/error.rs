// ==========================================
// 厨卫展厅管理后台 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换导入/仓储错误为用户友好的错误消息
// HTTP: 实现 IntoResponse，统一输出 {"success": false, "error": "..."}
// ==========================================

use crate::domain::product::ImportResult;
use crate::i18n::{t, t_with_args};
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 认证与授权
    // ==========================================
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    // ==========================================
    // 请求错误
    // ==========================================
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid file: {0}")]
    InvalidFile(String),

    /// 存在关键校验错误（名称缺失/超长），整批拒绝
    #[error("file contains critical validation errors")]
    CriticalValidation(Box<ImportResult>),

    #[error("not found: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("database error: {0}")]
    DatabaseError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidInput(_)
            | ApiError::InvalidFile(_)
            | ApiError::CriticalValidation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) | ApiError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileTooLarge { limit, .. } => ApiError::file_too_large(limit),
            ImportError::UnsupportedFormat(_) => ApiError::InvalidFile(t("api.invalid_file_type")),
            // 元数据不合法按内部错误处理（记录日志，返回通用消息）
            ImportError::InvalidMetadata(msg) => {
                ApiError::InternalError(format!("invalid import metadata: {}", msg))
            }
            e if e.is_file_format_error() => ApiError::InvalidFile(e.to_string()),
            ImportError::Persistence(msg) => ApiError::DatabaseError(msg),
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            // 内部细节只写日志，不回给客户端
            tracing::error!(error = %self, "bulk import request failed");
            let body = json!({ "success": false, "error": t("api.internal_error") });
            return (status, Json(body)).into_response();
        }

        let body = match self {
            ApiError::CriticalValidation(result) => json!({
                "success": false,
                "error": t("api.critical_errors"),
                "result": result,
            }),
            other => json!({ "success": false, "error": other.message() }),
        };

        (status, Json(body)).into_response()
    }
}

impl ApiError {
    /// 文件超过上限（limit 单位为字节，消息中按 MB 显示）
    pub fn file_too_large(limit: usize) -> Self {
        ApiError::InvalidFile(t_with_args(
            "api.file_too_large",
            &[("limit", &(limit / (1024 * 1024)).to_string())],
        ))
    }

    /// 客户端可见的消息（不带分类前缀）
    fn message(&self) -> String {
        match self {
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::InvalidInput(msg)
            | ApiError::InvalidFile(msg)
            | ApiError::NotFound(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_conversion() {
        let api_err: ApiError = ImportError::FileTooLarge {
            size: 11 * 1024 * 1024,
            limit: 10 * 1024 * 1024,
        }
        .into();
        match api_err {
            ApiError::InvalidFile(msg) => assert!(msg.contains("10 MB")),
            other => panic!("Expected InvalidFile, got {:?}", other),
        }

        let api_err: ApiError = ImportError::MissingHeader.into();
        assert_eq!(api_err.status_code(), StatusCode::BAD_REQUEST);

        let api_err: ApiError = ImportError::Persistence("disk full".to_string()).into();
        assert_eq!(api_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let api_err: ApiError =
            ImportError::InvalidMetadata("expected value at line 1".to_string()).into();
        assert!(matches!(api_err, ApiError::InternalError(_)));
        assert_eq!(api_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "Product".to_string(),
            id: "P001".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Product"));
                assert!(msg.contains("P001"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(api_err, ApiError::DatabaseError(_)));
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let response = ApiError::InternalError("secret detail".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

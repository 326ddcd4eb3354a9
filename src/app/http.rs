// ==========================================
// 厨卫展厅管理后台 - HTTP 路由与处理函数
// ==========================================
// 路由: POST/GET /api/admin/products/bulk-import
// 中间件: 认证（require_staff）→ 请求体上限 → 413 改写 → 请求追踪
// ==========================================

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use axum::middleware::{from_fn_with_state, map_response_with_state};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::import_api::{
    BulkImportRequest, BulkImportResponse, ImportHistoryResponse, UploadedFile,
};
use crate::api::{ApiError, ApiResult};
use crate::app::auth::require_staff;
use crate::app::state::AppState;
use crate::domain::session::SessionUser;

pub const BULK_IMPORT_PATH: &str = "/api/admin/products/bulk-import";

/// multipart 包装开销（表单边界、metadata 字段等）
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// 上传文件大小上限（字节），供处理函数在流式读取超限时生成错误消息
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

/// 构建路由
///
/// # 参数
/// - body_limit: 上传文件大小上限（字节），实际请求体上限另加包装开销
pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route(BULK_IMPORT_PATH, post(bulk_import).get(import_history))
        .route_layer(from_fn_with_state(state.clone(), require_staff))
        .layer(Extension(UploadLimit(body_limit)))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            body_limit.saturating_add(MULTIPART_OVERHEAD_BYTES),
        ))
        .layer(map_response_with_state(body_limit, rewrite_payload_too_large))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 请求体上限层直接返回的 413（纯文本）改写为统一的 JSON 错误
async fn rewrite_payload_too_large(State(limit): State<usize>, response: Response) -> Response {
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }
    warn!(limit, "upload rejected by request body limit");
    ApiError::file_too_large(limit).into_response()
}

/// POST: 预览或提交批量导入
async fn bulk_import(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Extension(UploadLimit(limit)): Extension<UploadLimit>,
    multipart: Multipart,
) -> ApiResult<Json<BulkImportResponse>> {
    info!(user_id = %user.user_id, role = user.role.as_str(), "bulk import requested");

    let request = read_multipart(multipart, limit).await?;
    let response = state.import_api.bulk_import(request).await?;
    Ok(Json(response))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryQuery {
    batch_id: Option<String>,
}

/// GET: 导入历史
async fn import_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<ImportHistoryResponse>> {
    let response = state
        .import_api
        .import_history(query.batch_id.as_deref())
        .await?;
    Ok(Json(response))
}

/// 读取 multipart 表单（file / metadata / preview，其余字段忽略）
async fn read_multipart(mut multipart: Multipart, limit: usize) -> ApiResult<BulkImportRequest> {
    let mut request = BulkImportRequest::default();
    let map_err = move |e: MultipartError| multipart_error(e, limit);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(map_err)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(map_err)?;
                request.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "metadata" => {
                let text = field
                    .text()
                    .await
                    .map_err(map_err)?;
                request.metadata = Some(text);
            }
            "preview" => {
                let text = field
                    .text()
                    .await
                    .map_err(map_err)?;
                request.preview = parse_flag(&text);
            }
            _ => {}
        }
    }

    Ok(request)
}

/// 流式读取超出请求体上限时按文件过大处理，其余按请求格式错误处理
fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(limit, "multipart stream exceeded request body limit");
        return ApiError::file_too_large(limit);
    }
    ApiError::InvalidInput(err.body_text())
}

/// 表单布尔值："true" / "1" / "yes"（忽略大小写）
fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}

// ==========================================
// 厨卫展厅管理后台 - 认证中间件
// ==========================================
// 令牌来源: Authorization: Bearer <token> 或 session_token Cookie
// 放行条件: 会话存在、未过期、角色为后台员工
// ==========================================

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::api::ApiError;
use crate::app::state::AppState;
use crate::i18n::t;

/// 会话 Cookie 名
pub const SESSION_COOKIE: &str = "session_token";

/// 从请求头提取会话令牌（Bearer 优先）
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// 后台员工认证中间件
///
/// 通过后将 SessionUser 注入请求扩展
pub async fn require_staff(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token =
        extract_token(req.headers()).ok_or_else(|| ApiError::Unauthorized(t("api.unauthorized")))?;

    let session = state
        .session_repo
        .find_by_token(&token)?
        .filter(|s| !s.is_expired(Utc::now()))
        .ok_or_else(|| ApiError::Unauthorized(t("api.unauthorized")))?;

    if !session.role.is_staff() {
        tracing::warn!(user_id = %session.user_id, role = session.role.as_str(), "bulk import denied");
        return Err(ApiError::Forbidden(t("api.forbidden")));
    }

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_token_prefers_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session_token=xyz"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_token=xyz; lang=en"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_extract_token_missing() {
        let mut headers = HeaderMap::new();
        assert!(extract_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_token(&headers).is_none());
    }
}

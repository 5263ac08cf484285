//! Reference Console Routes
//!
//! - GET /api/v1/reference/:kind - List a reference collection
//! - POST /api/v1/reference/:kind - Create a record (Bearer token required)
//! - POST /api/v1/login - Exchange credentials for a token

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::api::dto::LoginBody;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::remote::{NewReferenceItem, ReferenceItem, ReferenceKind, TokenResponse};

/// GET /api/v1/reference/:kind
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<Json<Vec<ReferenceItem>>> {
    let kind: ReferenceKind = kind.parse()?;
    let items = state.console.list(kind).await?;
    Ok(Json(items))
}

/// POST /api/v1/reference/:kind
///
/// The payload is validated before it is forwarded upstream.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<(StatusCode, Json<ReferenceItem>)> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;
    let kind: ReferenceKind = kind.parse()?;

    let item = NewReferenceItem::from_json(kind, body)?;
    item.validate()?;

    let created = state.console.create(token, &item).await?;
    tracing::info!(kind = %kind, id = created.summary().0, "Reference record created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/v1/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginBody>,
) -> ApiResult<Json<TokenResponse>> {
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::Unauthorized);
    }
    let token = state.console.login(&body.username, &body.password).await?;
    Ok(Json(token))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }
}

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::api::ApiError;
use crate::services::TokenService;

/// Reject requests without a valid bearer token. On success the verified
/// `Claims` are stored in the request extensions for handlers to read.
pub async fn require_bearer(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(&req) else {
        tracing::debug!("Missing bearer token for {}", req.uri().path());
        return Err(ApiError::Unauthorized("Missing bearer token".to_string()));
    };

    let claims = tokens.verify(token).map_err(|e| {
        tracing::debug!("Rejected bearer token for {}: {}", req.uri().path(), e);
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Option<&str> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .trim();

    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

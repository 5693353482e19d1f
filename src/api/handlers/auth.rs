use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use crate::api::{
    dto::{LoginRequest, LoginResponse, MeResponse},
    error::ApiError,
    extract::JsonBody,
};
use crate::services::{AuthService, Claims};

pub async fn login(
    State(service): State<Arc<AuthService>>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = service.login(&payload.username, &payload.password).await?;

    Ok(Json(token.into()))
}

pub async fn me(Extension(claims): Extension<Claims>) -> Json<MeResponse> {
    Json(claims.into())
}

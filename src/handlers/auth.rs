//! 认证相关的 HTTP 处理器

use crate::{
    auth::middleware::Actor,
    error::AppError,
    handlers::ValidatedJson,
    middleware::AppState,
    models::{auth::*, user::UserResponse},
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User successfully registered")),
    ))
}

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let token_pair = state.auth_service.login(req).await?;

    Ok(Json(token_pair))
}

/// 刷新令牌
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let token_pair = state.auth_service.refresh(&req.refresh_token).await?;

    Ok(Json(token_pair))
}

/// 登出
pub async fn logout(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.logout(actor.user_id).await?;

    Ok(Json(MessageResponse::new("Logout successfully")))
}

/// 当前用户信息
pub async fn me(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.current_user(&actor).await?;

    Ok(Json(UserResponse::from(user)))
}

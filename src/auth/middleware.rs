//! JWT 认证中间件

use crate::{
    auth::jwt::{Claims, JwtService},
    error::AppError,
    models::Role,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated identity for the lifetime of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins and editors may author news
    pub fn can_author(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Editor)
    }
}

impl TryFrom<Claims> for Actor {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        if claims.user_id <= 0 {
            tracing::debug!(user_id = claims.user_id, "Token carries invalid user id");
            return Err(AppError::Unauthorized);
        }

        let role = claims.role.ok_or_else(|| {
            tracing::debug!(user_id = claims.user_id, "Access token without role");
            AppError::Unauthorized
        })?;

        Ok(Actor {
            user_id: claims.user_id,
            role,
        })
    }
}

// 实现 FromRequestParts 以便在 handler 中直接提取 Actor
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

/// 从 Authorization 头提取令牌
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)
}

/// 校验令牌并解析出 Actor
pub fn authenticate(jwt_service: &JwtService, headers: &HeaderMap) -> Result<Actor, AppError> {
    let token = extract_token(headers)?;
    let claims = jwt_service.validate_access_token(token)?;
    Actor::try_from(claims)
}

/// JWT 认证中间件 - 必须认证
pub async fn jwt_auth_middleware(
    State(jwt_service): State<Arc<JwtService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let actor = authenticate(&jwt_service, req.headers())?;

    tracing::debug!(user_id = actor.user_id, role = %actor.role, "Request authenticated");

    // 附加到请求扩展
    req.extensions_mut().insert(actor);

    Ok(next.run(req).await)
}

//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    http::{header, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};

use crate::{auth::jwt_auth_middleware, handlers, middleware::AppState};

/// 请求体大小上限
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 无需认证的接口
    let auth_routes = Router::new()
        .route("/api/register", post(handlers::auth::register))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/refresh", post(handlers::auth::refresh_token))
        .route("/api/news", get(handlers::news::list_news))
        .route("/api/news/{id}", get(handlers::news::get_news));

    // 需要认证的路由；同路径的 GET 与写操作按方法合并
    // route_layer 只包裹已匹配的路由，未知路径仍返回 404
    let authenticated_routes = Router::new()
        .route("/api/me", get(handlers::auth::me))
        .route("/api/logout", post(handlers::auth::logout))
        .route("/api/news", post(handlers::news::create_news))
        .route(
            "/api/news/{id}",
            put(handlers::news::update_news).delete(handlers::news::delete_news),
        )
        .route_layer(from_fn_with_state(state.jwt_service.clone(), jwt_auth_middleware));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(authenticated_routes)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}

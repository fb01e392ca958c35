//! HTTP 中间件与应用状态
//! 请求追踪（trace_id / request_id）和指标记录

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::{JwtService, PasswordHasher, SessionStore},
    config::AppConfig,
    error::AppError,
    repository::{NewsRepository, PgNewsRepository, PgUserRepository, UserRepository},
    services::{AuthService, NewsService},
};

/// 应用状态
///
/// 服务通过 Arc 共享，仓储与会话存储以 trait 对象注入。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: PgPool,
    pub jwt_service: Arc<JwtService>,
    pub sessions: Arc<dyn SessionStore>,
    pub auth_service: Arc<AuthService>,
    pub news_service: Arc<NewsService>,
}

impl AppState {
    /// 使用 PostgreSQL 仓储构建状态
    pub fn new(
        config: AppConfig,
        db: PgPool,
        sessions: Arc<dyn SessionStore>,
        hasher: PasswordHasher,
    ) -> Result<Self, AppError> {
        let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(db.clone()));
        let news: Arc<dyn NewsRepository> = Arc::new(PgNewsRepository::new(db.clone()));

        Self::with_repositories(config, db, users, news, sessions, hasher)
    }

    /// 使用指定的仓储实现构建状态
    pub fn with_repositories(
        config: AppConfig,
        db: PgPool,
        users: Arc<dyn UserRepository>,
        news: Arc<dyn NewsRepository>,
        sessions: Arc<dyn SessionStore>,
        hasher: PasswordHasher,
    ) -> Result<Self, AppError> {
        let jwt_service = Arc::new(JwtService::from_config(&config)?);

        let auth_service = Arc::new(AuthService::new(
            users,
            sessions.clone(),
            jwt_service.clone(),
            hasher,
            &config.security,
        ));
        let news_service = Arc::new(NewsService::new(news, &config.security));

        Ok(Self {
            config,
            db,
            jwt_service,
            sessions,
            auth_service,
            news_service,
        })
    }
}

tokio::task_local! {
    static REQUEST_ID: String;
}

/// 当前请求的 request_id；在请求作用域之外生成新的
pub fn current_request_id() -> String {
    REQUEST_ID
        .try_with(|id| id.clone())
        .unwrap_or_else(|_| Uuid::new_v4().to_string())
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let uri = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let mut response = REQUEST_ID.scope(request_id.clone(), next.run(req)).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        metrics::counter!(
            "http_requests_total",
            "method" => method_label(method.as_str()),
            "status" => status_label(status)
        )
        .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

// 指标标签需要 'static 字符串
fn method_label(method: &str) -> &'static str {
    match method {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        "OPTIONS" => "OPTIONS",
        _ => "UNKNOWN",
    }
}

fn status_label(status: u16) -> &'static str {
    match status {
        200 => "200",
        201 => "201",
        400 => "400",
        401 => "401",
        403 => "403",
        404 => "404",
        413 => "413",
        500 => "500",
        503 => "503",
        _ => "other",
    }
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_or_generate_trace_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-trace-id", "test-trace-123".parse().unwrap());

        let trace_id = extract_or_generate_trace_id(&headers);
        assert_eq!(trace_id, "test-trace-123");

        let headers = HeaderMap::new();
        let trace_id = extract_or_generate_trace_id(&headers);
        assert!(!trace_id.is_empty());
        assert_ne!(trace_id, "test-trace-123");
    }

    #[test]
    fn test_labels() {
        assert_eq!(method_label("DELETE"), "DELETE");
        assert_eq!(method_label("TRACE"), "UNKNOWN");
        assert_eq!(status_label(401), "401");
        assert_eq!(status_label(418), "other");
    }

    #[tokio::test]
    async fn test_current_request_id_scoped() {
        let id = REQUEST_ID
            .scope("req-1".to_string(), async { current_request_id() })
            .await;
        assert_eq!(id, "req-1");

        // 作用域之外生成新的 uuid
        assert_eq!(current_request_id().len(), 36);
    }
}

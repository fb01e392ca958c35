//! Business logic services layer

pub mod auth_service;
pub mod news_service;

pub use auth_service::AuthService;
pub use news_service::NewsService;

use crate::error::AppError;
use std::future::Future;
use std::time::Duration;

/// 为单个业务操作设置截止时间；超时按内部错误返回
pub(crate) async fn with_deadline<T, F>(timeout: Duration, operation: &str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(operation, timeout_ms = timeout.as_millis() as u64, "Operation deadline exceeded");
            Err(AppError::internal_error(&format!("{} timed out", operation)))
        }
    }
}

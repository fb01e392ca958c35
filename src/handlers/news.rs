//! 新闻相关的 HTTP 处理器

use crate::{
    auth::middleware::Actor,
    error::AppError,
    handlers::{ApiPath, ApiQuery, ValidatedJson},
    middleware::AppState,
    models::news::*,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 新闻列表
pub async fn list_news(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<NewsListParams>,
) -> Result<impl IntoResponse, AppError> {
    let news = state.news_service.list(params).await?;

    Ok(Json(json!({
        "news": news,
        "count": news.len()
    })))
}

/// 新闻详情
pub async fn get_news(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let news = state.news_service.get(id).await?;

    Ok(Json(news))
}

/// 创建新闻
pub async fn create_news(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    ValidatedJson(req): ValidatedJson<CreateNewsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let news = state.news_service.create(&actor, req).await?;

    Ok((StatusCode::CREATED, Json(news)))
}

/// 更新新闻
pub async fn update_news(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(req): ValidatedJson<UpdateNewsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let news = state.news_service.update(&actor, id, req).await?;

    Ok(Json(news))
}

/// 删除新闻（仅管理员）
pub async fn delete_news(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.news_service.delete(&actor, id).await?;

    Ok(Json(json!({"status": "deleted"})))
}

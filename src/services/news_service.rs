//! 新闻服务：创建、更新、删除、查询

use crate::{
    auth::middleware::Actor,
    config::SecurityConfig,
    error::AppError,
    models::news::{CreateNewsRequest, News, NewsListParams, UpdateNewsRequest},
    repository::NewsRepository,
    services::with_deadline,
};
use std::sync::Arc;
use std::time::Duration;

/// 标题最大长度（按字符计）
pub const MAX_TITLE_LEN: usize = 255;

pub struct NewsService {
    news: Arc<dyn NewsRepository>,
    operation_timeout: Duration,
}

impl NewsService {
    pub fn new(news: Arc<dyn NewsRepository>, security: &SecurityConfig) -> Self {
        Self {
            news,
            operation_timeout: Duration::from_secs(security.operation_timeout_secs),
        }
    }

    /// 创建新闻，作者为当前用户
    pub async fn create(&self, actor: &Actor, req: CreateNewsRequest) -> Result<News, AppError> {
        with_deadline(self.operation_timeout, "create_news", async {
            if !actor.can_author() {
                return Err(AppError::Forbidden);
            }

            let title = validate_title(&req.title)?;
            let description = validate_description(&req.description)?;

            let news = self.news.create(title, description, actor.user_id).await?;

            tracing::info!(news_id = news.id, author_id = actor.user_id, "News created");
            Ok(news)
        })
        .await
    }

    /// 部分更新：未提供的字段保留原值
    pub async fn update(&self, actor: &Actor, id: i64, req: UpdateNewsRequest) -> Result<News, AppError> {
        with_deadline(self.operation_timeout, "update_news", async {
            if !actor.can_author() {
                return Err(AppError::Forbidden);
            }
            validate_id(id)?;

            if req.title.is_none() && req.description.is_none() {
                return Err(AppError::validation("nothing to update"));
            }

            let existing = self
                .news
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::not_found("news"))?;

            let title = match req.title.as_deref() {
                Some(title) => validate_title(title)?,
                None => existing.title.as_str(),
            };
            let description = match req.description.as_deref() {
                Some(description) => validate_description(description)?,
                None => existing.description.as_str(),
            };

            // 记录可能在读取后被并发删除
            let news = self
                .news
                .update(id, title, description)
                .await?
                .ok_or_else(|| AppError::not_found("news"))?;

            tracing::info!(news_id = id, user_id = actor.user_id, "News updated");
            Ok(news)
        })
        .await
    }

    /// 删除新闻，仅管理员
    pub async fn delete(&self, actor: &Actor, id: i64) -> Result<(), AppError> {
        with_deadline(self.operation_timeout, "delete_news", async {
            if !actor.is_admin() {
                tracing::warn!(news_id = id, user_id = actor.user_id, "Non-admin delete attempt");
                return Err(AppError::Forbidden);
            }
            validate_id(id)?;

            if !self.news.delete(id).await? {
                return Err(AppError::not_found("news"));
            }

            tracing::info!(news_id = id, user_id = actor.user_id, "News deleted");
            Ok(())
        })
        .await
    }

    pub async fn get(&self, id: i64) -> Result<News, AppError> {
        with_deadline(self.operation_timeout, "get_news", async {
            validate_id(id)?;
            self.news
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::not_found("news"))
        })
        .await
    }

    /// 分页列表，按创建时间倒序
    pub async fn list(&self, mut params: NewsListParams) -> Result<Vec<News>, AppError> {
        with_deadline(self.operation_timeout, "list_news", async {
            params.normalize();
            if let Some(author_id) = params.author_id {
                validate_id(author_id)?;
            }
            self.news.list(&params).await
        })
        .await
    }
}

fn validate_id(id: i64) -> Result<(), AppError> {
    if id <= 0 {
        return Err(AppError::validation("id must be a positive integer"));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<&str, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::validation("title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(title)
}

fn validate_description(description: &str) -> Result<&str, AppError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(AppError::validation("description must not be empty"));
    }
    Ok(description)
}

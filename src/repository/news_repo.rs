//! News repository (数据库访问层)

use crate::{
    error::AppError,
    models::news::{News, NewsListParams},
};
use async_trait::async_trait;
use sqlx::PgPool;

/// 新闻持久化接口
#[async_trait]
pub trait NewsRepository: Send + Sync {
    async fn create(&self, title: &str, description: &str, author_id: i64) -> Result<News, AppError>;

    /// 更新标题和正文，记录不存在时返回 `Ok(None)`
    async fn update(&self, id: i64, title: &str, description: &str) -> Result<Option<News>, AppError>;

    /// 删除记录，返回是否真的删除了一行
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<News>, AppError>;

    /// 列表查询，参数需已 normalize
    async fn list(&self, params: &NewsListParams) -> Result<Vec<News>, AppError>;
}

pub struct PgNewsRepository {
    db: PgPool,
}

impl PgNewsRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NewsRepository for PgNewsRepository {
    async fn create(&self, title: &str, description: &str, author_id: i64) -> Result<News, AppError> {
        let news = sqlx::query_as::<_, News>(
            r#"
            INSERT INTO news (title, description, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, author_id, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(author_id)
        .fetch_one(&self.db)
        .await?;

        Ok(news)
    }

    async fn update(&self, id: i64, title: &str, description: &str) -> Result<Option<News>, AppError> {
        let news = sqlx::query_as::<_, News>(
            r#"
            UPDATE news
            SET title = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, author_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .fetch_optional(&self.db)
        .await?;

        Ok(news)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<News>, AppError> {
        let news = sqlx::query_as::<_, News>(
            "SELECT id, title, description, author_id, created_at, updated_at FROM news WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(news)
    }

    async fn list(&self, params: &NewsListParams) -> Result<Vec<News>, AppError> {
        let mut query = String::from(
            "SELECT id, title, description, author_id, created_at, updated_at FROM news WHERE 1=1",
        );
        let mut index = 0;

        if params.author_id.is_some() {
            index += 1;
            query.push_str(&format!(" AND author_id = ${}", index));
        }
        if params.search.is_some() {
            index += 1;
            query.push_str(&format!(" AND title ILIKE ${}", index));
        }

        query.push_str(&format!(
            " ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
            index + 1,
            index + 2
        ));

        let mut query_builder = sqlx::query_as::<_, News>(&query);

        if let Some(author_id) = params.author_id {
            query_builder = query_builder.bind(author_id);
        }
        let search_pattern;
        if let Some(search) = &params.search {
            search_pattern = format!("%{}%", search.trim());
            query_builder = query_builder.bind(&search_pattern);
        }

        let news = query_builder
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(&self.db)
            .await?;

        Ok(news)
    }
}

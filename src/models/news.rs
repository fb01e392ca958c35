//! News domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// News article
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create news request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateNewsRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
}

/// Update news request; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateNewsRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: Option<String>,
}

/// List query (`?limit=&offset=&author_id=&search=`)
///
/// Unparseable numbers are ignored rather than rejected: a bad `limit` or
/// `offset` falls back to the default, a bad `author_id` drops the filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsListParams {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub limit: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub offset: i64,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub author_id: Option<i64>,
    pub search: Option<String>,
}

fn lenient_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_i64(deserializer)?.unwrap_or(0))
}

impl NewsListParams {
    /// Clamp paging into range and drop a blank search term.
    pub fn normalize(&mut self) {
        if self.limit <= 0 {
            self.limit = DEFAULT_PAGE_LIMIT;
        }
        if self.limit > MAX_PAGE_LIMIT {
            self.limit = MAX_PAGE_LIMIT;
        }
        if self.offset < 0 {
            self.offset = 0;
        }
        if self
            .search
            .as_deref()
            .is_some_and(|s| s.trim().is_empty())
        {
            self.search = None;
        }
    }
}

//! Refresh-token session store
//!
//! Maps a user id to the single refresh token currently allowed for that user.
//! Saving overwrites whatever was there, so issuing a new token revokes the
//! previous one; invalidating removes it.

use crate::error::AppError;
use async_trait::async_trait;
use dashmap::DashMap;
use redis::aio::ConnectionManager;
use std::time::{Duration, Instant};

/// Redis key for a user's refresh token
pub fn session_key(user_id: i64) -> String {
    format!("refresh_token:{}", user_id)
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Upsert the user's refresh token with a TTL
    async fn save(&self, user_id: i64, refresh_token: &str, ttl: Duration) -> Result<(), AppError>;

    /// Current refresh token, if the session is still live
    async fn get(&self, user_id: i64) -> Result<Option<String>, AppError>;

    /// Drop the session. Missing sessions are not an error.
    async fn invalidate(&self, user_id: i64) -> Result<(), AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

/// Redis-backed store
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, user_id: i64, refresh_token: &str, ttl: Duration) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(session_key(user_id))
            .arg(refresh_token)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(())
    }

    async fn get(&self, user_id: i64) -> Result<Option<String>, AppError> {
        let mut conn = self.conn.clone();
        let token = redis::cmd("GET")
            .arg(session_key(user_id))
            .query_async::<_, Option<String>>(&mut conn)
            .await?;

        Ok(token)
    }

    async fn invalidate(&self, user_id: i64) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        redis::cmd("DEL")
            .arg(session_key(user_id))
            .query_async::<_, i64>(&mut conn)
            .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;

        Ok(())
    }
}

/// In-process store for single-instance deployments and tests.
/// Expired entries are dropped lazily on read.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: DashMap<i64, (String, Instant)>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, user_id: i64, refresh_token: &str, ttl: Duration) -> Result<(), AppError> {
        self.entries
            .insert(user_id, (refresh_token.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn get(&self, user_id: i64) -> Result<Option<String>, AppError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(&user_id) {
            if entry.1 > now {
                return Ok(Some(entry.0.clone()));
            }
        }

        self.entries
            .remove_if(&user_id, |_, (_, expires_at)| *expires_at <= now);
        Ok(None)
    }

    async fn invalidate(&self, user_id: i64) -> Result<(), AppError> {
        self.entries.remove(&user_id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

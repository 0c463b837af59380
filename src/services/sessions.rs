//! Redis-backed session counters

use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

/// Session entries expire after two weeks without a visit
pub const SESSION_TTL_SECONDS: i64 = 14 * 24 * 3600;

#[derive(Clone)]
pub struct SessionService {
    client: Client,
}

impl SessionService {
    /// Wrap a client without connecting; connections are opened per call
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Open the client and check the server answers
    pub async fn connect(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client })
    }

    fn visits_key(session_id: &str) -> String {
        format!("session:{}:num_visits", session_id)
    }

    /// Bump the visit counter of a session and return the new value
    pub async fn record_visit(&self, session_id: &str) -> AppResult<i64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = Self::visits_key(session_id);
        let visits: i64 = conn.incr(&key, 1).await?;
        conn.expire::<_, ()>(&key, SESSION_TTL_SECONDS).await?;

        Ok(visits)
    }
}

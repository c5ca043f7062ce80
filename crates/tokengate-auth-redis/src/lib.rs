//! Redis backend for the tokengate-auth cache and set-registry traits.
//!
//! Multi-instance deployments share one Redis: TTL'd keys back the cache
//! projections and rate-limit windows, native sets back the revocation
//! registry and session membership.
//!
//! Errors propagate to the caller instead of degrading to a cache miss: a
//! rate-limit or blacklist check that cannot reach the store must fail the
//! calling operation closed, never silently fall through to the durable
//! store.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;

use tokengate_auth::cache::{CacheStore, SetRegistry};
use tokengate_auth::{AuthError, AuthResult};

/// Errors raised while building the Redis pool.
#[derive(Debug, thiserror::Error)]
pub enum RedisBackendError {
    /// The pool could not be created from the given URL.
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(#[from] deadpool_redis::CreatePoolError),
}

/// Creates a connection pool for the given Redis URL.
///
/// # Errors
///
/// Returns an error if the URL is invalid or the pool cannot be built.
pub fn connect(url: &str) -> Result<Pool, RedisBackendError> {
    let pool = Config::from_url(url).create_pool(Some(Runtime::Tokio1))?;
    Ok(pool)
}

async fn get_connection(pool: &Pool) -> AuthResult<Connection> {
    pool.get()
        .await
        .map_err(|e| AuthError::cache(format!("Redis connection unavailable: {e}")))
}

/// SETEX takes whole seconds; a sub-second window still has to hold for
/// at least one.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

// ============================================================================
// Cache Store
// ============================================================================

/// Redis-backed key/value cache with per-key TTL.
#[derive(Clone)]
pub struct RedisCacheStore {
    pool: Pool,
}

impl RedisCacheStore {
    /// Creates a cache store over the given pool.
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let mut conn = get_connection(&self.pool).await?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| AuthError::cache(format!("Redis GET failed: {e}")))?;

        tracing::debug!(key = %key, hit = value.is_some(), "cache get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()> {
        let mut conn = get_connection(&self.pool).await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_secs(ttl))
            .await
            .map_err(|e| AuthError::cache(format!("Redis SETEX failed: {e}")))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> AuthResult<()> {
        let mut conn = get_connection(&self.pool).await?;
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| AuthError::cache(format!("Redis DEL failed: {e}")))?;

        Ok(())
    }
}

// ============================================================================
// Set Registry
// ============================================================================

/// Redis-backed set-membership store.
#[derive(Clone)]
pub struct RedisSetRegistry {
    pool: Pool,
}

impl RedisSetRegistry {
    /// Creates a set registry over the given pool.
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SetRegistry for RedisSetRegistry {
    async fn add(&self, set: &str, member: &str) -> AuthResult<()> {
        let mut conn = get_connection(&self.pool).await?;
        conn.sadd::<_, _, ()>(set, member)
            .await
            .map_err(|e| AuthError::cache(format!("Redis SADD failed: {e}")))?;

        Ok(())
    }

    async fn remove(&self, set: &str, member: &str) -> AuthResult<()> {
        let mut conn = get_connection(&self.pool).await?;
        conn.srem::<_, _, ()>(set, member)
            .await
            .map_err(|e| AuthError::cache(format!("Redis SREM failed: {e}")))?;

        Ok(())
    }

    async fn contains(&self, set: &str, member: &str) -> AuthResult<bool> {
        let mut conn = get_connection(&self.pool).await?;
        let member_of: bool = conn
            .sismember(set, member)
            .await
            .map_err(|e| AuthError::cache(format!("Redis SISMEMBER failed: {e}")))?;

        Ok(member_of)
    }
}

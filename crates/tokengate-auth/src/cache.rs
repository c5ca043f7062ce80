//! Cache and set-registry store traits.
//!
//! The engine consumes two volatile-store primitives: a key/value cache
//! with per-key TTL, and a set store used for revocation registries and
//! membership bookkeeping. Both are reached over a network and can fail
//! independently of the durable store; a failed call fails the calling
//! operation closed rather than silently bypassing the cache contract.
//!
//! # Implementations
//!
//! - In-memory (this crate, [`crate::memory`]) for tests and
//!   single-instance deployments
//! - Redis (`tokengate-auth-redis` crate) for multi-instance deployments

use std::time::Duration;

use async_trait::async_trait;

use crate::AuthResult;

/// Key/value cache with per-key TTL.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Gets the value for `key`, or `None` if absent or expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache store is unreachable or the call
    /// fails; callers must treat that as a failure of the whole operation.
    async fn get(&self, key: &str) -> AuthResult<Option<String>>;

    /// Sets `key` to `value`, expiring after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache store operation fails.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()>;

    /// Deletes `key`. Deleting an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache store operation fails.
    async fn delete(&self, key: &str) -> AuthResult<()>;
}

/// Set-membership store.
///
/// Backs the four blacklist namespaces and the per-user session membership
/// set. All operations are idempotent, which makes retries safe without
/// any locking discipline.
#[async_trait]
pub trait SetRegistry: Send + Sync {
    /// Adds `member` to `set`. Adding twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the set store operation fails.
    async fn add(&self, set: &str, member: &str) -> AuthResult<()>;

    /// Removes `member` from `set`. Removing an absent member is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the set store operation fails.
    async fn remove(&self, set: &str, member: &str) -> AuthResult<()>;

    /// Returns `true` if `member` is in `set`.
    ///
    /// # Errors
    ///
    /// Returns an error if the set store operation fails.
    async fn contains(&self, set: &str, member: &str) -> AuthResult<bool>;
}

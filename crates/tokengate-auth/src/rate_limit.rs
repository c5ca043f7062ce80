//! Fixed-window rate limiter.
//!
//! A presence key with a TTL: the first acquisition in a window sets the
//! key and succeeds, every further attempt fails until the key expires.
//! Not a sliding window or token bucket — one outstanding request per
//! subject per window is the whole contract.

use std::sync::Arc;
use std::time::Duration;

use crate::AuthResult;
use crate::cache::CacheStore;

/// Per-subject fixed-window throttle over the cache store.
#[derive(Clone)]
pub struct RateLimiter {
    cache: Arc<dyn CacheStore>,
}

impl RateLimiter {
    /// Creates a new limiter over the given cache store.
    #[must_use]
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    /// Attempts to acquire the window for `subject_key`.
    ///
    /// Returns `false` if the key is already present (the caller must
    /// reject the request); sets the key with TTL `window` and returns
    /// `true` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache store fails; callers fail closed.
    pub async fn try_acquire(&self, subject_key: &str, window: Duration) -> AuthResult<bool> {
        if self.cache.get(subject_key).await?.is_some() {
            tracing::debug!(key = %subject_key, "rate limit window already held");
            return Ok(false);
        }

        self.cache.set(subject_key, "1", window).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCache;

    #[tokio::test]
    async fn test_first_acquire_succeeds() {
        let limiter = RateLimiter::new(Arc::new(InMemoryCache::new()));
        assert!(
            limiter
                .try_acquire("limits:test:u1", Duration::from_secs(60))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_second_acquire_within_window_fails() {
        let limiter = RateLimiter::new(Arc::new(InMemoryCache::new()));
        assert!(
            limiter
                .try_acquire("limits:test:u1", Duration::from_secs(60))
                .await
                .unwrap()
        );
        assert!(
            !limiter
                .try_acquire("limits:test:u1", Duration::from_secs(60))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_acquire_after_window_elapses() {
        let limiter = RateLimiter::new(Arc::new(InMemoryCache::new()));
        assert!(
            limiter
                .try_acquire("limits:test:u1", Duration::from_millis(20))
                .await
                .unwrap()
        );

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(
            limiter
                .try_acquire("limits:test:u1", Duration::from_secs(60))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_subjects_are_independent() {
        let limiter = RateLimiter::new(Arc::new(InMemoryCache::new()));
        assert!(
            limiter
                .try_acquire("limits:test:u1", Duration::from_secs(60))
                .await
                .unwrap()
        );
        assert!(
            limiter
                .try_acquire("limits:test:u2", Duration::from_secs(60))
                .await
                .unwrap()
        );
    }
}

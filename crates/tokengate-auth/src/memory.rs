//! In-memory store backends.
//!
//! DashMap-based implementations of every store trait the engine
//! consumes, for tests and single-instance deployments. TTL expiry is
//! checked on read, so no background eviction task is required.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::AuthResult;
use crate::cache::{CacheStore, SetRegistry};
use crate::error::AuthError;
use crate::storage::{SessionStorage, VerificationStorage};
use crate::types::{Session, VerificationChallenge};

// ============================================================================
// Cache
// ============================================================================

/// A cached entry with TTL support.
#[derive(Clone, Debug)]
struct CachedEntry {
    value: String,
    cached_at: Instant,
    ttl: Duration,
}

impl CachedEntry {
    fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            cached_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

/// In-memory key/value cache with per-key TTL.
#[derive(Default)]
pub struct InMemoryCache {
    entries: DashMap<String, CachedEntry>,
}

impl InMemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.value.clone()));
            }
            drop(entry);
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()> {
        self.entries
            .insert(key.to_string(), CachedEntry::new(value.to_string(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> AuthResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// Set Registry
// ============================================================================

/// In-memory set-membership store.
#[derive(Default)]
pub struct InMemorySetRegistry {
    sets: DashMap<String, HashSet<String>>,
}

impl InMemorySetRegistry {
    /// Creates an empty set store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SetRegistry for InMemorySetRegistry {
    async fn add(&self, set: &str, member: &str) -> AuthResult<()> {
        self.sets
            .entry(set.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn remove(&self, set: &str, member: &str) -> AuthResult<()> {
        if let Some(mut members) = self.sets.get_mut(set) {
            members.remove(member);
        }
        Ok(())
    }

    async fn contains(&self, set: &str, member: &str) -> AuthResult<bool> {
        Ok(self
            .sets
            .get(set)
            .is_some_and(|members| members.contains(member)))
    }
}

// ============================================================================
// Durable Stores
// ============================================================================

/// In-memory session record store.
#[derive(Default)]
pub struct InMemorySessionStorage {
    sessions: DashMap<Uuid, Session>,
}

impl InMemorySessionStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        if self.sessions.contains_key(&session.id) {
            return Err(AuthError::storage(format!(
                "duplicate session id {}",
                session.id
            )));
        }
        self.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Session>> {
        Ok(self
            .sessions
            .get(&id)
            .filter(|s| !s.is_deleted())
            .map(|s| s.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> AuthResult<()> {
        if let Some(mut session) = self.sessions.get_mut(&id) {
            session
                .deleted_at
                .get_or_insert_with(time::OffsetDateTime::now_utc);
        }
        Ok(())
    }
}

/// In-memory verification challenge store.
///
/// Enforces the `(code, token)` uniqueness constraint over non-deleted
/// rows, like the relational backend does with a partial unique index.
#[derive(Default)]
pub struct InMemoryVerificationStorage {
    challenges: DashMap<Uuid, VerificationChallenge>,
}

impl InMemoryVerificationStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VerificationStorage for InMemoryVerificationStorage {
    async fn create(&self, challenge: &VerificationChallenge) -> AuthResult<()> {
        let duplicate = self.challenges.iter().any(|entry| {
            entry.deleted_at.is_none()
                && entry.code == challenge.code
                && entry.token == challenge.token
        });
        if duplicate {
            return Err(AuthError::storage("duplicate (code, token) pair"));
        }
        self.challenges.insert(challenge.id, challenge.clone());
        Ok(())
    }

    async fn find_by_pair(
        &self,
        token: &str,
        code: &str,
    ) -> AuthResult<Option<VerificationChallenge>> {
        Ok(self
            .challenges
            .iter()
            .find(|entry| {
                entry.deleted_at.is_none() && entry.token == token && entry.code == code
            })
            .map(|entry| entry.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<VerificationChallenge>> {
        Ok(self
            .challenges
            .get(&id)
            .filter(|c| c.deleted_at.is_none())
            .map(|c| c.clone()))
    }

    async fn mark_used(&self, id: Uuid) -> AuthResult<()> {
        if let Some(mut challenge) = self.challenges.get_mut(&id) {
            let now = time::OffsetDateTime::now_utc();
            challenge.used_at.get_or_insert(now);
            challenge.deleted_at.get_or_insert(now);
        }
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> AuthResult<()> {
        if let Some(mut challenge) = self.challenges.get_mut(&id) {
            challenge
                .deleted_at
                .get_or_insert_with(time::OffsetDateTime::now_utc);
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[tokio::test]
    async fn test_cache_set_get_delete() {
        let cache = InMemoryCache::new();
        cache.set("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cache_entry_expires() {
        let cache = InMemoryCache::new();
        cache.set("k", "v", Duration::from_millis(10)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_registry_membership() {
        let sets = InMemorySetRegistry::new();
        assert!(!sets.contains("s", "m").await.unwrap());

        sets.add("s", "m").await.unwrap();
        sets.add("s", "m").await.unwrap();
        assert!(sets.contains("s", "m").await.unwrap());

        sets.remove("s", "m").await.unwrap();
        assert!(!sets.contains("s", "m").await.unwrap());
        // Removing again is a no-op.
        sets.remove("s", "m").await.unwrap();
    }

    #[tokio::test]
    async fn test_session_storage_soft_delete_hides_record() {
        let storage = InMemorySessionStorage::new();
        let session = Session::new("u1", OffsetDateTime::now_utc() + time::Duration::hours(1));
        storage.create(&session).await.unwrap();

        assert!(storage.find_by_id(session.id).await.unwrap().is_some());

        storage.soft_delete(session.id).await.unwrap();
        assert!(storage.find_by_id(session.id).await.unwrap().is_none());

        // Idempotent.
        storage.soft_delete(session.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_session_storage_rejects_duplicate_id() {
        let storage = InMemorySessionStorage::new();
        let session = Session::new("u1", OffsetDateTime::now_utc() + time::Duration::hours(1));
        storage.create(&session).await.unwrap();
        assert!(storage.create(&session).await.is_err());
    }

    fn challenge(token: &str, code: &str) -> VerificationChallenge {
        VerificationChallenge {
            id: Uuid::now_v7(),
            code: code.to_string(),
            token: token.to_string(),
            credential: "a@b.com".to_string(),
            user_id: "u1".to_string(),
            kind: crate::types::VerificationKind::EmailRegister,
            expires_at: OffsetDateTime::now_utc() + time::Duration::minutes(15),
            created_at: OffsetDateTime::now_utc(),
            used_at: None,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_verification_storage_pair_lookup() {
        let storage = InMemoryVerificationStorage::new();
        let c = challenge("tok", "123456");
        storage.create(&c).await.unwrap();

        let found = storage.find_by_pair("tok", "123456").await.unwrap().unwrap();
        assert_eq!(found.id, c.id);
        assert!(storage.find_by_pair("tok", "000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verification_storage_pair_uniqueness() {
        let storage = InMemoryVerificationStorage::new();
        storage.create(&challenge("tok", "123456")).await.unwrap();

        let err = storage.create(&challenge("tok", "123456")).await.unwrap_err();
        assert!(err.is_server_error());

        // A soft-deleted row frees the pair.
        let original = storage.find_by_pair("tok", "123456").await.unwrap().unwrap();
        storage.soft_delete(original.id).await.unwrap();
        storage.create(&challenge("tok", "123456")).await.unwrap();
    }

    #[tokio::test]
    async fn test_verification_storage_mark_used() {
        let storage = InMemoryVerificationStorage::new();
        let c = challenge("tok", "123456");
        storage.create(&c).await.unwrap();

        storage.mark_used(c.id).await.unwrap();

        // Consumed rows are soft-deleted, so lookups no longer see them.
        assert!(storage.find_by_id(c.id).await.unwrap().is_none());
        assert!(storage.find_by_pair("tok", "123456").await.unwrap().is_none());
    }
}

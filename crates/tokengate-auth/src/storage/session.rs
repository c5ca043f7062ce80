//! Session record storage trait.
//!
//! # Implementation Notes
//!
//! Implementations should:
//!
//! - Hide soft-deleted rows from `find_by_id`
//! - Keep `soft_delete` idempotent (deleting twice succeeds)
//! - Never hard-delete (the audit trail is retained)

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::Session;

/// Storage trait for session records.
///
/// # Example Implementation
///
/// ```ignore
/// use tokengate_auth::storage::SessionStorage;
/// use tokengate_auth::types::Session;
/// use tokengate_auth::AuthResult;
///
/// struct InMemorySessionStorage {
///     sessions: dashmap::DashMap<uuid::Uuid, Session>,
/// }
///
/// #[async_trait::async_trait]
/// impl SessionStorage for InMemorySessionStorage {
///     async fn create(&self, session: &Session) -> AuthResult<()> {
///         self.sessions.insert(session.id, session.clone());
///         Ok(())
///     }
///     // ... other methods
/// }
/// ```
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Persists a new session record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be stored (duplicate id,
    /// storage unavailable).
    async fn create(&self, session: &Session) -> AuthResult<()>;

    /// Finds a live (non-deleted) session by id.
    ///
    /// Returns `Some(session)` if found, `None` if unknown or
    /// soft-deleted. Expiry is *not* filtered here; callers check
    /// `is_expired()` and react on the read path.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Session>>;

    /// Sets the soft-delete marker on a session.
    ///
    /// Idempotent: soft-deleting an already-deleted or unknown id
    /// succeeds without error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn soft_delete(&self, id: Uuid) -> AuthResult<()>;
}

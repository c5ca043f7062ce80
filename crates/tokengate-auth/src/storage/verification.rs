//! Verification challenge storage trait.
//!
//! # Implementation Notes
//!
//! Implementations must enforce uniqueness of `(code, token)` over
//! non-deleted rows; generation-time randomness reduces collisions, but
//! this constraint is the real guarantee.

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::VerificationChallenge;

/// Storage trait for verification challenges.
#[async_trait]
pub trait VerificationStorage: Send + Sync {
    /// Persists a new challenge.
    ///
    /// # Errors
    ///
    /// Returns an error if the `(code, token)` uniqueness constraint is
    /// violated or the storage operation fails.
    async fn create(&self, challenge: &VerificationChallenge) -> AuthResult<()>;

    /// Finds a live (non-deleted) challenge by its `(token, code)` pair.
    ///
    /// Used/expired status is *not* filtered here; callers inspect the
    /// returned record and react on the read path.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_pair(
        &self,
        token: &str,
        code: &str,
    ) -> AuthResult<Option<VerificationChallenge>>;

    /// Finds a live (non-deleted) challenge by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<VerificationChallenge>>;

    /// Marks a challenge as consumed: sets `used_at` and the soft-delete
    /// marker in one mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn mark_used(&self, id: Uuid) -> AuthResult<()>;

    /// Sets the soft-delete marker on a challenge.
    ///
    /// Idempotent, like [`crate::storage::SessionStorage::soft_delete`].
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn soft_delete(&self, id: Uuid) -> AuthResult<()>;
}

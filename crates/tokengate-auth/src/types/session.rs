//! Session domain type.
//!
//! A session represents one authenticated device/agent binding. Sessions
//! are soft-deleted, never hard-deleted, so the audit trail is retained.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Session record stored durably and projected into the cache.
///
/// A session with a non-null `deleted_at` or an `expires_at` in the past
/// must never be treated as valid, regardless of cache state. Expiry is
/// discovered lazily on the read path; there is no background sweeper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Time-ordered unique identifier (UUID v7).
    pub id: Uuid,

    /// Owning user's identifier in the external user directory.
    pub user_id: String,

    /// When this session expires. Equals the refresh token's expiry, the
    /// longer-lived credential.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// When this session was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Soft-delete marker (None = live).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub deleted_at: Option<OffsetDateTime>,
}

impl Session {
    /// Creates a new live session expiring at `expires_at`.
    #[must_use]
    pub fn new(user_id: impl Into<String>, expires_at: OffsetDateTime) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.into(),
            expires_at,
            created_at: OffsetDateTime::now_utc(),
            deleted_at: None,
        }
    }

    /// Returns `true` if this session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if this session has been soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns `true` if this session is valid (not expired and not deleted).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_deleted()
    }

    /// Remaining time until expiry, if any.
    #[must_use]
    pub fn remaining_lifetime(&self) -> Option<std::time::Duration> {
        let remaining = self.expires_at - OffsetDateTime::now_utc();
        remaining.try_into().ok()
    }
}

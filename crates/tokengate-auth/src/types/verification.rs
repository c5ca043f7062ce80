//! Verification challenge domain type.
//!
//! A challenge is one issued one-time `(code, token)` pair for a purpose
//! (registration email confirmation, password reset). The pair is unique
//! among unconsumed, unexpired challenges; once `used_at` is set it must
//! never validate again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AuthError;

/// Purpose discriminator for verification challenges.
///
/// Each kind carries its own expiry window and rate-limit namespace in
/// [`crate::config::VerificationConfig`]. Unknown tags are rejected at the
/// boundary when parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationKind {
    /// Email confirmation issued during registration.
    EmailRegister,
    /// Email challenge issued for a password reset.
    EmailResetPassword,
}

impl VerificationKind {
    /// Returns the kind tag as stored and as used in rate-limit keys.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailRegister => "email_register",
            Self::EmailResetPassword => "email_reset_password",
        }
    }
}

impl fmt::Display for VerificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VerificationKind {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email_register" => Ok(Self::EmailRegister),
            "email_reset_password" => Ok(Self::EmailResetPassword),
            other => Err(AuthError::unsupported_verification_kind(other)),
        }
    }
}

/// Verification challenge stored durably and projected into the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationChallenge {
    /// Time-ordered unique identifier (UUID v7).
    pub id: Uuid,

    /// Short numeric code entered by the user.
    pub code: String,

    /// Long URL-safe token carried by the client.
    pub token: String,

    /// The email/phone being verified.
    pub credential: String,

    /// Owning user's identifier in the external user directory.
    pub user_id: String,

    /// Purpose of this challenge.
    pub kind: VerificationKind,

    /// When this challenge expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// When this challenge was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When this challenge was consumed (None = unused).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub used_at: Option<OffsetDateTime>,

    /// Soft-delete marker (None = live).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub deleted_at: Option<OffsetDateTime>,
}

impl VerificationChallenge {
    /// Returns `true` if this challenge has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if this challenge has been consumed.
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Returns `true` if this challenge can still be validated.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_used() && self.deleted_at.is_none()
    }

    /// Remaining time until expiry, if any.
    #[must_use]
    pub fn remaining_lifetime(&self) -> Option<std::time::Duration> {
        let remaining = self.expires_at - OffsetDateTime::now_utc();
        remaining.try_into().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn challenge(expires_at: OffsetDateTime) -> VerificationChallenge {
        VerificationChallenge {
            id: Uuid::now_v7(),
            code: "482913".to_string(),
            token: "tok".to_string(),
            credential: "a@b.com".to_string(),
            user_id: "user-1".to_string(),
            kind: VerificationKind::EmailRegister,
            expires_at,
            created_at: OffsetDateTime::now_utc(),
            used_at: None,
            deleted_at: None,
        }
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            VerificationKind::EmailRegister,
            VerificationKind::EmailResetPassword,
        ] {
            assert_eq!(kind.as_str().parse::<VerificationKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = "sms_register".parse::<VerificationKind>().unwrap_err();
        assert!(matches!(
            err,
            AuthError::UnsupportedVerificationKind { .. }
        ));
    }

    #[test]
    fn test_fresh_challenge_is_valid() {
        let c = challenge(OffsetDateTime::now_utc() + Duration::minutes(15));
        assert!(c.is_valid());
    }

    #[test]
    fn test_used_challenge_is_invalid() {
        let mut c = challenge(OffsetDateTime::now_utc() + Duration::minutes(15));
        c.used_at = Some(OffsetDateTime::now_utc());
        assert!(c.is_used());
        assert!(!c.is_valid());
    }

    #[test]
    fn test_expired_challenge_is_invalid() {
        let c = challenge(OffsetDateTime::now_utc() - Duration::seconds(1));
        assert!(c.is_expired());
        assert!(!c.is_valid());
    }
}

//! Credential engine configuration.
//!
//! Configuration for token lifetimes, verification code issuance, and
//! rate limiting. Signing key material is *not* part of this struct; keys
//! are passed explicitly to [`crate::token::TokenIssuer`] at construction.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::VerificationKind;

/// Root credential engine configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth.token]
/// access_token_lifetime = "1d"
/// refresh_token_lifetime = "30d"
///
/// [auth.verification]
/// code_length = 6
/// limit_window = "1m"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token lifetime configuration.
    pub token: TokenConfig,

    /// Verification challenge configuration.
    pub verification: VerificationConfig,
}

/// Token lifetime configuration.
///
/// Each token kind has its own independent lifetime; a session's visible
/// lifetime equals the refresh token's, the longer-lived credential.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Access token lifetime.
    /// Shorter lifetimes are more secure but require more frequent refresh.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    /// Also bounds the session record's `expires_at`.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::from_secs(24 * 3600), // 1 day
            refresh_token_lifetime: Duration::from_secs(30 * 24 * 3600), // 30 days
        }
    }
}

/// Verification challenge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Number of digits in the user-entered code.
    pub code_length: usize,

    /// Number of characters in the URL-safe challenge token.
    /// Long enough that the storage uniqueness constraint over
    /// `(code, token)` is the real collision guarantee.
    pub token_length: usize,

    /// When set, every generated code is the static debug value instead of
    /// a random one. Test/dev environments only.
    pub enable_default_code: bool,

    /// One rate-limit window per `(user, kind)`; at most one outstanding
    /// challenge request per window.
    #[serde(with = "humantime_serde")]
    pub limit_window: Duration,

    /// Registration email confirmation settings.
    pub register: VerificationKindConfig,

    /// Password reset settings.
    pub reset_password: VerificationKindConfig,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            token_length: 64,
            enable_default_code: false,
            limit_window: Duration::from_secs(60),
            register: VerificationKindConfig {
                expires_in: Duration::from_secs(15 * 60),
            },
            reset_password: VerificationKindConfig {
                expires_in: Duration::from_secs(15 * 60),
            },
        }
    }
}

impl VerificationConfig {
    /// Returns the per-kind settings for `kind`.
    ///
    /// Every declared kind has an entry in the table; unknown tags are
    /// rejected earlier, when the tag is parsed at the boundary.
    #[must_use]
    pub fn kind(&self, kind: VerificationKind) -> &VerificationKindConfig {
        match kind {
            VerificationKind::EmailRegister => &self.register,
            VerificationKind::EmailResetPassword => &self.reset_password,
        }
    }
}

/// Per-kind verification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationKindConfig {
    /// How long an issued challenge stays valid.
    #[serde(with = "humantime_serde")]
    pub expires_in: Duration,
}

impl Default for VerificationKindConfig {
    fn default() -> Self {
        Self {
            expires_in: Duration::from_secs(15 * 60),
        }
    }
}

//! Credential engine error types.
//!
//! This module defines all error types that can occur during session and
//! verification lifecycle operations.

use std::fmt;

/// Errors that can occur during credential lifecycle operations.
///
/// `Unauthorized` deliberately carries no detail: external callers must not
/// be able to distinguish a revoked credential from an expired or unknown
/// one.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The presented credential is invalid, expired, revoked, or unknown.
    #[error("Unauthorized")]
    Unauthorized,

    /// A uniqueness constraint was violated during registration.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting attribute.
        message: String,
    },

    /// The caller exceeded the verification-request rate limit.
    #[error("Too many verification requests")]
    TooManyRequests,

    /// The verification kind tag is not recognized.
    #[error("Unsupported verification kind: {value}")]
    UnsupportedVerificationKind {
        /// The unrecognized tag.
        value: String,
    },

    /// A downstream request failed in a way surfaced generically to the caller.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Description of the failure.
        message: String,
    },

    /// An error occurred while reading or writing durable records.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// An error occurred against the cache or set-registry store.
    #[error("Cache error: {message}")]
    Cache {
        /// Description of the cache error.
        message: String,
    },

    /// The engine configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedVerificationKind` error.
    #[must_use]
    pub fn unsupported_verification_kind(value: impl Into<String>) -> Self {
        Self::UnsupportedVerificationKind {
            value: value.into(),
        }
    }

    /// Creates a new `BadRequest` error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Cache` error.
    #[must_use]
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized
                | Self::Conflict { .. }
                | Self::TooManyRequests
                | Self::UnsupportedVerificationKind { .. }
                | Self::BadRequest { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. }
                | Self::Cache { .. }
                | Self::Configuration { .. }
                | Self::Internal { .. }
        )
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthorized => ErrorCategory::Authentication,
            Self::Conflict { .. } => ErrorCategory::Validation,
            Self::TooManyRequests => ErrorCategory::RateLimit,
            Self::UnsupportedVerificationKind { .. } => ErrorCategory::Validation,
            Self::BadRequest { .. } => ErrorCategory::Validation,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Cache { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

impl From<crate::token::TokenError> for AuthError {
    fn from(err: crate::token::TokenError) -> Self {
        if err.is_validation_error() {
            // Signature/expiry/claim failures are all the same to callers.
            Self::Unauthorized
        } else {
            Self::internal(err.to_string())
        }
    }
}

/// Categories of credential errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Authentication-related errors (credential verification).
    Authentication,
    /// Request validation errors.
    Validation,
    /// Rate-limiting errors.
    RateLimit,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Validation => write!(f, "validation"),
            Self::RateLimit => write!(f, "rate_limit"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

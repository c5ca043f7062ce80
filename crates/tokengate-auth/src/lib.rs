//! # tokengate-auth
//!
//! Credential and session lifecycle engine.
//!
//! This crate provides:
//! - Session issuance, verification, and revocation backed by
//!   access/refresh bearer tokens
//! - One-time verification challenges (code + token pairs) for
//!   registration and password-reset flows
//! - A four-namespace revocation registry checked before any cache or
//!   store value is trusted
//! - Fixed-window rate limiting for challenge issuance
//! - A register/login/logout orchestrator over an external user directory
//!
//! ## Overview
//!
//! The engine spans three independently-failing stores — a durable
//! relational record, a TTL cache, and a set-based revocation registry —
//! and keeps them consistent enough that a revoked or expired credential
//! is never accepted while valid ones are served from cache on the common
//! path. Reads are fail-safe (blacklist first, cache-aside with durable
//! fallback, negative caching of absence); writes within one operation run
//! concurrently with no cross-store transaction.
//!
//! ## Modules
//!
//! - [`config`] - Engine configuration
//! - [`token`] - Bearer token issuing and verification
//! - [`blacklist`] - Revocation registry
//! - [`rate_limit`] - Fixed-window rate limiter
//! - [`session`] - Session lifecycle service
//! - [`verification`] - Verification challenge lifecycle service
//! - [`service`] - Register/login/logout orchestrator
//! - [`directory`] - External user directory contract
//! - [`cache`] - Cache and set-registry store traits
//! - [`storage`] - Durable storage traits
//! - [`memory`] - In-memory store backends
//! - [`keys`] - Cache/set key construction

pub mod blacklist;
pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod keys;
pub mod memory;
pub mod rate_limit;
pub mod service;
pub mod session;
pub mod storage;
pub mod token;
pub mod types;
pub mod verification;

pub use blacklist::{BlacklistNamespace, BlacklistRegistry};
pub use cache::{CacheStore, SetRegistry};
pub use config::{AuthConfig, TokenConfig, VerificationConfig, VerificationKindConfig};
pub use directory::{NewUser, UserDirectory};
pub use error::{AuthError, ErrorCategory};
pub use rate_limit::RateLimiter;
pub use service::{AuthService, Credentials, RegisterResponse};
pub use session::{IssuedSession, RevokedSession, SessionIdentity, SessionService};
pub use storage::{SessionStorage, VerificationStorage};
pub use token::{
    IssuedToken, SessionClaims, SigningAlgorithm, SigningKeyPair, TokenError, TokenIssuer,
    TokenKind,
};
pub use types::{Session, VerificationChallenge, VerificationKind};
pub use verification::{IssuedVerification, VerificationService};

/// Type alias for credential engine results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use tokengate_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::blacklist::{BlacklistNamespace, BlacklistRegistry};
    pub use crate::cache::{CacheStore, SetRegistry};
    pub use crate::config::{AuthConfig, TokenConfig, VerificationConfig};
    pub use crate::directory::{NewUser, UserDirectory};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::rate_limit::RateLimiter;
    pub use crate::service::{AuthService, Credentials, RegisterResponse};
    pub use crate::session::{IssuedSession, RevokedSession, SessionIdentity, SessionService};
    pub use crate::storage::{SessionStorage, VerificationStorage};
    pub use crate::token::{SigningAlgorithm, SigningKeyPair, TokenIssuer, TokenKind};
    pub use crate::types::{Session, VerificationChallenge, VerificationKind};
    pub use crate::verification::{IssuedVerification, VerificationService};
}

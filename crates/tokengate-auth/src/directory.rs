//! External user directory contract.
//!
//! Identity uniqueness checks, account creation, and credential
//! validation live in a separate service; the engine only consumes this
//! trait. Transport details (gRPC, HTTP) belong to the implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AuthResult;

/// A new account to be created in the user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Display name.
    pub name: String,

    /// Email address, unique across the directory.
    pub email: String,

    /// Phone number, unique across the directory.
    pub phone_number: String,

    /// Free-form location.
    pub location: String,

    /// Self-reported gender ("unknown" when unspecified).
    pub gender: String,

    /// Plaintext password; hashing is the directory's concern.
    pub password: String,
}

/// User directory operations consumed by the orchestrator.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns `true` if `email` is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is unreachable.
    async fn is_email_taken(&self, email: &str) -> AuthResult<bool>;

    /// Returns `true` if `phone_number` is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is unreachable.
    async fn is_phone_taken(&self, phone_number: &str) -> AuthResult<bool>;

    /// Creates an account and returns the new user's id.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails for any reason; the
    /// orchestrator surfaces it generically.
    async fn create_user(&self, user: &NewUser) -> AuthResult<String>;

    /// Validates a username/password pair and returns the user's id.
    ///
    /// # Errors
    ///
    /// Returns an error when the credentials do not match an account; the
    /// orchestrator maps every failure to `Unauthorized`.
    async fn verify_credentials(&self, username: &str, password: &str) -> AuthResult<String>;
}

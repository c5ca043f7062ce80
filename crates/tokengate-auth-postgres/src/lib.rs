//! PostgreSQL storage backend for tokengate-auth
//!
//! Provides persistent storage for:
//!
//! - Session records
//! - Verification challenges
//!
//! Both collections are soft-deleted only (`deleted_at` marker); rows are
//! never hard-deleted by this crate. The `verifications` table enforces
//! uniqueness over `(code, token)` among non-deleted rows through a
//! partial unique index (see `migrations/`).
//!
//! # Example
//!
//! ```ignore
//! use tokengate_auth_postgres::{PostgresAuthStorage, PostgresSessionStorage};
//!
//! let storage = PostgresAuthStorage::connect("postgres://localhost/tokengate").await?;
//! let sessions = storage.sessions();
//! let record = sessions.find_by_id(session_id).await?;
//! ```

pub mod session;
pub mod verification;

use std::sync::Arc;

use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;

use tokengate_auth::AuthError;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

pub use session::PostgresSessionStorage;
pub use verification::PostgresVerificationStorage;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during durable storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx_core::Error),

    /// Resource already exists (conflict).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid stored data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StorageError {
    /// Create a `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create an `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Returns `true` if this is a database error.
    #[must_use]
    pub fn is_database_error(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    /// Returns `true` if this is a conflict error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::storage(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// PostgreSQL Auth Storage
// =============================================================================

/// PostgreSQL storage backend for the credential engine.
///
/// Holds a connection pool and hands out the per-collection storage
/// implementations.
#[derive(Debug, Clone)]
pub struct PostgresAuthStorage {
    pool: Arc<PgPool>,
}

impl PostgresAuthStorage {
    /// Create new storage with an existing connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create new storage by connecting to the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        use sqlx_core::pool::PoolOptions;
        let pool = PoolOptions::<Postgres>::new().connect(database_url).await?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Session record storage over this pool.
    #[must_use]
    pub fn sessions(&self) -> PostgresSessionStorage {
        PostgresSessionStorage::new(Arc::clone(&self.pool))
    }

    /// Verification challenge storage over this pool.
    #[must_use]
    pub fn verifications(&self) -> PostgresVerificationStorage {
        PostgresVerificationStorage::new(Arc::clone(&self.pool))
    }
}

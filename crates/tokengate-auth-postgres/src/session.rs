//! Session record storage.
//!
//! Typed-column rows in the `sessions` table; soft delete via
//! `deleted_at`. Lookups never return soft-deleted rows.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use tokengate_auth::storage::SessionStorage;
use tokengate_auth::types::Session;
use tokengate_auth::AuthResult;

use crate::{PgPool, StorageError};

/// One `sessions` row as fetched from the database.
type SessionRow = (
    Uuid,
    String,
    OffsetDateTime,
    OffsetDateTime,
    Option<OffsetDateTime>,
);

fn session_from_row(row: SessionRow) -> Session {
    Session {
        id: row.0,
        user_id: row.1,
        expires_at: row.2,
        created_at: row.3,
        deleted_at: row.4,
    }
}

/// PostgreSQL session record storage.
#[derive(Clone)]
pub struct PostgresSessionStorage {
    pool: Arc<PgPool>,
}

impl PostgresSessionStorage {
    /// Create a new session storage over the given pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStorage for PostgresSessionStorage {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        query(
            r#"
            INSERT INTO sessions (id, user_id, expires_at, created_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.id)
        .bind(&session.user_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .bind(session.deleted_at)
        .execute(&*self.pool)
        .await
        .map_err(StorageError::Database)?;

        tracing::debug!(session_id = %session.id, "session row inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Session>> {
        let row: Option<SessionRow> = query_as(
            r#"
            SELECT id, user_id, expires_at, created_at, deleted_at
            FROM sessions
            WHERE id = $1
              AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(StorageError::Database)?;

        Ok(row.map(session_from_row))
    }

    async fn soft_delete(&self, id: Uuid) -> AuthResult<()> {
        query(
            r#"
            UPDATE sessions
            SET deleted_at = NOW()
            WHERE id = $1
              AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&*self.pool)
        .await
        .map_err(StorageError::Database)?;

        Ok(())
    }
}

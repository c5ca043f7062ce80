//! Verification challenge storage.
//!
//! Typed-column rows in the `verifications` table. The partial unique
//! index over `(code, token)` among non-deleted rows backs the engine's
//! collision guarantee; a violated constraint surfaces as a storage
//! error, never as a silently replaced row.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use tokengate_auth::storage::VerificationStorage;
use tokengate_auth::types::{VerificationChallenge, VerificationKind};
use tokengate_auth::{AuthError, AuthResult};

use crate::{PgPool, StorageError};

/// One `verifications` row as fetched from the database.
type VerificationRow = (
    Uuid,
    String,
    String,
    String,
    String,
    String,
    OffsetDateTime,
    OffsetDateTime,
    Option<OffsetDateTime>,
    Option<OffsetDateTime>,
);

fn verification_from_row(row: VerificationRow) -> AuthResult<VerificationChallenge> {
    let kind: VerificationKind = row
        .5
        .parse()
        .map_err(|_| AuthError::storage(format!("unknown verification kind tag: {}", row.5)))?;

    Ok(VerificationChallenge {
        id: row.0,
        code: row.1,
        token: row.2,
        credential: row.3,
        user_id: row.4,
        kind,
        expires_at: row.6,
        created_at: row.7,
        used_at: row.8,
        deleted_at: row.9,
    })
}

const SELECT_COLUMNS: &str =
    "id, code, token, credential, user_id, kind, expires_at, created_at, used_at, deleted_at";

/// PostgreSQL verification challenge storage.
#[derive(Clone)]
pub struct PostgresVerificationStorage {
    pool: Arc<PgPool>,
}

impl PostgresVerificationStorage {
    /// Create a new verification storage over the given pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationStorage for PostgresVerificationStorage {
    async fn create(&self, challenge: &VerificationChallenge) -> AuthResult<()> {
        query(
            r#"
            INSERT INTO verifications
                (id, code, token, credential, user_id, kind,
                 expires_at, created_at, used_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(challenge.id)
        .bind(&challenge.code)
        .bind(&challenge.token)
        .bind(&challenge.credential)
        .bind(&challenge.user_id)
        .bind(challenge.kind.as_str())
        .bind(challenge.expires_at)
        .bind(challenge.created_at)
        .bind(challenge.used_at)
        .bind(challenge.deleted_at)
        .execute(&*self.pool)
        .await
        .map_err(StorageError::Database)?;

        tracing::debug!(challenge_id = %challenge.id, "verification row inserted");
        Ok(())
    }

    async fn find_by_pair(
        &self,
        token: &str,
        code: &str,
    ) -> AuthResult<Option<VerificationChallenge>> {
        let row: Option<VerificationRow> = query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM verifications
            WHERE token = $1
              AND code = $2
              AND deleted_at IS NULL
            "#
        ))
        .bind(token)
        .bind(code)
        .fetch_optional(&*self.pool)
        .await
        .map_err(StorageError::Database)?;

        row.map(verification_from_row).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<VerificationChallenge>> {
        let row: Option<VerificationRow> = query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM verifications
            WHERE id = $1
              AND deleted_at IS NULL
            "#
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(StorageError::Database)?;

        row.map(verification_from_row).transpose()
    }

    async fn mark_used(&self, id: Uuid) -> AuthResult<()> {
        query(
            r#"
            UPDATE verifications
            SET used_at = NOW(), deleted_at = NOW()
            WHERE id = $1
              AND used_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&*self.pool)
        .await
        .map_err(StorageError::Database)?;

        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> AuthResult<()> {
        query(
            r#"
            UPDATE verifications
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

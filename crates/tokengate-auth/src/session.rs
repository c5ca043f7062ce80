//! Session lifecycle service.
//!
//! Creates, verifies, and revokes sessions. A session combines three
//! stores: the durable record, two cache-aside projections (one per token
//! kind), and the revocation registry. Reads are fail-safe — blacklist
//! first, then cache, then the durable record — so a revoked or expired
//! session is never accepted even while stale cache entries linger, and a
//! missed cache write heals itself on the next read.
//!
//! Per session the state machine is `Active -> Revoked` (terminal) or
//! `Active -> Expired` (terminal, detected lazily on read — there is no
//! background sweep).

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, try_join_all};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;
use crate::blacklist::{BlacklistNamespace, BlacklistRegistry};
use crate::cache::{CacheStore, SetRegistry};
use crate::error::AuthError;
use crate::keys;
use crate::storage::SessionStorage;
use crate::token::{TokenIssuer, TokenKind};
use crate::types::Session;

/// The credential bundle returned by [`SessionService::generate`].
///
/// Each expiry belongs strictly to its own token kind.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Signed access token.
    pub access_token: String,

    /// Signed refresh token.
    pub refresh_token: String,

    /// When the access token expires.
    pub access_expires_at: OffsetDateTime,

    /// When the refresh token (and the session record) expires.
    pub refresh_expires_at: OffsetDateTime,
}

/// The identity resolved by a successful session verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    /// The verified session's id.
    pub session_id: Uuid,

    /// The owning user's id.
    pub user_id: String,
}

/// Input to [`SessionService::revoke`].
///
/// The raw token strings are optional: when the caller still holds them,
/// each presented string is blacklisted in its own namespace so the raw
/// bearer value is rejected before any session-id lookup is attempted.
#[derive(Debug, Clone)]
pub struct RevokedSession {
    /// The session to revoke.
    pub session_id: Uuid,

    /// The owning user's id.
    pub user_id: String,

    /// Raw access token string, if presented.
    pub access_token: Option<String>,

    /// Raw refresh token string, if presented.
    pub refresh_token: Option<String>,
}

/// Session store: durable record + cache projections + revocation registry.
pub struct SessionService {
    storage: Arc<dyn SessionStorage>,
    cache: Arc<dyn CacheStore>,
    sets: Arc<dyn SetRegistry>,
    blacklist: BlacklistRegistry,
    issuer: Arc<TokenIssuer>,
}

impl SessionService {
    /// Creates a new session service over the given stores.
    #[must_use]
    pub fn new(
        storage: Arc<dyn SessionStorage>,
        cache: Arc<dyn CacheStore>,
        sets: Arc<dyn SetRegistry>,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        let blacklist = BlacklistRegistry::new(Arc::clone(&sets));
        Self {
            storage,
            cache,
            sets,
            blacklist,
            issuer,
        }
    }

    /// Creates a session for `user_id` and issues both bearer tokens.
    ///
    /// The durable record, both cache projections, and the user-membership
    /// set entry are written concurrently; all must succeed before the
    /// tokens are returned. A failed write fails the whole operation — a
    /// missed projection would only cost a cache miss, but masking partial
    /// success here would hide store degradation from the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails or any store write fails.
    pub async fn generate(&self, user_id: &str) -> AuthResult<IssuedSession> {
        let session_id = Uuid::now_v7();

        let access = self.issuer.issue(TokenKind::Access, session_id)?;
        let refresh = self.issuer.issue(TokenKind::Refresh, session_id)?;

        // The session's visible lifetime equals the longer-lived credential.
        let session = Session {
            id: session_id,
            user_id: user_id.to_string(),
            expires_at: refresh.expires_at,
            created_at: OffsetDateTime::now_utc(),
            deleted_at: None,
        };

        let access_key = keys::access_session(session_id);
        let refresh_key = keys::refresh_session(session_id);
        let user_key = keys::user_sessions(user_id);
        let member = session_id.to_string();

        tokio::try_join!(
            self.storage.create(&session),
            self.cache
                .set(&access_key, user_id, self.issuer.lifetime(TokenKind::Access)),
            self.cache
                .set(&refresh_key, user_id, self.issuer.lifetime(TokenKind::Refresh)),
            self.sets.add(&user_key, &member),
        )?;

        tracing::debug!(session_id = %session_id, "session generated");

        Ok(IssuedSession {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
        })
    }

    /// Verifies a session id under `kind` and resolves the owning user.
    ///
    /// Blacklist first, then the cache projection, then the durable
    /// record. An unknown id is blacklisted (negative caching — absence is
    /// itself cached as a permanent revocation, guarding against lookup
    /// storms on bogus ids). A found-expired record is soft-deleted and
    /// blacklisted synchronously as part of this read.
    ///
    /// # Errors
    ///
    /// Fails with [`AuthError::Unauthorized`] for every invalid case,
    /// without distinguishing them to the caller.
    pub async fn verify_session_id(
        &self,
        id: Uuid,
        kind: TokenKind,
    ) -> AuthResult<SessionIdentity> {
        let member = id.to_string();

        if self
            .blacklist
            .is_revoked(BlacklistNamespace::Sessions, &member)
            .await?
        {
            return Err(AuthError::Unauthorized);
        }

        let projection = keys::session_projection(kind, id);

        if let Some(user_id) = self.cache.get(&projection).await? {
            tracing::debug!(session_id = %id, kind = %kind, "session cache hit");
            return Ok(SessionIdentity {
                session_id: id,
                user_id,
            });
        }

        let Some(session) = self.storage.find_by_id(id).await? else {
            self.blacklist
                .revoke(BlacklistNamespace::Sessions, &member)
                .await?;
            return Err(AuthError::Unauthorized);
        };

        if session.is_expired() {
            tokio::try_join!(
                self.storage.soft_delete(id),
                self.blacklist.revoke(BlacklistNamespace::Sessions, &member),
                self.cache.delete(&projection),
            )?;
            return Err(AuthError::Unauthorized);
        }

        let remaining = session.remaining_lifetime().unwrap_or_default();
        self.cache
            .set(&projection, &session.user_id, remaining)
            .await?;

        Ok(SessionIdentity {
            session_id: session.id,
            user_id: session.user_id,
        })
    }

    /// Verifies a raw bearer token of `kind` end to end.
    ///
    /// The raw string is checked against its token blacklist before any
    /// signature work; a token that fails signature or expiry verification
    /// is added to that blacklist so it is never retried.
    ///
    /// # Errors
    ///
    /// Fails with [`AuthError::Unauthorized`] for every invalid case.
    pub async fn verify_token(&self, raw_token: &str, kind: TokenKind) -> AuthResult<SessionIdentity> {
        let namespace = BlacklistNamespace::for_token_kind(kind);

        if self.blacklist.is_revoked(namespace, raw_token).await? {
            return Err(AuthError::Unauthorized);
        }

        let session_id = match self.issuer.verify(kind, raw_token) {
            Ok(id) => id,
            Err(err) => {
                tracing::debug!(kind = %kind, error = %err, "token verification failed");
                self.blacklist.revoke(namespace, raw_token).await?;
                return Err(AuthError::Unauthorized);
            }
        };

        self.verify_session_id(session_id, kind).await
    }

    /// Revokes a session: `Active -> Revoked`, terminal.
    ///
    /// Both cache projections are deleted, the id leaves the user's
    /// membership set, the id enters the session blacklist, the durable
    /// record is soft-deleted, and any presented raw token strings enter
    /// their own blacklist namespaces. All writes run concurrently with no
    /// individual-failure rollback; every operation is idempotent, so a
    /// failed revoke is safe to retry.
    ///
    /// # Errors
    ///
    /// Returns an error if any store write fails.
    pub async fn revoke(&self, revoked: RevokedSession) -> AuthResult<()> {
        let access_key = keys::access_session(revoked.session_id);
        let refresh_key = keys::refresh_session(revoked.session_id);
        let user_key = keys::user_sessions(&revoked.user_id);
        let member = revoked.session_id.to_string();

        let mut ops: Vec<BoxFuture<'_, AuthResult<()>>> = vec![
            self.cache.delete(&access_key).boxed(),
            self.cache.delete(&refresh_key).boxed(),
            self.sets.remove(&user_key, &member).boxed(),
            self.blacklist
                .revoke(BlacklistNamespace::Sessions, &member)
                .boxed(),
            self.storage.soft_delete(revoked.session_id).boxed(),
        ];

        if let Some(access_token) = revoked.access_token.as_deref() {
            ops.push(
                self.blacklist
                    .revoke(BlacklistNamespace::AccessTokens, access_token)
                    .boxed(),
            );
        }

        if let Some(refresh_token) = revoked.refresh_token.as_deref() {
            ops.push(
                self.blacklist
                    .revoke(BlacklistNamespace::RefreshTokens, refresh_token)
                    .boxed(),
            );
        }

        try_join_all(ops).await?;

        tracing::debug!(session_id = %revoked.session_id, "session revoked");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Verification challenge lifecycle service.
//!
//! Issues one-time `(code, token)` pairs for registration and password
//! reset, validates them, and consumes them. Validation returns `Ok(None)`
//! for every invalid pair — unknown, used, expired, or blacklisted — so
//! callers reject silently and never reveal which half of the pair was
//! wrong. Errors are reserved for unsupported kinds and store faults.
//!
//! Issuance is throttled to one outstanding request per `(user, kind)`
//! per fixed window.

use std::sync::Arc;

use rand::Rng;
use rand::distributions::Alphanumeric;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;
use crate::blacklist::{BlacklistNamespace, BlacklistRegistry};
use crate::cache::{CacheStore, SetRegistry};
use crate::config::VerificationConfig;
use crate::error::AuthError;
use crate::keys;
use crate::rate_limit::RateLimiter;
use crate::storage::VerificationStorage;
use crate::types::{VerificationChallenge, VerificationKind};

/// The static code used when `enable_default_code` is configured.
/// Test/dev environments only.
const DEFAULT_DEBUG_CODE: &str = "123456";

/// The fields returned by [`VerificationService::generate`].
#[derive(Debug, Clone)]
pub struct IssuedVerification {
    /// The new challenge's id.
    pub id: Uuid,

    /// Short numeric code, delivered out of band to the user.
    pub code: String,

    /// Long URL-safe token, carried by the client.
    pub token: String,

    /// When the challenge expires.
    pub expires_at: OffsetDateTime,
}

/// Verification store: durable challenges + cache-aside projections +
/// revocation registry + rate limiter.
pub struct VerificationService {
    storage: Arc<dyn VerificationStorage>,
    cache: Arc<dyn CacheStore>,
    blacklist: BlacklistRegistry,
    limiter: RateLimiter,
    config: VerificationConfig,
}

impl VerificationService {
    /// Creates a new verification service over the given stores.
    #[must_use]
    pub fn new(
        storage: Arc<dyn VerificationStorage>,
        cache: Arc<dyn CacheStore>,
        sets: Arc<dyn SetRegistry>,
        config: VerificationConfig,
    ) -> Self {
        let blacklist = BlacklistRegistry::new(sets);
        let limiter = RateLimiter::new(Arc::clone(&cache));
        Self {
            storage,
            cache,
            blacklist,
            limiter,
            config,
        }
    }

    /// Issues a new challenge for `user_id` and `credential`.
    ///
    /// The `token` is long enough that the storage uniqueness constraint
    /// over `(code, token)` is the real collision guarantee; no
    /// generation-time uniqueness check is made.
    ///
    /// # Errors
    ///
    /// Fails with [`AuthError::TooManyRequests`] when the `(user, kind)`
    /// window is already held, or if a store write fails.
    pub async fn generate(
        &self,
        user_id: &str,
        kind: VerificationKind,
        credential: &str,
    ) -> AuthResult<IssuedVerification> {
        let kind_config = self.config.kind(kind);

        let limit_key = keys::verification_limit(kind, user_id);
        if !self
            .limiter
            .try_acquire(&limit_key, self.config.limit_window)
            .await?
        {
            return Err(AuthError::TooManyRequests);
        }

        let code = if self.config.enable_default_code {
            DEFAULT_DEBUG_CODE.to_string()
        } else {
            random_numeric(self.config.code_length)
        };
        let token = random_token(self.config.token_length);

        let now = OffsetDateTime::now_utc();
        let challenge = VerificationChallenge {
            id: Uuid::now_v7(),
            code,
            token,
            credential: credential.to_string(),
            user_id: user_id.to_string(),
            kind,
            expires_at: now + kind_config.expires_in,
            created_at: now,
            used_at: None,
            deleted_at: None,
        };

        self.storage.create(&challenge).await?;

        let marker_key = keys::verification_marker(challenge.id);
        let pair_key = keys::verification_pair(&challenge.token, &challenge.code);
        let id_value = challenge.id.to_string();

        tokio::try_join!(
            self.cache.set(&marker_key, "1", kind_config.expires_in),
            self.cache.set(&pair_key, &id_value, kind_config.expires_in),
        )?;

        tracing::debug!(challenge_id = %challenge.id, kind = %kind, "verification generated");

        Ok(IssuedVerification {
            id: challenge.id,
            code: challenge.code,
            token: challenge.token,
            expires_at: challenge.expires_at,
        })
    }

    /// Validates a `(token, code)` pair.
    ///
    /// Returns `Ok(None)` for every invalid pair. The cache holds only the
    /// challenge id, so on a hit the authoritative fields are re-read from
    /// the durable store before the pair is accepted. Invalid pairs are
    /// blacklisted so repeat lookups short-circuit.
    ///
    /// # Errors
    ///
    /// Returns an error only on store faults.
    pub async fn verify(
        &self,
        token: &str,
        code: &str,
    ) -> AuthResult<Option<VerificationChallenge>> {
        let member = keys::verification_pair_member(token, code);

        if self
            .blacklist
            .is_revoked(BlacklistNamespace::Verifications, &member)
            .await?
        {
            return Ok(None);
        }

        let pair_key = keys::verification_pair(token, code);

        let Some(cached_id) = self.cache.get(&pair_key).await? else {
            // Cache miss: the durable store is authoritative.
            let Some(challenge) = self.storage.find_by_pair(token, code).await? else {
                self.blacklist
                    .revoke(BlacklistNamespace::Verifications, &member)
                    .await?;
                return Ok(None);
            };

            if challenge.is_used() || challenge.is_expired() {
                tokio::try_join!(
                    self.blacklist
                        .revoke(BlacklistNamespace::Verifications, &member),
                    self.storage.soft_delete(challenge.id),
                )?;
                return Ok(None);
            }

            let remaining = challenge.remaining_lifetime().unwrap_or_default();
            let id_value = challenge.id.to_string();
            self.cache.set(&pair_key, &id_value, remaining).await?;

            return Ok(Some(challenge));
        };

        let id = Uuid::parse_str(&cached_id)
            .map_err(|e| AuthError::cache(format!("corrupt pair projection: {e}")))?;

        let Some(challenge) = self.storage.find_by_id(id).await? else {
            tokio::try_join!(
                self.cache.delete(&pair_key),
                self.blacklist
                    .revoke(BlacklistNamespace::Verifications, &member),
            )?;
            return Ok(None);
        };

        if challenge.is_used() || challenge.is_expired() {
            tokio::try_join!(
                self.cache.delete(&pair_key),
                self.blacklist
                    .revoke(BlacklistNamespace::Verifications, &member),
                self.storage.soft_delete(challenge.id),
            )?;
            return Ok(None);
        }

        Ok(Some(challenge))
    }

    /// Consumes a validated challenge.
    ///
    /// Marks `used_at` (with soft delete) and unconditionally blacklists
    /// the `(token, code)` pair — the cache TTL would otherwise allow
    /// re-validation until natural expiry, so the blacklist entry is what
    /// makes a code single-use.
    ///
    /// # Errors
    ///
    /// Returns an error if a store write fails.
    pub async fn consume(&self, challenge: &VerificationChallenge) -> AuthResult<()> {
        let member = keys::verification_pair_member(&challenge.token, &challenge.code);

        tokio::try_join!(
            self.storage.mark_used(challenge.id),
            self.blacklist
                .revoke(BlacklistNamespace::Verifications, &member),
        )?;

        tracing::debug!(challenge_id = %challenge.id, "verification consumed");
        Ok(())
    }
}

fn random_numeric(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..=9u8)))
        .collect()
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

//! Revocation registry.
//!
//! Four disjoint set namespaces record revoked sessions, revoked access
//! tokens, revoked refresh tokens, and consumed/invalid verification
//! pairs. Entries are append-only from the engine's perspective; the
//! registry enforces no expiry of its own. Every verification path checks
//! `is_revoked` *before* trusting any cache or store value, so a revoked
//! credential is rejected even while stale cache entries linger.

use std::fmt;
use std::sync::Arc;

use crate::AuthResult;
use crate::cache::SetRegistry;

/// The four disjoint revocation namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlacklistNamespace {
    /// Revoked session ids.
    Sessions,
    /// Revoked raw access token strings.
    AccessTokens,
    /// Revoked raw refresh token strings.
    RefreshTokens,
    /// Consumed or invalid `(token, code)` verification pairs.
    Verifications,
}

impl BlacklistNamespace {
    /// Returns the set key backing this namespace.
    #[must_use]
    pub fn set_key(&self) -> &'static str {
        match self {
            Self::Sessions => "blacklist:sessions",
            Self::AccessTokens => "blacklist:access_tokens",
            Self::RefreshTokens => "blacklist:refresh_tokens",
            Self::Verifications => "blacklist:verifications",
        }
    }

    /// Returns the token blacklist namespace for `kind`.
    #[must_use]
    pub fn for_token_kind(kind: crate::token::TokenKind) -> Self {
        match kind {
            crate::token::TokenKind::Access => Self::AccessTokens,
            crate::token::TokenKind::Refresh => Self::RefreshTokens,
        }
    }
}

impl fmt::Display for BlacklistNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.set_key())
    }
}

/// Set-membership registry for revoked credentials.
#[derive(Clone)]
pub struct BlacklistRegistry {
    sets: Arc<dyn SetRegistry>,
}

impl BlacklistRegistry {
    /// Creates a new registry over the given set store.
    #[must_use]
    pub fn new(sets: Arc<dyn SetRegistry>) -> Self {
        Self { sets }
    }

    /// Returns `true` if `value` has been revoked in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns an error if the set store is unreachable; callers fail
    /// closed.
    pub async fn is_revoked(
        &self,
        namespace: BlacklistNamespace,
        value: &str,
    ) -> AuthResult<bool> {
        self.sets.contains(namespace.set_key(), value).await
    }

    /// Revokes `value` in `namespace`. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the set store operation fails.
    pub async fn revoke(&self, namespace: BlacklistNamespace, value: &str) -> AuthResult<()> {
        tracing::debug!(namespace = %namespace, "blacklist add");
        self.sets.add(namespace.set_key(), value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemorySetRegistry;

    fn registry() -> BlacklistRegistry {
        BlacklistRegistry::new(Arc::new(InMemorySetRegistry::new()))
    }

    #[test]
    fn test_namespaces_are_disjoint() {
        let keys = [
            BlacklistNamespace::Sessions.set_key(),
            BlacklistNamespace::AccessTokens.set_key(),
            BlacklistNamespace::RefreshTokens.set_key(),
            BlacklistNamespace::Verifications.set_key(),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[tokio::test]
    async fn test_revoke_and_check() {
        let registry = registry();
        assert!(
            !registry
                .is_revoked(BlacklistNamespace::Sessions, "s1")
                .await
                .unwrap()
        );

        registry
            .revoke(BlacklistNamespace::Sessions, "s1")
            .await
            .unwrap();
        assert!(
            registry
                .is_revoked(BlacklistNamespace::Sessions, "s1")
                .await
                .unwrap()
        );

        // Other namespaces are unaffected.
        assert!(
            !registry
                .is_revoked(BlacklistNamespace::AccessTokens, "s1")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let registry = registry();
        registry
            .revoke(BlacklistNamespace::Verifications, "pair")
            .await
            .unwrap();
        registry
            .revoke(BlacklistNamespace::Verifications, "pair")
            .await
            .unwrap();
        assert!(
            registry
                .is_revoked(BlacklistNamespace::Verifications, "pair")
                .await
                .unwrap()
        );
    }

    #[test]
    fn test_token_kind_mapping() {
        assert_eq!(
            BlacklistNamespace::for_token_kind(crate::token::TokenKind::Access),
            BlacklistNamespace::AccessTokens
        );
        assert_eq!(
            BlacklistNamespace::for_token_kind(crate::token::TokenKind::Refresh),
            BlacklistNamespace::RefreshTokens
        );
    }
}

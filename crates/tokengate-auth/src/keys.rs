//! Cache and set-registry key construction.
//!
//! Every key the engine writes to the cache or set stores is built here, so
//! the namespace layout stays in one place. Projections are keyed by session
//! or challenge identity; membership sets are keyed by owner.

use uuid::Uuid;

use crate::token::TokenKind;
use crate::types::VerificationKind;

/// Cache key for the "this session backs an access token" projection.
/// The cached value is the owning user id.
#[must_use]
pub fn access_session(id: Uuid) -> String {
    format!("sessions:access:{id}")
}

/// Cache key for the "this session backs a refresh token" projection.
#[must_use]
pub fn refresh_session(id: Uuid) -> String {
    format!("sessions:refresh:{id}")
}

/// Cache key for the projection of `id` under `kind`.
#[must_use]
pub fn session_projection(kind: TokenKind, id: Uuid) -> String {
    match kind {
        TokenKind::Access => access_session(id),
        TokenKind::Refresh => refresh_session(id),
    }
}

/// Set key holding all session ids belonging to a user, for bulk
/// revocation and audit.
#[must_use]
pub fn user_sessions(user_id: &str) -> String {
    format!("sessions:user:{user_id}")
}

/// Cache key marking that a challenge exists and has not yet timed out.
#[must_use]
pub fn verification_marker(id: Uuid) -> String {
    format!("verifications:pending:{id}")
}

/// Set member identifying a `(token, code)` pair, used both for the pair
/// blacklist and as the suffix of the pair-lookup cache key.
#[must_use]
pub fn verification_pair_member(token: &str, code: &str) -> String {
    format!("token-{token}:code-{code}")
}

/// Cache key mapping a `(token, code)` pair to its challenge id.
#[must_use]
pub fn verification_pair(token: &str, code: &str) -> String {
    format!("verifications:{}", verification_pair_member(token, code))
}

/// Cache key for the per-user, per-kind verification rate-limit window.
#[must_use]
pub fn verification_limit(kind: VerificationKind, user_id: &str) -> String {
    format!("limits:verification:{kind}:{user_id}")
}

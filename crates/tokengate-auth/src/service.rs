//! Credential orchestrator.
//!
//! Composes the session and verification services with the external user
//! directory to implement register, login, and logout. No retries happen
//! here; failures surface to the caller, and retries belong to the
//! transport layer.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::AuthResult;
use crate::directory::{NewUser, UserDirectory};
use crate::error::AuthError;
use crate::session::{IssuedSession, RevokedSession, SessionService};
use crate::types::VerificationKind;
use crate::verification::VerificationService;

/// The credential bundle returned by [`AuthService::register`].
#[derive(Debug, Clone)]
pub struct RegisterResponse {
    /// Verification token for the registration email confirmation.
    pub verify_token: String,

    /// Signed access token.
    pub access_token: String,

    /// Signed refresh token.
    pub refresh_token: String,

    /// When the access token expires.
    pub access_expires_at: OffsetDateTime,

    /// When the refresh token expires.
    pub refresh_expires_at: OffsetDateTime,
}

/// A username/password pair presented at login.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account username.
    pub username: String,

    /// Plaintext password.
    pub password: String,
}

/// Register/login/logout orchestration over the lifecycle services.
pub struct AuthService {
    sessions: Arc<SessionService>,
    verifications: Arc<VerificationService>,
    directory: Arc<dyn UserDirectory>,
}

impl AuthService {
    /// Creates a new orchestrator.
    #[must_use]
    pub fn new(
        sessions: Arc<SessionService>,
        verifications: Arc<VerificationService>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            sessions,
            verifications,
            directory,
        }
    }

    /// Registers a new account and opens its first session.
    ///
    /// # Errors
    ///
    /// Fails with [`AuthError::Conflict`] when the email or phone number
    /// is taken, [`AuthError::BadRequest`] when directory creation fails,
    /// and propagates session/verification store failures.
    pub async fn register(&self, request: NewUser) -> AuthResult<RegisterResponse> {
        if self.directory.is_email_taken(&request.email).await? {
            return Err(AuthError::conflict("email already taken"));
        }

        if self.directory.is_phone_taken(&request.phone_number).await? {
            return Err(AuthError::conflict("phone number already taken"));
        }

        let user_id = self
            .directory
            .create_user(&request)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "user creation failed");
                AuthError::bad_request("user creation failed")
            })?;

        let verification = self
            .verifications
            .generate(&user_id, VerificationKind::EmailRegister, &request.email)
            .await?;

        let session = self.sessions.generate(&user_id).await?;

        tracing::debug!(user_id = %user_id, "user registered");

        Ok(RegisterResponse {
            verify_token: verification.token,
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            access_expires_at: session.access_expires_at,
            refresh_expires_at: session.refresh_expires_at,
        })
    }

    /// Validates credentials and opens a session.
    ///
    /// # Errors
    ///
    /// Every directory failure maps to [`AuthError::Unauthorized`];
    /// session store failures propagate.
    pub async fn login(&self, credentials: &Credentials) -> AuthResult<IssuedSession> {
        let user_id = self
            .directory
            .verify_credentials(&credentials.username, &credentials.password)
            .await
            .map_err(|err| {
                tracing::debug!(error = %err, "credential check failed");
                AuthError::Unauthorized
            })?;

        self.sessions.generate(&user_id).await
    }

    /// Revokes the presented session and blacklists any presented raw
    /// tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if any store write fails; every write is
    /// idempotent, so the caller may retry.
    pub async fn logout(&self, revoked: RevokedSession) -> AuthResult<()> {
        self.sessions.revoke(revoked).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::config::{TokenConfig, VerificationConfig};
    use crate::memory::{
        InMemoryCache, InMemorySessionStorage, InMemorySetRegistry, InMemoryVerificationStorage,
    };
    use crate::token::{SigningAlgorithm, SigningKeyPair, TokenIssuer, TokenKind};

    /// Directory stub holding accounts keyed by username.
    #[derive(Default)]
    struct StubDirectory {
        users: Mutex<HashMap<String, (String, String)>>, // username -> (id, password)
        fail_creation: bool,
    }

    #[async_trait]
    impl UserDirectory for StubDirectory {
        async fn is_email_taken(&self, email: &str) -> AuthResult<bool> {
            Ok(email.ends_with("@taken.com"))
        }

        async fn is_phone_taken(&self, phone_number: &str) -> AuthResult<bool> {
            Ok(phone_number == "+10000000000")
        }

        async fn create_user(&self, user: &NewUser) -> AuthResult<String> {
            if self.fail_creation {
                return Err(AuthError::internal("directory exploded"));
            }
            let id = uuid::Uuid::now_v7().to_string();
            self.users.lock().unwrap().insert(
                user.email.clone(),
                (id.clone(), user.password.clone()),
            );
            Ok(id)
        }

        async fn verify_credentials(&self, username: &str, password: &str) -> AuthResult<String> {
            match self.users.lock().unwrap().get(username) {
                Some((id, stored)) if stored == password => Ok(id.clone()),
                _ => Err(AuthError::Unauthorized),
            }
        }
    }

    fn shared_issuer() -> Arc<TokenIssuer> {
        static ISSUER: OnceLock<Arc<TokenIssuer>> = OnceLock::new();
        ISSUER
            .get_or_init(|| {
                let config = TokenConfig {
                    access_token_lifetime: Duration::from_secs(3600),
                    refresh_token_lifetime: Duration::from_secs(86400),
                };
                Arc::new(TokenIssuer::new(
                    SigningKeyPair::generate_rsa(SigningAlgorithm::RS256).unwrap(),
                    SigningKeyPair::generate_rsa(SigningAlgorithm::RS256).unwrap(),
                    &config,
                ))
            })
            .clone()
    }

    fn auth_service(directory: StubDirectory) -> (AuthService, Arc<SessionService>) {
        let cache = Arc::new(InMemoryCache::new());
        let sets = Arc::new(InMemorySetRegistry::new());

        let sessions = Arc::new(SessionService::new(
            Arc::new(InMemorySessionStorage::new()),
            cache.clone(),
            sets.clone(),
            shared_issuer(),
        ));
        let verifications = Arc::new(VerificationService::new(
            Arc::new(InMemoryVerificationStorage::new()),
            cache,
            sets,
            VerificationConfig::default(),
        ));

        let service = AuthService::new(sessions.clone(), verifications, Arc::new(directory));
        (service, sessions)
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            phone_number: "+15550001111".to_string(),
            location: String::new(),
            gender: "unknown".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_returns_tokens_and_verify_token() {
        let (service, sessions) = auth_service(StubDirectory::default());
        let response = service.register(new_user("a@b.com")).await.unwrap();

        assert!(!response.verify_token.is_empty());
        assert!(response.refresh_expires_at > OffsetDateTime::now_utc());

        // The issued access token resolves to a live session.
        let identity = sessions
            .verify_token(&response.access_token, TokenKind::Access)
            .await
            .unwrap();
        assert!(!identity.user_id.is_empty());
    }

    #[tokio::test]
    async fn test_register_rejects_taken_email() {
        let (service, _) = auth_service(StubDirectory::default());
        let err = service.register(new_user("a@taken.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_phone() {
        let (service, _) = auth_service(StubDirectory::default());
        let mut user = new_user("a@b.com");
        user.phone_number = "+10000000000".to_string();
        let err = service.register(user).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_register_surfaces_creation_failure_generically() {
        let (service, _) = auth_service(StubDirectory {
            fail_creation: true,
            ..StubDirectory::default()
        });
        let err = service.register(new_user("a@b.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_login_with_valid_credentials() {
        let (service, _) = auth_service(StubDirectory::default());
        service.register(new_user("a@b.com")).await.unwrap();

        let issued = service
            .login(&Credentials {
                username: "a@b.com".to_string(),
                password: "hunter2".to_string(),
            })
            .await
            .unwrap();
        assert!(!issued.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_login_with_bad_password_is_unauthorized() {
        let (service, _) = auth_service(StubDirectory::default());
        service.register(new_user("a@b.com")).await.unwrap();

        let err = service
            .login(&Credentials {
                username: "a@b.com".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn test_logout_revokes_the_session() {
        let (service, sessions) = auth_service(StubDirectory::default());
        let response = service.register(new_user("a@b.com")).await.unwrap();

        let identity = sessions
            .verify_token(&response.access_token, TokenKind::Access)
            .await
            .unwrap();

        service
            .logout(RevokedSession {
                session_id: identity.session_id,
                user_id: identity.user_id,
                access_token: Some(response.access_token.clone()),
                refresh_token: Some(response.refresh_token.clone()),
            })
            .await
            .unwrap();

        let err = sessions
            .verify_token(&response.access_token, TokenKind::Access)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }
}

//! End-to-end lifecycle tests over the fully wired engine with in-memory
//! backends: register, verify, consume, logout.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;

use tokengate_auth::memory::{
    InMemoryCache, InMemorySessionStorage, InMemorySetRegistry, InMemoryVerificationStorage,
};
use tokengate_auth::prelude::*;

#[derive(Default)]
struct StubDirectory {
    users: Mutex<HashMap<String, (String, String)>>, // username -> (id, password)
}

#[async_trait]
impl UserDirectory for StubDirectory {
    async fn is_email_taken(&self, email: &str) -> AuthResult<bool> {
        Ok(self.users.lock().unwrap().contains_key(email))
    }

    async fn is_phone_taken(&self, _phone_number: &str) -> AuthResult<bool> {
        Ok(false)
    }

    async fn create_user(&self, user: &NewUser) -> AuthResult<String> {
        let id = uuid::Uuid::now_v7().to_string();
        self.users
            .lock()
            .unwrap()
            .insert(user.email.clone(), (id.clone(), user.password.clone()));
        Ok(id)
    }

    async fn verify_credentials(&self, username: &str, password: &str) -> AuthResult<String> {
        match self.users.lock().unwrap().get(username) {
            Some((id, stored)) if stored == password => Ok(id.clone()),
            _ => Err(AuthError::Unauthorized),
        }
    }
}

struct Engine {
    auth: AuthService,
    sessions: Arc<SessionService>,
    verifications: Arc<VerificationService>,
}

fn issuer() -> Arc<TokenIssuer> {
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

fn engine() -> Engine {
    let cache = Arc::new(InMemoryCache::new());
    let sets = Arc::new(InMemorySetRegistry::new());

    let sessions = Arc::new(SessionService::new(
        Arc::new(InMemorySessionStorage::new()),
        cache.clone(),
        sets.clone(),
        issuer(),
    ));
    let verifications = Arc::new(VerificationService::new(
        Arc::new(InMemoryVerificationStorage::new()),
        cache,
        sets,
        VerificationConfig::default(),
    ));

    let auth = AuthService::new(
        sessions.clone(),
        verifications.clone(),
        Arc::new(StubDirectory::default()),
    );

    Engine {
        auth,
        sessions,
        verifications,
    }
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Integration User".to_string(),
        email: email.to_string(),
        phone_number: "+15550002222".to_string(),
        location: "nowhere".to_string(),
        gender: "unknown".to_string(),
        password: "correct horse".to_string(),
    }
}

#[tokio::test]
async fn full_registration_lifecycle() {
    let engine = engine();

    // Register: tokens plus a verification token come back.
    let registered = engine.auth.register(new_user("new@b.com")).await.unwrap();
    assert!(!registered.verify_token.is_empty());

    // Both bearer tokens resolve to the same session.
    let access = engine
        .sessions
        .verify_token(&registered.access_token, TokenKind::Access)
        .await
        .unwrap();
    let refresh = engine
        .sessions
        .verify_token(&registered.refresh_token, TokenKind::Refresh)
        .await
        .unwrap();
    assert_eq!(access, refresh);

    // A second registration with the same email conflicts.
    let err = engine.auth.register(new_user("new@b.com")).await.unwrap_err();
    assert!(matches!(err, AuthError::Conflict { .. }));

    // Logout makes both tokens dead immediately, before any TTL expiry.
    engine
        .auth
        .logout(RevokedSession {
            session_id: access.session_id,
            user_id: access.user_id.clone(),
            access_token: Some(registered.access_token.clone()),
            refresh_token: Some(registered.refresh_token.clone()),
        })
        .await
        .unwrap();

    for (token, kind) in [
        (&registered.access_token, TokenKind::Access),
        (&registered.refresh_token, TokenKind::Refresh),
    ] {
        let err = engine.sessions.verify_token(token, kind).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    // Login opens a fresh session for the same account.
    let issued = engine
        .auth
        .login(&Credentials {
            username: "new@b.com".to_string(),
            password: "correct horse".to_string(),
        })
        .await
        .unwrap();
    engine
        .sessions
        .verify_token(&issued.access_token, TokenKind::Access)
        .await
        .unwrap();
}

#[tokio::test]
async fn verification_challenge_lifecycle() {
    let engine = engine();
    let registered = engine.auth.register(new_user("c@d.com")).await.unwrap();

    let identity = engine
        .sessions
        .verify_token(&registered.access_token, TokenKind::Access)
        .await
        .unwrap();

    // The register flow already issued an EmailRegister challenge; its
    // token round-trips through verify only with the matching code, which
    // we don't hold here. A password-reset challenge exercises the whole
    // loop instead.
    let issued = engine
        .verifications
        .generate(
            &identity.user_id,
            VerificationKind::EmailResetPassword,
            "c@d.com",
        )
        .await
        .unwrap();

    let challenge = engine
        .verifications
        .verify(&issued.token, &issued.code)
        .await
        .unwrap()
        .expect("fresh challenge validates");
    assert_eq!(challenge.user_id, identity.user_id);
    assert_eq!(challenge.credential, "c@d.com");

    engine.verifications.consume(&challenge).await.unwrap();

    // Single use: the same pair never validates again.
    assert!(
        engine
            .verifications
            .verify(&issued.token, &issued.code)
            .await
            .unwrap()
            .is_none()
    );

    // The wrong half of the pair is rejected indistinguishably.
    assert!(
        engine
            .verifications
            .verify(&issued.token, "999999")
            .await
            .unwrap()
            .is_none()
    );
}

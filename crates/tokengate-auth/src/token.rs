//! Bearer token issuing and verification.
//!
//! The issuer signs two kinds of token — access and refresh — each with its
//! own asymmetric key pair and lifetime. The payload carries the session
//! identifier and nothing else: revocation (not claim content) is the sole
//! invalidation path, so mutable user attributes are never embedded.
//!
//! ## Supported Algorithms
//!
//! - **RS256**: RSA with SHA-256 (default)
//! - **RS384**: RSA with SHA-384

use std::fmt;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::TokenConfig;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during token operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a token.
    #[error("Failed to decode token: {message}")]
    DecodingError {
        /// Description of the decoding error.
        message: String,
    },

    /// The token's validity window has elapsed.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token claims are invalid.
    #[error("Invalid claims: {message}")]
    InvalidClaims {
        /// Description of why claims are invalid.
        message: String,
    },

    /// Failed to generate a cryptographic key.
    #[error("Key generation error: {message}")]
    KeyGenerationError {
        /// Description of the key generation error.
        message: String,
    },

    /// Invalid key format or data.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },
}

impl TokenError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `DecodingError`.
    #[must_use]
    pub fn decoding_error(message: impl Into<String>) -> Self {
        Self::DecodingError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClaims` error.
    #[must_use]
    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims {
            message: message.into(),
        }
    }

    /// Creates a new `KeyGenerationError`.
    #[must_use]
    pub fn key_generation_error(message: impl Into<String>) -> Self {
        Self::KeyGenerationError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a validation error (expired, bad
    /// signature, bad claims) as opposed to a key or encoding fault.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::Expired
                | Self::InvalidSignature
                | Self::InvalidClaims { .. }
                | Self::DecodingError { .. }
        )
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::MissingRequiredClaim(_) => Self::invalid_claims(err.to_string()),
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                Self::invalid_key(err.to_string())
            }
            _ => Self::decoding_error(err.to_string()),
        }
    }
}

// ============================================================================
// Token Kind and Algorithm
// ============================================================================

/// The two bearer token kinds issued for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived token presented on every request.
    Access,
    /// Long-lived token exchanged for new access tokens.
    Refresh,
}

impl TokenKind {
    /// Returns the kind name as used in keys and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Supported signing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningAlgorithm {
    /// RSA with SHA-256 (default).
    RS256,
    /// RSA with SHA-384.
    RS384,
}

impl SigningAlgorithm {
    /// Converts to the `jsonwebtoken` Algorithm type.
    #[must_use]
    pub fn to_jwt_algorithm(self) -> Algorithm {
        match self {
            Self::RS256 => Algorithm::RS256,
            Self::RS384 => Algorithm::RS384,
        }
    }

    /// Returns the algorithm name as used in JWT headers.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Claims
// ============================================================================

/// Claims carried by both token kinds.
///
/// The session identifier is the entire payload; everything else about the
/// bearer is resolved through the session record at verification time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Session identifier.
    pub sid: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

// ============================================================================
// Signing Key Pair
// ============================================================================

/// An RSA signing key pair for one token kind.
pub struct SigningKeyPair {
    /// Signing algorithm.
    pub algorithm: SigningAlgorithm,

    /// Encoding key (private key) for signing.
    encoding_key: EncodingKey,

    /// Decoding key (public key) for verification.
    decoding_key: DecodingKey,

    /// PEM-encoded public key, exportable to verifying peers.
    public_pem: String,
}

impl SigningKeyPair {
    /// Generates a new 2048-bit RSA key pair.
    ///
    /// # Errors
    /// Returns an error if key generation fails.
    pub fn generate_rsa(algorithm: SigningAlgorithm) -> Result<Self, TokenError> {
        let bits = 2048;
        let private_key = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| TokenError::key_generation_error(e.to_string()))?;

        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| TokenError::key_generation_error(e.to_string()))?;

        let public_pem = private_key
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| TokenError::key_generation_error(e.to_string()))?;

        Self::from_pem(algorithm, &private_pem, &public_pem)
    }

    /// Loads a key pair from PEM strings.
    ///
    /// # Errors
    /// Returns an error if the PEM data is invalid.
    pub fn from_pem(
        algorithm: SigningAlgorithm,
        private_pem: &str,
        public_pem: &str,
    ) -> Result<Self, TokenError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| TokenError::invalid_key(e.to_string()))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .map_err(|e| TokenError::invalid_key(e.to_string()))?;

        Ok(Self {
            algorithm,
            encoding_key,
            decoding_key,
            public_pem: public_pem.to_string(),
        })
    }

    /// Returns the PEM-encoded public key.
    #[must_use]
    pub fn public_key_pem(&self) -> &str {
        &self.public_pem
    }
}

// ============================================================================
// Token Issuer
// ============================================================================

/// A signed token together with its expiry instant.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The signed, encoded token string.
    pub token: String,

    /// When the token's validity window ends.
    pub expires_at: OffsetDateTime,
}

/// Issues and verifies bearer tokens for both kinds.
///
/// Thread-safe (`Send + Sync`); shared across async tasks behind an `Arc`.
pub struct TokenIssuer {
    access: KindMaterial,
    refresh: KindMaterial,
}

/// Key pair plus lifetime for one token kind.
struct KindMaterial {
    key_pair: SigningKeyPair,
    lifetime: std::time::Duration,
}

impl TokenIssuer {
    /// Creates a new issuer from two independent key pairs and the
    /// configured per-kind lifetimes.
    #[must_use]
    pub fn new(
        access_keys: SigningKeyPair,
        refresh_keys: SigningKeyPair,
        config: &TokenConfig,
    ) -> Self {
        Self {
            access: KindMaterial {
                key_pair: access_keys,
                lifetime: config.access_token_lifetime,
            },
            refresh: KindMaterial {
                key_pair: refresh_keys,
                lifetime: config.refresh_token_lifetime,
            },
        }
    }

    fn material(&self, kind: TokenKind) -> &KindMaterial {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Returns the configured lifetime for `kind`.
    #[must_use]
    pub fn lifetime(&self, kind: TokenKind) -> std::time::Duration {
        self.material(kind).lifetime
    }

    /// Returns the PEM-encoded public key for `kind`, for export to
    /// verifying peers.
    #[must_use]
    pub fn public_key_pem(&self, kind: TokenKind) -> &str {
        self.material(kind).key_pair.public_key_pem()
    }

    /// Signs a token of `kind` carrying only the session identifier.
    ///
    /// The expiry is computed strictly from this kind's own lifetime.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn issue(&self, kind: TokenKind, session_id: Uuid) -> Result<IssuedToken, TokenError> {
        let material = self.material(kind);
        let now = OffsetDateTime::now_utc();
        let expires_at = now + material.lifetime;

        let claims = SessionClaims {
            sid: session_id.to_string(),
            iat: now.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        };

        let header = Header::new(material.key_pair.algorithm.to_jwt_algorithm());
        let token = encode(&header, &claims, &material.key_pair.encoding_key)
            .map_err(|e| TokenError::encoding_error(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies a token of `kind` and returns the embedded session id.
    ///
    /// # Errors
    /// Returns [`TokenError::Expired`] when the validity window has
    /// elapsed, [`TokenError::InvalidSignature`] on signature mismatch, and
    /// other variants for malformed tokens. Callers must treat all of them
    /// as unauthorized but may log them differently.
    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<Uuid, TokenError> {
        let material = self.material(kind);

        let mut validation = Validation::new(material.key_pair.algorithm.to_jwt_algorithm());
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<SessionClaims>(token, &material.key_pair.decoding_key, &validation)
            .map_err(TokenError::from)?;

        Uuid::parse_str(&data.claims.sid)
            .map_err(|e| TokenError::invalid_claims(format!("sid is not a valid id: {e}")))
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Bearer token verification.
//!
//! Tokens are JWTs issued by the identity provider. Either a shared HS256
//! secret or the provider's JWKS (RS256/ES256) is used to verify them.

mod jwks;

pub use jwks::{Jwk, Jwks, JwksTokenVerifier};

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use status24_core::{AppError, TokenVerification};

/// Claims read from a verified session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// User id. Optional here so a token without it is reported as such.
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    /// Session id, when the provider sets one.
    #[serde(default)]
    pub sid: Option<String>,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verifies signature and expiry and returns the claims.
    async fn verify(&self, token: &str) -> Result<TokenClaims, AppError>;
}

pub(crate) fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AppError {
    tracing::debug!("JWT validation failed: {}", e);
    match e.kind() {
        ErrorKind::ExpiredSignature => AppError::Unauthorized("Token has expired".to_string()),
        ErrorKind::ImmatureSignature => {
            AppError::Unauthorized("Token is not yet valid (nbf)".to_string())
        }
        ErrorKind::InvalidSignature => {
            AppError::Unauthorized("Token signature is invalid".to_string())
        }
        _ => AppError::Unauthorized(format!("Token decode failed: {}", e)),
    }
}

/// HS256 verification with a shared secret.
pub struct SharedSecretVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SharedSecretVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl TokenVerifier for SharedSecretVerifier {
    async fn verify(&self, token: &str) -> Result<TokenClaims, AppError> {
        decode::<TokenClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }
}

/// Builds the verifier selected by configuration.
pub fn build_token_verifier(
    verification: &TokenVerification,
    timeout: std::time::Duration,
) -> anyhow::Result<Arc<dyn TokenVerifier>> {
    match verification {
        TokenVerification::SharedSecret(secret) => Ok(Arc::new(SharedSecretVerifier::new(secret))),
        TokenVerification::Jwks {
            url,
            cache_ttl_secs,
        } => Ok(Arc::new(JwksTokenVerifier::new(
            url.clone(),
            Some(*cache_ttl_secs),
            timeout,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "an-hs256-secret-that-is-long-enough";

    fn mint(sub: Option<&str>, exp_offset: i64, secret: &str) -> String {
        let claims = TokenClaims {
            sub: sub.map(str::to_string),
            exp: chrono::Utc::now().timestamp() + exp_offset,
            iat: None,
            sid: None,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn valid_token_yields_claims() {
        let verifier = SharedSecretVerifier::new(SECRET);
        let claims = verifier.verify(&mint(Some("user_1"), 600, SECRET)).await.unwrap();
        assert_eq!(claims.sub.as_deref(), Some("user_1"));
    }

    #[tokio::test]
    async fn token_without_subject_still_verifies() {
        let verifier = SharedSecretVerifier::new(SECRET);
        let claims = verifier.verify(&mint(None, 600, SECRET)).await.unwrap();
        assert!(claims.sub.is_none());
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let verifier = SharedSecretVerifier::new(SECRET);
        let err = verifier.verify(&mint(Some("user_1"), -600, SECRET)).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "Token has expired"));
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let verifier = SharedSecretVerifier::new(SECRET);
        let token = mint(Some("user_1"), 600, "some-other-secret-of-sufficient-length");
        assert!(matches!(
            verifier.verify(&token).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn garbage_is_rejected() {
        let verifier = SharedSecretVerifier::new(SECRET);
        assert!(verifier.verify("not-a-jwt").await.is_err());
    }
}

//! HS256 bearer token verification

use crate::config::AuthConfig;
use crate::domain::users::{AdminError, TokenVerifier};
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// Verifies tokens signed with the auth provider's shared secret
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience.as_str()]),
            None => validation.validate_aud = false,
        }
        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<Uuid, AdminError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            AdminError::InvalidToken
        })?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| AdminError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        exp: u64,
        aud: &'a str,
    }

    fn token(secret: &str, sub: &str, exp: u64) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &TestClaims {
                sub,
                exp,
                aud: "authenticated",
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn far_future() -> u64 {
        (chrono::Utc::now().timestamp() + 3600) as u64
    }

    fn config(audience: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            audience: audience.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_valid_token_yields_subject() {
        let user_id = Uuid::new_v4();
        let verifier = JwtVerifier::new(&config(Some("authenticated")));
        let token = token("test-secret", &user_id.to_string(), far_future());
        assert_eq!(verifier.verify(&token).await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_wrong_secret_is_rejected() {
        let verifier = JwtVerifier::new(&config(None));
        let token = token("other-secret", &Uuid::new_v4().to_string(), far_future());
        assert_eq!(verifier.verify(&token).await, Err(AdminError::InvalidToken));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let verifier = JwtVerifier::new(&config(None));
        let token = token("test-secret", &Uuid::new_v4().to_string(), 1_000);
        assert_eq!(verifier.verify(&token).await, Err(AdminError::InvalidToken));
    }

    #[tokio::test]
    async fn test_non_uuid_subject_is_rejected() {
        let verifier = JwtVerifier::new(&config(None));
        let token = token("test-secret", "service-role", far_future());
        assert_eq!(verifier.verify(&token).await, Err(AdminError::InvalidToken));
    }
}

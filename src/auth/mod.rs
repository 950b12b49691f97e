use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

pub mod password;

pub use password::{hash_password, verify_password};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account user name
    pub sub: String,
    pub profile_id: i64,
    pub token_type: TokenType,
    pub exp: i64,
    pub iat: i64,
    pub jti: Uuid,
}

impl Claims {
    pub fn new(user_name: String, profile_id: i64, token_type: TokenType, security: &SecurityConfig) -> Self {
        let now = Utc::now();
        let expiry_hours = match token_type {
            TokenType::Access => security.jwt_expiry_hours,
            TokenType::Refresh => security.refresh_expiry_hours,
        };
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_name,
            profile_id,
            token_type,
            exp,
            iat: now.timestamp(),
            jti: Uuid::new_v4(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Expected {expected:?} token")]
    WrongTokenType { expected: TokenType },
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Decode and check signature, expiry and token type
pub fn validate_jwt(token: &str, secret: &str, expected: TokenType) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    if token_data.claims.token_type != expected {
        return Err(JwtError::WrongTokenType { expected });
    }
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn security() -> SecurityConfig {
        AppConfig::development().security
    }

    #[test]
    fn access_token_round_trip() {
        let security = security();
        let claims = Claims::new("ann".into(), 7, TokenType::Access, &security);
        let token = generate_jwt(&claims, &security.jwt_secret).unwrap();

        let decoded = validate_jwt(&token, &security.jwt_secret, TokenType::Access).unwrap();
        assert_eq!(decoded.sub, "ann");
        assert_eq!(decoded.profile_id, 7);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let security = security();
        let claims = Claims::new("ann".into(), 7, TokenType::Refresh, &security);
        let token = generate_jwt(&claims, &security.jwt_secret).unwrap();

        assert!(matches!(
            validate_jwt(&token, &security.jwt_secret, TokenType::Access),
            Err(JwtError::WrongTokenType { .. })
        ));
        assert!(claims.exp > Claims::new("ann".into(), 7, TokenType::Access, &security).exp);
    }

    #[test]
    fn rejects_foreign_signature_and_empty_secret() {
        let security = security();
        let claims = Claims::new("ann".into(), 7, TokenType::Access, &security);
        let token = generate_jwt(&claims, "some-other-secret").unwrap();

        assert!(matches!(
            validate_jwt(&token, &security.jwt_secret, TokenType::Access),
            Err(JwtError::InvalidToken(_))
        ));
        assert!(matches!(generate_jwt(&claims, ""), Err(JwtError::InvalidSecret)));
    }
}

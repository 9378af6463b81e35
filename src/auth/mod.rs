pub mod principal;
pub mod resolver;
pub mod roles;

pub use principal::{PrincipalContext, RoleFlags};
pub use resolver::{ConfigEnvironment, EnvironmentProvider, PrincipalResolver, StaticEnvironment};
pub use roles::{Role, RoleLookupError, RoleStore};

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Audience Supabase stamps on user session tokens
pub const SESSION_AUDIENCE: &str = "authenticated";

/// Session token claims. `sub` is the auth user id that row owner fields refer to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub aud: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Fails with [`TokenError::InvalidExpiry`] when the lifetime overflows the clock
    pub fn new(user_id: Uuid, expiry_hours: u64) -> Result<Self, TokenError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(TokenError::InvalidExpiry(expiry_hours))?
            .timestamp();

        Ok(Self {
            sub: user_id,
            aud: SESSION_AUDIENCE.to_string(),
            role: SESSION_AUDIENCE.to_string(),
            exp,
            iat: now.timestamp(),
        })
    }
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("Token lifetime of {0} hours is out of range")]
    InvalidExpiry(u64),

    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Invalid JWT token: {0}")]
    Invalid(String),
}

pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| TokenError::Generation(e.to_string()))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.set_audience(&[SESSION_AUDIENCE]);

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| TokenError::Invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_decode_back_to_the_same_subject() {
        let user_id = Uuid::new_v4();
        let token = issue_token(&Claims::new(user_id, 1).unwrap(), "test-secret").unwrap();
        let claims = decode_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.aud, SESSION_AUDIENCE);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(&Claims::new(Uuid::new_v4(), 1).unwrap(), "test-secret").unwrap();
        assert!(matches!(decode_token(&token, "other"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        assert!(matches!(
            issue_token(&Claims::new(Uuid::new_v4(), 1).unwrap(), ""),
            Err(TokenError::InvalidSecret)
        ));
    }

    #[test]
    fn oversized_lifetime_is_an_error_not_a_panic() {
        assert!(matches!(
            Claims::new(Uuid::new_v4(), u64::MAX / 2),
            Err(TokenError::InvalidExpiry(_))
        ));
        assert!(matches!(
            Claims::new(Uuid::new_v4(), u64::MAX),
            Err(TokenError::InvalidExpiry(_))
        ));
    }
}

pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::{Account, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(account: &Account, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: account.id.to_string(),
            username: account.username.clone(),
            role: account.role,
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn account_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Invalid("subject is not an account id".to_string()))
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    Encoding(String),

    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, TokenError> {
    if security.jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), claims, &encoding_key).map_err(|e| TokenError::Encoding(e.to_string()))
}

/// Verify signature and expiry, returning the decoded claims
pub fn decode_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, TokenError> {
    if security.jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::models::AccountStatus;

    fn account() -> Account {
        Account {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            name: "Jane Doe".to_string(),
            department: Some("CID".to_string()),
            badge_number: None,
            role: Role::Officer,
            status: AccountStatus::Active,
            password_hash: String::new(),
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_decodes_to_same_subject() {
        let security = AppConfig::development().security;
        let account = account();

        let token = generate_jwt(&Claims::new(&account, 1), &security).unwrap();
        let claims = decode_jwt(&token, &security).unwrap();

        assert_eq!(claims.account_id().unwrap(), account.id);
        assert_eq!(claims.username, "jdoe");
        assert_eq!(claims.role, Role::Officer);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let security = AppConfig::development().security;
        let mut claims = Claims::new(&account(), 1);
        claims.iat -= 7200;
        claims.exp = Utc::now().timestamp() - 3600;

        let token = generate_jwt(&claims, &security).unwrap();
        assert!(matches!(decode_jwt(&token, &security), Err(TokenError::Expired)));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let security = AppConfig::development().security;
        let mut other = security.clone();
        other.jwt_secret = "another-secret".to_string();

        let token = generate_jwt(&Claims::new(&account(), 1), &other).unwrap();
        assert!(matches!(decode_jwt(&token, &security), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        let mut security = AppConfig::development().security;
        security.jwt_secret.clear();
        assert!(matches!(
            generate_jwt(&Claims::new(&account(), 1), &security),
            Err(TokenError::MissingSecret)
        ));
    }
}

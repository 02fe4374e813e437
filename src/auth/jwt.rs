//! HS256 access tokens.
//!
//! The token is the only session state: it carries the user id and email and
//! expires after the configured number of hours. There is no refresh flow.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

/// Claims embedded in every access token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject, the user's id
    pub sub: Uuid,
    pub email: String,
    /// Expiration time (UTC Unix timestamp)
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp)
    pub iat: i64,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 signing secret
    pub secret: String,
    pub expiry_hours: i64,
}

impl From<&Config> for JwtConfig {
    fn from(config: &Config) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiry_hours: config.jwt_expiry_hours,
        }
    }
}

pub fn generate_access_token(
    user_id: Uuid,
    email: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: now + config.expiry_hours * 3600,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Checks signature and expiry, returning the embedded claims
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

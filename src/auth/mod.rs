//! Credential handling for the account endpoints.
//!
//! - [`password`]: Argon2id hashing and verification.
//! - [`jwt`]: bearer token issuing and validation.

pub mod jwt;
pub mod password;

pub use jwt::{generate_access_token, validate_token, Claims, JwtConfig};
pub use password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};

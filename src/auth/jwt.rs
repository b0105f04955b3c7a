//! JWT token generation and validation

use crate::core::error::{RailError, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// User role ('USER' or 'ADMIN')
    pub role: String,
    pub exp: usize,
}

/// Generate a JWT token for a user
pub fn generate_token(user_id: &str, role: &str, secret: &str, ttl_days: i64) -> Result<String> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::days(ttl_days))
        .ok_or_else(|| RailError::AuthenticationError("Failed to calculate expiration".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| RailError::AuthenticationError(format!("Failed to generate token: {}", e)))
}

/// Validate a JWT token and extract claims
///
/// Missing, malformed and expired tokens all surface as the same
/// authentication error.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| RailError::AuthenticationError(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}

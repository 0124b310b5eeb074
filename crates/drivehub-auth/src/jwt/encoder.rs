//! JWT token signing.
//!
//! Production tokens come from the identity service; this encoder signs
//! with the same shared secret for local tooling and tests.

use jsonwebtoken::{EncodingKey, Header, encode};

use drivehub_core::config::AuthConfig;
use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;

use super::claims::Claims;

/// Signs claims with the configured HS256 secret.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder").finish_non_exhaustive()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    /// Sign `claims` into a compact token.
    pub fn encode(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }
}

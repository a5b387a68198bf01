use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;

// ============================================================================
// Password hashing
// ============================================================================

/// Hashes a plain password with bcrypt. Each call salts independently, so
/// repeated calls produce different strings that all verify.
pub fn hash_password(plain: &str) -> Result<String> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST).context("Failed to hash password")
}

/// Verifies a plain password against a stored bcrypt hash.
///
/// A malformed stored hash is treated as a non-match, not an error.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    bcrypt::verify(plain, stored_hash).unwrap_or(false)
}

// ============================================================================
// Token service
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's ID. A token whose subject does not parse as a
    /// UUID is rejected during decoding.
    pub sub: Uuid,
    /// Expiration time (Unix seconds).
    pub exp: i64,
}

/// Issues and validates signed access tokens.
///
/// Single shared-secret symmetric scheme: no refresh tokens, no revocation
/// list. Tokens are stateless and die only by expiry.
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_token_ttl_minutes: i64,
}

impl AuthManager {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        if config.secret_key.is_empty() {
            anyhow::bail!("AUTH_SECRET_KEY must not be empty");
        }

        let algorithm = match config.algorithm.as_str() {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => anyhow::bail!(
                "Unsupported AUTH_ALGORITHM '{}'. Only HS256/HS384/HS512 are supported.",
                other
            ),
        };

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            algorithm,
            access_token_ttl_minutes: config.access_token_expire_minutes,
        })
    }

    /// Creates a new signed access token for the given user.
    pub fn create_access_token(&self, user_id: &Uuid) -> Result<String> {
        let expire = Utc::now() + Duration::minutes(self.access_token_ttl_minutes);
        let claims = Claims {
            sub: *user_id,
            exp: expire.timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .context("Failed to encode access token")
    }

    /// Verifies signature, algorithm and expiry, and parses the subject.
    ///
    /// Every failure mode (bad signature, wrong algorithm, malformed payload,
    /// expired, unparsable subject) collapses into a single error; callers
    /// translate it to one opaque 401 so clients learn nothing about why.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Token validation failed")?;

        // jsonwebtoken keeps exp == now alive; expiry here is strict.
        if token_data.claims.exp <= Utc::now().timestamp() {
            anyhow::bail!("Token validation failed: token expired");
        }

        Ok(token_data.claims)
    }
}

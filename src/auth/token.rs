use crate::config::JwtConfig;
use crate::error::AppError;
use actix_web::cookie::time;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Id of the authenticated user.
    pub sub: i32,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signs and verifies session tokens with a shared HMAC secret.
///
/// Built once at startup and shared with handlers and `AuthMiddleware`
/// through `web::Data<TokenService>`.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl: chrono::Duration,
}

impl TokenService {
    pub fn new(secret: &str, algorithm: Algorithm, ttl: chrono::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            ttl,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(
            &config.secret,
            config.algorithm,
            chrono::Duration::minutes(config.expire_minutes),
        )
    }

    /// How long an issued token stays valid, in cookie terms.
    pub fn cookie_max_age(&self) -> time::Duration {
        time::Duration::seconds(self.ttl.num_seconds())
    }

    /// Issues a token for `user_id` expiring after the configured lifetime.
    pub fn generate_token(&self, user_id: i32) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let expiration = now.checked_add_signed(self.ttl).ok_or_else(|| {
            AppError::InternalServerError("Token expiration out of range".into())
        })?;

        let claims = Claims {
            sub: user_id,
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Checks signature and expiry and returns the decoded claims.
    ///
    /// Malformed, forged and expired tokens all yield `AppError::Unauthorized`.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(self.algorithm))
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }
}

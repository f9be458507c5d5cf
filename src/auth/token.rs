use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::str::FromStr;
use tracing::{debug, instrument, warn};

use super::types::TokenClaims;
use crate::shared::AppError;

const FALLBACK_SECRET: &str = "fallback-secret-key";

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    algorithm: Algorithm,
    pub expire_minutes: i64,
}

impl TokenConfig {
    /// HS256 signer with the given secret and lifetime
    pub fn new(secret: String, expire_minutes: i64) -> Self {
        Self {
            secret,
            algorithm: Algorithm::HS256,
            expire_minutes,
        }
    }

    /// Switches to another HMAC algorithm. Only the HS family works with a shared secret.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Result<Self, AppError> {
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AppError::ConfigError(format!(
                "Unsupported signing algorithm {:?}, expected HS256, HS384 or HS512",
                algorithm
            )));
        }
        self.algorithm = algorithm;
        Ok(self)
    }

    /// Reads `SECRET_KEY`, `ALGORITHM` (default HS256) and
    /// `ACCESS_TOKEN_EXPIRE_MINUTES` (default 30).
    pub fn from_env() -> Result<Self, AppError> {
        let secret = std::env::var("SECRET_KEY").unwrap_or_else(|_| {
            warn!("SECRET_KEY not set, using the development fallback key");
            FALLBACK_SECRET.to_string()
        });

        let expire_minutes = match std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Err(_) => 30,
            Ok(raw) => parse_expire_minutes(&raw)?,
        };

        let algorithm = match std::env::var("ALGORITHM") {
            Err(_) => Algorithm::HS256,
            Ok(raw) => Algorithm::from_str(&raw)
                .map_err(|_| AppError::ConfigError(format!("Invalid ALGORITHM '{raw}'")))?,
        };

        Self::new(secret, expire_minutes).with_algorithm(algorithm)
    }

    /// Creates a signed token whose subject is the username
    #[instrument(skip(self))]
    pub fn create_token(&self, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = expires_at(now, self.expire_minutes)
            .ok_or_else(|| {
                warn!(
                    expire_minutes = self.expire_minutes,
                    "Token lifetime out of range"
                );
                AppError::Internal
            })?
            .timestamp()
            .max(0) as usize;

        debug!(
            expire_minutes = self.expire_minutes,
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let claims = TokenClaims {
            sub: username.to_string(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::new(self.algorithm),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            warn!(error = %e, "Failed to encode JWT token");
            AppError::JwtError(e.to_string())
        })
    }

    /// Verifies signature and expiry and returns the claims
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, AppError> {
        debug!("Decoding and validating JWT token");

        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::new(self.algorithm),
        )
        .map(|data| {
            debug!(
                username = %data.claims.sub,
                exp = data.claims.exp,
                "JWT token decoded successfully"
            );
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::JwtError(e.to_string())
        })
    }
}

/// `None` when the lifetime does not fit in a timestamp
fn expires_at(now: DateTime<Utc>, expire_minutes: i64) -> Option<DateTime<Utc>> {
    Duration::try_minutes(expire_minutes).and_then(|lifetime| now.checked_add_signed(lifetime))
}

fn parse_expire_minutes(raw: &str) -> Result<i64, AppError> {
    match raw.trim().parse::<i64>() {
        Ok(minutes) if minutes > 0 && expires_at(Utc::now(), minutes).is_some() => Ok(minutes),
        _ => Err(AppError::ConfigError(format!(
            "Invalid ACCESS_TOKEN_EXPIRE_MINUTES '{raw}': must be a positive number of minutes within the timestamp range"
        ))),
    }
}

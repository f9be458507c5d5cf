use std::net::SocketAddr;
use tracing::warn;

use crate::auth::token::TokenConfig;
use crate::shared::AppError;

/// Configuration for the database connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Reads `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS` (defaults to 5).
    /// Returns `None` when no database URL is configured.
    pub fn from_env() -> Result<Option<Self>, AppError> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => return Ok(None),
        };

        let max_connections = match std::env::var("DATABASE_MAX_CONNECTIONS") {
            Err(_) => 5,
            Ok(raw) => {
                let parsed: u32 = raw.parse().map_err(|_| {
                    AppError::ConfigError(format!(
                        "Invalid DATABASE_MAX_CONNECTIONS '{raw}': must be a positive integer"
                    ))
                })?;
                if parsed == 0 {
                    return Err(AppError::ConfigError(
                        "DATABASE_MAX_CONNECTIONS must be at least 1".into(),
                    ));
                }
                parsed
            }
        };

        Ok(Some(Self {
            url,
            max_connections,
        }))
    }
}

/// Process configuration assembled from the environment at startup
#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database: Option<DatabaseConfig>,
    pub token: TokenConfig,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
            .parse()
            .map_err(|e| AppError::ConfigError(format!("Invalid BIND_ADDR: {e}")))?;

        let bcrypt_cost = match std::env::var("BCRYPT_COST") {
            Err(_) => bcrypt::DEFAULT_COST,
            Ok(raw) => parse_bcrypt_cost(&raw)?,
        };

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost,http://localhost:8080".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let database = DatabaseConfig::from_env()?;
        if database.is_none() {
            warn!("DATABASE_URL not set, data will be kept in memory only");
        }

        Ok(Self {
            bind_addr,
            database,
            token: TokenConfig::from_env()?,
            bcrypt_cost,
            cors_origins,
        })
    }
}

fn parse_bcrypt_cost(raw: &str) -> Result<u32, AppError> {
    let cost: u32 = raw
        .parse()
        .map_err(|_| AppError::ConfigError(format!("Invalid BCRYPT_COST '{raw}'")))?;
    if !(4..=31).contains(&cost) {
        return Err(AppError::ConfigError(
            "BCRYPT_COST must be between 4 and 31".into(),
        ));
    }
    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bcrypt_cost() {
        assert_eq!(parse_bcrypt_cost("10").unwrap(), 10);
        assert!(parse_bcrypt_cost("3").is_err());
        assert!(parse_bcrypt_cost("32").is_err());
        assert!(parse_bcrypt_cost("ten").is_err());
    }
}

use std::{env, fmt::Display, net::SocketAddr, ops::RangeInclusive, str::FromStr};

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://planner.db";
const DEFAULT_JWT_SECRET: &str = "your-secret-key";

const BCRYPT_COST_RANGE: RangeInclusive<u32> = 4..=31;
const JWT_EXPIRES_IN_DAYS_RANGE: RangeInclusive<i64> = 1..=3650;

/// Startup failures; these never reach an HTTP response.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: &'static str,
        value: String,
        min: String,
        max: String,
    },

    #[error("invalid listen address {0}")]
    Addr(String),
}

// Process-wide settings, read once at startup and handed down through AppState
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in_days: i64,
    pub host: String,
    pub port: u16,
    pub cors_origin: Option<String>,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenv::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET is not set, falling back to the development secret");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let config = Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            jwt_expires_in_days: parse_var("JWT_EXPIRES_IN_DAYS", 7)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 5000)?,
            cors_origin: env::var("CORS_ORIGIN").ok().filter(|origin| !origin.is_empty()),
            bcrypt_cost: parse_var("BCRYPT_COST", 10)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that parse but would break hashing or token issue later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("BCRYPT_COST", self.bcrypt_cost, &BCRYPT_COST_RANGE)?;
        check_range(
            "JWT_EXPIRES_IN_DAYS",
            self.jwt_expires_in_days,
            &JWT_EXPIRES_IN_DAYS_RANGE,
        )
    }

    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Addr(addr))
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn check_range<T: PartialOrd + Display>(
    key: &'static str,
    value: T,
    range: &RangeInclusive<T>,
) -> Result<(), ConfigError> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::OutOfRange {
        key,
        value: value.to_string(),
        min: range.start().to_string(),
        max: range.end().to_string(),
    })
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expires_in_days: 7,
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origin: None,
            bcrypt_cost: 10,
        }
    }
}

//! Runtime configuration read from the environment (and `.env` via `dotenv`).

pub mod task_params;

use std::env;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

use crate::cookies::CookieSettings;

pub use task_params::{FilterOption, SortOption, TaskListParams};

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_MINUTES: i64 = 60 * 24 * 365;
/// Longest accepted confirm-delete window: one day.
pub const MAX_CONFIRM_DELETE_SECONDS: i64 = 60 * 60 * 24;

/// Raised when a required variable is missing or a value does not parse.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has an invalid value: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub expire_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server_host: String,
    pub server_port: u16,
    pub jwt: JwtConfig,
    pub cookie_secure: bool,
    pub confirm_delete_ttl_seconds: i64,
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let algorithm = match lookup("JWT_ALGORITHM") {
            Some(value) => parse_hmac_algorithm(&value)?,
            None => Algorithm::HS256,
        };

        Ok(Self {
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse_in_range(
                    "DATABASE_MAX_CONNECTIONS",
                    &lookup,
                    10,
                    1..=u32::MAX,
                )?,
            },
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_or("SERVER_PORT", &lookup, 8000)?,
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
                algorithm,
                expire_minutes: parse_in_range(
                    "JWT_EXPIRE_MINUTES",
                    &lookup,
                    60,
                    1..=MAX_TOKEN_MINUTES,
                )?,
            },
            cookie_secure: parse_or("COOKIE_SECURE", &lookup, false)?,
            confirm_delete_ttl_seconds: parse_in_range(
                "CONFIRM_DELETE_TTL_SECONDS",
                &lookup,
                300,
                1..=MAX_CONFIRM_DELETE_SECONDS,
            )?,
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN").filter(|o| !o.is_empty()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn cookie_settings(&self) -> CookieSettings {
        CookieSettings {
            secure: self.cookie_secure,
            confirm_delete_ttl: actix_web::cookie::time::Duration::seconds(
                self.confirm_delete_ttl_seconds,
            ),
        }
    }
}

fn parse_or<T, F>(key: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

// Like `parse_or`, but values outside `range` are rejected too.
fn parse_in_range<T, F>(
    key: &'static str,
    lookup: &F,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) if range.contains(&parsed) => Ok(parsed),
            _ => Err(ConfigError::Invalid { key, value }),
        },
        None => Ok(default),
    }
}

// Tokens are signed with a shared secret, so only the HMAC family applies.
fn parse_hmac_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    match Algorithm::from_str(value.trim()) {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
        _ => Err(ConfigError::Invalid {
            key: "JWT_ALGORITHM",
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenService;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.database.url, "postgres://test");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.jwt.algorithm, Algorithm::HS256);
        assert_eq!(config.jwt.expire_minutes, 60);
        assert!(!config.cookie_secure);
        assert_eq!(config.confirm_delete_ttl_seconds, 300);
        assert!(config.cors_allowed_origin.is_none());
        assert_eq!(config.server_url(), "http://0.0.0.0:8000");
    }

    #[test]
    fn test_config_custom_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "127.0.0.1"),
            ("JWT_ALGORITHM", "HS512"),
            ("COOKIE_SECURE", "true"),
            ("CONFIRM_DELETE_TTL_SECONDS", "30"),
            ("CORS_ALLOWED_ORIGIN", "http://localhost:5173"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.jwt.algorithm, Algorithm::HS512);
        assert!(config.cookie_settings().secure);
        assert_eq!(
            config.cookie_settings().confirm_delete_ttl,
            actix_web::cookie::time::Duration::seconds(30)
        );
        assert_eq!(
            config.cors_allowed_origin.as_deref(),
            Some("http://localhost:5173")
        );
    }

    #[test]
    fn test_config_errors() {
        let missing = Config::from_lookup(lookup_from(&[("JWT_SECRET", "secret")]));
        assert_eq!(missing.unwrap_err(), ConfigError::Missing("DATABASE_URL"));

        let bad_port = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("SERVER_PORT", "eighty"),
        ]));
        assert!(matches!(
            bad_port.unwrap_err(),
            ConfigError::Invalid { key: "SERVER_PORT", .. }
        ));

        let rsa = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("JWT_ALGORITHM", "RS256"),
        ]));
        assert!(matches!(
            rsa.unwrap_err(),
            ConfigError::Invalid { key: "JWT_ALGORITHM", .. }
        ));
    }

    #[test]
    fn test_config_rejects_out_of_range_durations() {
        let with = |key: &'static str, value: &'static str| {
            Config::from_lookup(lookup_from(&[
                ("DATABASE_URL", "postgres://test"),
                ("JWT_SECRET", "secret"),
                (key, value),
            ]))
        };

        for value in ["0", "-5", "9223372036854775807", "525601"] {
            assert_eq!(
                with("JWT_EXPIRE_MINUTES", value).unwrap_err(),
                ConfigError::Invalid {
                    key: "JWT_EXPIRE_MINUTES",
                    value: value.to_string()
                }
            );
        }
        for value in ["0", "-1", "86401"] {
            assert_eq!(
                with("CONFIRM_DELETE_TTL_SECONDS", value).unwrap_err(),
                ConfigError::Invalid {
                    key: "CONFIRM_DELETE_TTL_SECONDS",
                    value: value.to_string()
                }
            );
        }
        assert_eq!(
            with("DATABASE_MAX_CONNECTIONS", "0").unwrap_err(),
            ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS",
                value: "0".to_string()
            }
        );
    }

    #[test]
    fn test_longest_token_lifetime_still_issues_tokens() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("JWT_EXPIRE_MINUTES", "525600"),
        ]))
        .unwrap();
        assert_eq!(config.jwt.expire_minutes, MAX_TOKEN_MINUTES);

        let tokens = TokenService::from_config(&config.jwt);
        let token = tokens.generate_token(1).unwrap();
        assert_eq!(tokens.verify_token(&token).unwrap().sub, 1);
    }
}

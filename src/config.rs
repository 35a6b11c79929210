// Process configuration
// Read from the environment (optionally seeded from a .env file)

use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://polls.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
const DEFAULT_JWT_SECRET: &str = "dev-secret-key";

/// Errors raised while loading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Credentials for the user created on start-up when it does not exist yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// Runtime configuration for the API server
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub public_url: String,
    pub jwt_secret: String,
    pub page_size: u32,
    pub admin: Option<AdminCredentials>,
}

impl Config {
    /// Loads configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup
    ///
    /// Unset keys fall back to their defaults; set but unparsable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set, using insecure development default");
            DEFAULT_JWT_SECRET.to_string()
        });

        let page_size: u32 = parse_or("PAGE_SIZE", lookup("PAGE_SIZE"), 10)?;
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "PAGE_SIZE",
                reason: "must be greater than zero".to_string(),
            });
        }

        let admin = match (lookup("ADMIN_USERNAME"), lookup("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "ADMIN_USERNAME",
                    reason: "ADMIN_USERNAME and ADMIN_PASSWORD must be set together".to_string(),
                })
            }
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| {
                tracing::info!("DATABASE_URL not set, using default: {}", DEFAULT_DATABASE_URL);
                DEFAULT_DATABASE_URL.to_string()
            }),
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                lookup("DATABASE_MAX_CONNECTIONS"),
                5,
            )?,
            bind_addr: parse_or(
                "BIND_ADDR",
                lookup("BIND_ADDR"),
                SocketAddr::from(([0, 0, 0, 0], 3000)),
            )?,
            public_url: lookup("PUBLIC_URL")
                .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            jwt_secret,
            page_size,
            admin,
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            database_max_connections: 5,
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 3000))),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            page_size: 10,
            admin: None,
        }
    }
}

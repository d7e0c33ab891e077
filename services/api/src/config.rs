//! services/api/src/config.rs
//!
//! Service settings, read once from the environment at startup. A `.env` file
//! in the working directory is honoured outside of tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

/// Default cap on a single upload: 20 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub cors_origin: String,
    pub db_max_connections: u32,
}

/// Parses an optional variable, falling back to `default` when it is unset.
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

fn string_var(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Builds the configuration from environment variables. Only
    /// `DATABASE_URL` is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let default_bind = SocketAddr::from_str(DEFAULT_BIND_ADDRESS)
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        Ok(Self {
            bind_address: parse_var("BIND_ADDRESS", default_bind)?,
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?,
            log_level: parse_var("RUST_LOG", Level::INFO)?,
            upload_dir: PathBuf::from(string_var("UPLOAD_DIR", DEFAULT_UPLOAD_DIR)),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            cors_origin: string_var("CORS_ORIGIN", DEFAULT_CORS_ORIGIN),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5u32)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_numbers_take_their_defaults() {
        assert_eq!(parse_var("EXAMEASE_TEST_UNSET_VAR", 7u32).unwrap(), 7);
    }

    #[test]
    fn malformed_numbers_name_the_variable() {
        std::env::set_var("EXAMEASE_TEST_BAD_NUMBER", "lots");
        let err = parse_var("EXAMEASE_TEST_BAD_NUMBER", 1usize).unwrap_err();
        assert!(err.to_string().contains("EXAMEASE_TEST_BAD_NUMBER"));
    }

    #[test]
    fn levels_and_addresses_parse_like_numbers() {
        std::env::set_var("EXAMEASE_TEST_LEVEL", "debug");
        assert_eq!(parse_var("EXAMEASE_TEST_LEVEL", Level::INFO).unwrap(), Level::DEBUG);

        std::env::set_var("EXAMEASE_TEST_ADDR", "127.0.0.1:8080");
        let addr: SocketAddr = parse_var("EXAMEASE_TEST_ADDR", SocketAddr::from(([0, 0, 0, 0], 1))).unwrap();
        assert_eq!(addr.port(), 8080);
    }
}

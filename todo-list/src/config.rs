//! Configuration management for the to-do server.
//!
//! Loaded from environment variables (after `.env`, if present) with defaults
//! for everything. A variable that is set but does not parse is an error
//! rather than a silent fallback.

use crate::reducer::DEFAULT_MAX_TEXT_LEN;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but its value is not usable.
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// What was expected
        reason: String,
    },
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Host to bind to (`TODO_HOST`, default `127.0.0.1`)
    pub host: String,
    /// Port to bind to (`TODO_PORT`, default `8000`)
    pub port: u16,
    /// Log filter used when `RUST_LOG` is unset (`TODO_LOG_LEVEL`, default `info`)
    pub log_level: String,
    /// Longest accepted item text in characters (`TODO_MAX_TEXT_LEN`, default `200`)
    pub max_text_len: usize,
    /// How long a view waits for the outcome of its command (`TODO_DISPATCH_TIMEOUT_MS`, default `5000`)
    pub dispatch_timeout: Duration,
    /// Grace period for in-flight effects on shutdown (`TODO_SHUTDOWN_TIMEOUT_SECS`, default `10`)
    pub shutdown_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            max_text_len: DEFAULT_MAX_TEXT_LEN,
            dispatch_timeout: Duration::from_millis(5000),
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set to an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_text_len = parse(&lookup, "TODO_MAX_TEXT_LEN", defaults.max_text_len)?;
        if max_text_len == 0 {
            return Err(ConfigError::Invalid {
                key: "TODO_MAX_TEXT_LEN",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            host: lookup("TODO_HOST").unwrap_or(defaults.host),
            port: parse(&lookup, "TODO_PORT", defaults.port)?,
            log_level: lookup("TODO_LOG_LEVEL").unwrap_or(defaults.log_level),
            max_text_len,
            dispatch_timeout: lookup("TODO_DISPATCH_TIMEOUT_MS")
                .map(|raw| parse_value("TODO_DISPATCH_TIMEOUT_MS", raw).map(Duration::from_millis))
                .transpose()?
                .unwrap_or(defaults.dispatch_timeout),
            shutdown_timeout: lookup("TODO_SHUTDOWN_TIMEOUT_SECS")
                .map(|raw| parse_value("TODO_SHUTDOWN_TIMEOUT_SECS", raw).map(Duration::from_secs))
                .transpose()?
                .unwrap_or(defaults.shutdown_timeout),
        })
    }

    /// Address the server listens on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `host` is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "TODO_HOST",
                value: self.host.clone(),
                reason: e.to_string(),
            })
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| parse_value(key, raw))
}

fn parse_value<T>(key: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value: raw,
    })
}

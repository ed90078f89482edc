//! Startup configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const BIND_ADDR_ENV: &str = "PRINTFLEET_BIND_ADDR";
pub const SEED_FILE_ENV: &str = "PRINTFLEET_SEED_FILE";
pub const DEFAULT_LOOKBACK_ENV: &str = "PRINTFLEET_DEFAULT_LOOKBACK_MONTHS";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_LOOKBACK_MONTHS: i64 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidBindAddr { var: &'static str, value: String },

    #[error("{var} must be a positive number of months, got {value}")]
    InvalidLookback { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub seed_file: Option<PathBuf>,
    pub default_lookback_months: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            seed_file: None,
            default_lookback_months: DEFAULT_LOOKBACK_MONTHS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the environment in prod).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr {
                var: BIND_ADDR_ENV,
                value: bind_raw.clone(),
            })?;

        let seed_file = lookup(SEED_FILE_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let default_lookback_months = match lookup(DEFAULT_LOOKBACK_ENV) {
            None => DEFAULT_LOOKBACK_MONTHS,
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(months) if months > 0 => months,
                _ => {
                    return Err(ConfigError::InvalidLookback {
                        var: DEFAULT_LOOKBACK_ENV,
                        value: raw,
                    });
                }
            },
        };

        Ok(Self {
            bind_addr,
            seed_file,
            default_lookback_months,
        })
    }
}

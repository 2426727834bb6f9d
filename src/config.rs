use std::net::SocketAddr;
use thiserror::Error;

pub const BIND_ADDR_VAR: &str = "SCHEDULER_BIND_ADDR";
pub const LOG_VAR: &str = "SCHEDULER_LOG";
pub const SEED_VAR: &str = "SCHEDULER_SEED";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be a socket address like 127.0.0.1:8080, got '{value}'")]
    BadAddress { var: &'static str, value: String },
    #[error("{var} must be an unsigned integer, got '{value}'")]
    BadSeed { var: &'static str, value: String },
}

/// Runtime settings for the HTTP service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Default env_logger filter; `RUST_LOG` still wins when set.
    pub log_filter: String,
    /// Seed for room picks. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, defaulting unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = addr.trim().parse().map_err(|_| ConfigError::BadAddress {
            var: BIND_ADDR_VAR,
            value: addr.clone(),
        })?;

        let log_filter = lookup(LOG_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let seed = match lookup(SEED_VAR) {
            Some(value) if !value.trim().is_empty() => {
                Some(value.trim().parse().map_err(|_| ConfigError::BadSeed {
                    var: SEED_VAR,
                    value: value.clone(),
                })?)
            }
            _ => None,
        };

        Ok(Self {
            bind_addr,
            log_filter,
            seed,
        })
    }
}

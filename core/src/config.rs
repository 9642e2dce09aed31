//! Startup configuration for the API client.
//!
//! The base URL is read once, validated, and handed to `UserApi` as a value.
//! A missing or malformed URL is a startup failure, never a per-request one.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::retry::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};

pub const BASE_URL_VAR: &str = "USER_API_BASE_URL";
pub const MAX_ATTEMPTS_VAR: &str = "USER_API_MAX_ATTEMPTS";
pub const RETRY_DELAY_MS_VAR: &str = "USER_API_RETRY_DELAY_MS";
pub const TIMEOUT_SECS_VAR: &str = "USER_API_TIMEOUT_SECS";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not set; it must hold the user API base URL")]
    Missing { var: &'static str },

    #[error("invalid API base URL {value:?}: {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("API base URL {value:?} must use http or https")]
    UnsupportedScheme { value: String },

    #[error("{var} must be {expected}, got {value:?}")]
    InvalidNumber {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
    retry: RetryPolicy,
    timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Missing { var: BASE_URL_VAR });
        }
        let url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidUrl {
            value: trimmed.to_string(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(ConfigError::UnsupportedScheme {
                value: trimmed.to_string(),
            });
        }
        Ok(Self {
            base_url: url,
            retry: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_VAR).ok_or(ConfigError::Missing { var: BASE_URL_VAR })?;
        let mut config = Self::new(&base_url)?;

        let attempts = read_number(&lookup, MAX_ATTEMPTS_VAR)?
            .map_or(DEFAULT_MAX_ATTEMPTS, |n| u32::try_from(n).unwrap_or(u32::MAX));
        let delay = read_number(&lookup, RETRY_DELAY_MS_VAR)?
            .map_or(DEFAULT_BASE_DELAY, Duration::from_millis);
        config.retry = RetryPolicy::new(attempts, delay);

        match read_number(&lookup, TIMEOUT_SECS_VAR)? {
            // A zero timeout fails every request before it is sent.
            Some(0) => {
                return Err(ConfigError::InvalidNumber {
                    var: TIMEOUT_SECS_VAR,
                    value: "0".to_string(),
                    expected: "a positive integer",
                })
            }
            Some(secs) => config.timeout = Duration::from_secs(secs),
            None => {}
        }
        Ok(config)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn read_number<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber {
                var,
                value: raw,
                expected: "a non-negative integer",
            }),
    }
}

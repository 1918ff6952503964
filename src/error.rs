use std::time::Duration;

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Market-data source errors.
///
/// None of these are fatal: the polling loop skips the cycle on
/// `Unavailable`/`InvalidResponse` and pauses on `RateLimited`.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("rate limited, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl SourceError {
    /// Retry delay requested by the source, if this is a rate limit.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Unavailable(err.to_string())
        }
    }
}

/// Per-subscriber delivery failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Recipient blocked the bot or no longer exists. The subscriber should be removed.
    #[error("recipient permanently unreachable: {0}")]
    PermanentlyUnreachable(String),

    /// Network failure, timeout, throttling. Logged and ignored.
    #[error("transient delivery failure: {0}")]
    Transient(String),
}

impl DeliveryError {
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::PermanentlyUnreachable(_))
    }
}

/// Subscriber persistence errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("subscriber file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("subscriber file is malformed: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

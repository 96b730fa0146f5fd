//! Error types for search configuration.

use thiserror::Error;

/// Errors raised while reading the command line and environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Wrong number or shape of arguments.
    #[error("Usage error: {0}")]
    Usage(String),

    /// A value that should be a number is not one (or is out of its range).
    #[error("Invalid value for {name}: {value:?}")]
    InvalidNumber { name: String, value: String },

    #[error("Requested {requested} worker threads, the maximum is {max}")]
    TooManyThreads { requested: usize, max: usize },

    #[error("Tree order {order} exceeds the maximum of {max}")]
    OrderTooLarge { order: usize, max: usize },
}

impl ConfigError {
    /// Create a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Create an invalid number error.
    pub fn invalid_number(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidNumber {
            name: name.into(),
            value: value.into(),
        }
    }
}

//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration, directions provider failures, degenerate geometric input,
//! cache IO, and generic errors. Every variant surfaces to the caller of a run; nothing
//! is retried or recovered locally.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("directions provider failed with status {status}: {message}")]
    Provider { status: String, message: String },

    #[error("no usable route to {destination}")]
    NoRoute { destination: String },

    #[error("malformed directions response: {0}")]
    MalformedResponse(String),

    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    #[error("cache entry '{}' unavailable: {source}", path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a [`Error::Provider`] from a status tag and message.
    pub fn provider(status: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Provider {
            status: status.into(),
            message: message.into(),
        }
    }

    /// True for failures that came from the directions collaborator rather than local input.
    pub fn is_query_failure(&self) -> bool {
        matches!(
            self,
            Error::Provider { .. } | Error::NoRoute { .. } | Error::MalformedResponse(_)
        )
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

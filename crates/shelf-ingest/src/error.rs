//! Error types for the ingestion pipeline
//!
//! Each external call has its own error enum so the orchestrator can log a
//! distinguishing tag and map every failure kind to its own exit code.

use crate::config::ConfigError;
use thiserror::Error;

/// Failures talking to the listing API
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("connection failed: {message}")]
    Connection { message: String },

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {message}")]
    Unknown { message: String },
}

impl FetchError {
    pub fn tag(&self) -> &'static str {
        match self {
            FetchError::Http { .. } => "HTTP ERROR",
            FetchError::Connection { .. } => "CONNECTION ERROR",
            FetchError::Timeout => "TIMEOUT ERROR",
            FetchError::Unknown { .. } => "UNKNOWN ERROR",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_connect() {
            FetchError::Connection {
                message: err.to_string(),
            }
        } else {
            FetchError::Unknown {
                message: err.to_string(),
            }
        }
    }
}

/// Failures turning a listing document into records
#[derive(Error, Debug, PartialEq)]
pub enum NormalizeError {
    #[error("best_sellers[{index}] is not a JSON object")]
    NotAnObject { index: usize },

    #[error("best_sellers[{index}].product_star_rating is not a number: {value}")]
    InvalidRating { index: usize, value: String },

    #[error("best_sellers[{index}].product_num_ratings is not an integer: {value}")]
    InvalidRatingCount { index: usize, value: String },
}

/// Failures in the persistence layer
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to create table: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("failed to upsert products: {0}")]
    Write(#[source] sqlx::Error),
}

impl StorageError {
    pub fn tag(&self) -> &'static str {
        match self {
            StorageError::Connect(_) => "DATABASE CONNECTION ERROR",
            StorageError::Schema(_) => "CREATING TABLE ERROR",
            StorageError::Write(_) => "WRITE ERROR",
        }
    }
}

/// Terminal pipeline failure
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("unexpected listing payload: {0}")]
    Shape(String),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PipelineError {
    /// Log prefix naming the failing step
    pub fn tag(&self) -> &'static str {
        match self {
            PipelineError::Config(_) => "CONFIG ERROR",
            PipelineError::Fetch(e) => e.tag(),
            PipelineError::Shape(_) => "SHAPE ERROR",
            PipelineError::Normalize(_) => "NORMALIZE ERROR",
            PipelineError::Storage(e) => e.tag(),
        }
    }

    /// Process exit code for this failure kind
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => 2,
            PipelineError::Fetch(FetchError::Http { .. }) => 10,
            PipelineError::Fetch(FetchError::Connection { .. }) => 11,
            PipelineError::Fetch(FetchError::Timeout) => 12,
            PipelineError::Fetch(FetchError::Unknown { .. }) => 13,
            PipelineError::Shape(_) => 20,
            PipelineError::Normalize(_) => 21,
            PipelineError::Storage(StorageError::Connect(_)) => 30,
            PipelineError::Storage(StorageError::Schema(_)) => 31,
            PipelineError::Storage(StorageError::Write(_)) => 32,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = vec![
            PipelineError::Config(ConfigError::Missing("RAPIDAPI_KEY")),
            FetchError::Http { status: 500, message: String::new() }.into(),
            FetchError::Connection { message: String::new() }.into(),
            FetchError::Timeout.into(),
            FetchError::Unknown { message: String::new() }.into(),
            PipelineError::Shape("missing data".to_string()),
            NormalizeError::NotAnObject { index: 0 }.into(),
            StorageError::Connect(sqlx::Error::PoolClosed).into(),
            StorageError::Schema(sqlx::Error::PoolClosed).into(),
            StorageError::Write(sqlx::Error::PoolClosed).into(),
        ];

        let codes: HashSet<i32> = errors.iter().map(PipelineError::exit_code).collect();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&0));
    }

    #[test]
    fn test_tag_names_the_inner_failure() {
        let err = PipelineError::from(FetchError::Timeout);
        assert_eq!(err.tag(), "TIMEOUT ERROR");

        let err = PipelineError::from(StorageError::Schema(sqlx::Error::PoolClosed));
        assert_eq!(err.tag(), "CREATING TABLE ERROR");

        let err = PipelineError::from(ConfigError::Missing("DATABASE_HOST"));
        assert_eq!(err.tag(), "CONFIG ERROR");
        assert_eq!(
            err.to_string(),
            "Required environment variable DATABASE_HOST is missing or empty"
        );
    }
}

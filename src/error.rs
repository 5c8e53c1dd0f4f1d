//! Error types for fetching and batch coordination.

use thiserror::Error;

/// Errors a single remote lookup can run into.
///
/// These never escape [`SingleResourceFetcher::fetch`](crate::fetcher::SingleResourceFetcher::fetch):
/// the fetcher folds both variants into [`Outcome::Absent`](crate::outcome::Outcome::Absent).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// The remote call could not complete (connectivity, non-success status).
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// The response arrived but could not be interpreted as a resource.
    #[error("Decode failure: {0}")]
    DecodeFailure(String),
}

/// Errors surfaced by [`BatchFetchCoordinator`](crate::coordinator::BatchFetchCoordinator).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BatchError {
    /// Fail-fast only: the first lookup observed to fail aborted the batch.
    #[error("Batch aborted by key {key}: {cause}")]
    BatchAborted { key: String, cause: String },
}

/// Errors raised while loading or validating [`FetchConfig`](crate::config::FetchConfig).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

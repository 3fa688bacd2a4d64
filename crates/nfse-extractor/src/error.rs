//! Error types for the Extractor

use thiserror::Error;

/// Errors that abort a whole batch run
///
/// Problems with individual files are never reported through this type; they
/// are collected as [`BatchIssue`](crate::BatchIssue)s on the outcome.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Invalid classification rule or extractor settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A run is already processing
    #[error("A batch is already being processed")]
    Busy,

    /// Category store rejected the results
    #[error("Store error: {0}")]
    Store(String),

    /// Internal lock poisoned
    #[error("Lock error: {0}")]
    Lock(String),

    /// Worker pool failure
    #[error("Worker error: {0}")]
    Worker(String),
}

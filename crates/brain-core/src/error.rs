//! Error types for brain operations.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while asking a model backend for a reply.
///
/// None of these reach the chat transport verbatim; the orchestrator maps
/// every variant to a canned fallback phrase.
#[derive(Debug, Error)]
pub enum BrainError {
    /// Missing or invalid configuration (the only startup-fatal variant).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Connection refused, DNS failure, or another transport problem.
    #[error("network error: {0}")]
    Network(String),

    /// The backend did not answer within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The backend answered with a non-success status or an unparseable body.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// The backend answered, but the expected text field was missing or blank.
    #[error("backend returned an empty response")]
    EmptyResponse,

    /// The backend is overloaded or still loading a model (HTTP 503/429).
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

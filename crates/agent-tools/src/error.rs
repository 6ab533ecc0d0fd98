//! Error types for tool operations.

use thiserror::Error;

/// Errors that can occur while talking to an external service.
///
/// These never leave the crate through the collaborator traits; providers
/// log them and degrade to an empty result.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool is missing configuration (e.g. an API key).
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The service answered with something unusable.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

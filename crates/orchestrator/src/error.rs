//! Error types for orchestrator operations.

use brain_core::BrainError;
use thiserror::Error;

/// Errors that can occur during orchestration.
///
/// Backend, search, and media failures never surface here; they degrade
/// into fallback text or a missing augmentation.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Message was intentionally skipped.
    #[error("message skipped: {0}")]
    Skipped(String),

    /// Startup configuration is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Brain construction failed.
    #[error("brain error: {0}")]
    Brain(#[from] BrainError),

    /// Message sending failed.
    #[error("send failed: {0}")]
    SendFailed(String),
}

impl OrchestratorError {
    /// Whether the message was skipped on purpose rather than failing.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

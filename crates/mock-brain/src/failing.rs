//! Failing brain implementation - behaves like an unreachable backend.

use brain_core::{async_trait, Brain, BrainError, PromptRequest};

/// A brain whose every call fails.
#[derive(Debug, Clone)]
pub struct FailingBrain {
    reason: String,
}

impl FailingBrain {
    /// Create a brain failing with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for FailingBrain {
    fn default() -> Self {
        Self::new("connection refused")
    }
}

#[async_trait]
impl Brain for FailingBrain {
    async fn generate(&self, _request: &PromptRequest) -> Result<String, BrainError> {
        Err(BrainError::Network(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "FailingBrain"
    }

    async fn is_ready(&self) -> bool {
        false
    }
}

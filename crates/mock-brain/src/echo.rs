//! Echo brain implementation - echoes the current turn back.

use brain_core::{async_trait, Brain, BrainError, PromptRequest};

/// A simple brain that echoes the current turn's text.
///
/// Useful for testing the message flow without any model.
#[derive(Debug, Clone, Default)]
pub struct EchoBrain {
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
}

impl EchoBrain {
    /// Create a new EchoBrain with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EchoBrain with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_brain::EchoBrain;
    ///
    /// let brain = EchoBrain::with_prefix("Echo: ");
    /// // Will respond with "Echo: <current turn>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

#[async_trait]
impl Brain for EchoBrain {
    async fn generate(&self, request: &PromptRequest) -> Result<String, BrainError> {
        Ok(match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, request.text),
            None => request.text.clone(),
        })
    }

    fn name(&self) -> &str {
        "EchoBrain"
    }
}

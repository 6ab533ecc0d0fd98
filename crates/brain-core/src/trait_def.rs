//! The Brain trait definition.

use async_trait::async_trait;

use crate::error::BrainError;
use crate::prompt::PromptRequest;

/// A trait for turning an assembled prompt into model text.
///
/// Implementations range from scripted test doubles to HTTP backends.
/// This trait is object-safe and can be used with `Arc<dyn Brain>`.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Generate a reply for the given request.
    ///
    /// Makes a single attempt. Any failure (transport, timeout, malformed or
    /// empty body) comes back as an `Err`; callers decide what the user sees.
    async fn generate(&self, request: &PromptRequest) -> Result<String, BrainError>;

    /// Get a human-readable name for this brain implementation.
    fn name(&self) -> &str;

    /// Check if the brain is ready to process messages.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }
}

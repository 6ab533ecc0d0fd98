//! Mock brain implementations for the Banter message pipeline.
//!
//! This crate provides mock implementations of the `Brain` trait for testing:
//! - `EchoBrain` - Echoes the current turn back
//! - `ScriptedBrain` - Replays canned replies and records every request
//! - `DelayedBrain` - Wraps another brain with artificial delay
//! - `FailingBrain` - Always fails, like an unreachable backend
//!
//! For real model backends, use the `llm-backend` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{Brain, EchoBrain, PromptRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::BrainError> {
//!     let brain = EchoBrain::new();
//!
//!     let request = PromptRequest::new("Be brief.", "alice", "Hello!");
//!
//!     let reply = brain.generate(&request).await?;
//!     println!("Reply: {}", reply);
//!     Ok(())
//! }
//! ```

// Mock implementations
mod delayed;
mod echo;
mod failing;
mod scripted;

// Re-export brain-core types for convenience
pub use brain_core::{async_trait, Brain, BrainError, PromptRequest};

// Export mock implementations
pub use delayed::DelayedBrain;
pub use echo::EchoBrain;
pub use failing::FailingBrain;
pub use scripted::ScriptedBrain;

//! Core traits and types shared by every Banter crate.
//!
//! This crate provides the shared interface between the message pipeline
//! and the pieces it coordinates. It defines:
//!
//! - [`Brain`] - The trait every model backend implements
//! - [`PromptRequest`] - Backend-agnostic input assembled per turn
//! - [`ContextStore`] - Bounded per-channel conversational memory
//! - [`SearchProvider`] / [`MediaResolver`] - External collaborators
//! - [`BrainError`] - Error types for backend operations
//!
//! # Example
//!
//! ```rust
//! use brain_core::{Brain, BrainError, PromptRequest};
//! use async_trait::async_trait;
//!
//! struct MyBrain;
//!
//! #[async_trait]
//! impl Brain for MyBrain {
//!     async fn generate(&self, request: &PromptRequest) -> Result<String, BrainError> {
//!         Ok(format!("You said: {}", request.text))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "MyBrain"
//!     }
//! }
//! ```

mod error;
mod history;
mod message;
mod prompt;
mod tools;
mod trait_def;

pub use error::BrainError;
pub use history::{ContextStore, ConversationTurn, Origin, DEFAULT_MAX_CHANNELS, DEFAULT_MAX_TURNS};
pub use message::InboundMessage;
pub use prompt::{hash_prompt, PromptRequest, SearchContext};
pub use tools::{MediaResolver, NoMedia, NoSearch, SearchProvider, SearchResult};
pub use trait_def::Brain;

// Re-export async_trait for convenience
pub use async_trait::async_trait;

//! Model backends for the Banter chat bot.
//!
//! This crate turns a backend-agnostic [`PromptRequest`](brain_core::PromptRequest)
//! into model text. It knows two wire shapes:
//!
//! - **Completion** - a single Llama 3 formatted prompt posted to an
//!   Ollama-style `/api/generate` endpoint
//! - **Chat** - role-tagged messages posted to an OpenAI-compatible
//!   `/chat/completions` endpoint
//!
//! [`BackendRouter`] picks the shape from a model registry, builds the
//! payload with [`PromptAssembler`], and makes exactly one bounded request.
//!
//! # Usage
//!
//! ```rust,no_run
//! use llm_backend::{BackendRouter, Brain, PromptRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = BackendRouter::from_env()?;
//!     let request = PromptRequest::new("You are friendly.", "alice", "hi!");
//!     let reply = router.generate(&request).await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

mod api_types;
mod assembler;
mod config;
mod router;

pub use api_types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, GenerateOptions, GenerateRequest,
    GenerateResponse,
};
pub use assembler::{
    render_current_turn, render_history_line, render_search_results, Payload, PromptAssembler,
    GROUNDING_INSTRUCTION, MIN_TEMPERATURE, SEARCH_TEMPERATURE_FACTOR,
};
pub use config::{
    parse_backends, BackendConfig, BackendEntry, BackendKind, GenerationConfig, LlmConfig,
    LlmConfigBuilder, DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
    LLAMA3_STOP_SEQUENCES,
};
pub use router::{health_url, BackendRouter, HEALTH_CHECK_TIMEOUT};

// Re-export brain-core types for convenience
pub use brain_core::{async_trait, Brain, BrainError, PromptRequest};

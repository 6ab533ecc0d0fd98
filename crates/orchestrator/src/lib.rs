//! Conversation orchestration for the Banter chat bot.
//!
//! This crate provides the [`Orchestrator`] type, which turns one incoming
//! chat message into a reply: it records the turn, decides how much history
//! and whether web search is needed, asks the brain for text, and splits any
//! media directive out of the answer.
//!
//! # Architecture
//!
//! ```text
//! Chat message (from a transport)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  1. Record the turn in the channel's ContextStore           │
//! │         ↓                                                   │
//! │  2. Skip unless mentioned or prefixed; run commands         │
//! │         ↓                                                   │
//! │  3. Classify: simple turn? needs search?                    │
//! │         ↓                                                   │
//! │  4. Optional web search (SearchProvider)                    │
//! │         ↓                                                   │
//! │  5. Brain generates under a bounded timeout                 │
//! │     (fallback phrase on any failure)                        │
//! │         ↓                                                   │
//! │  6. Extract and strip the [GIF: ...] directive              │
//! │         ↓                                                   │
//! │  7. Record the bot turn, send text, then resolved media     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use orchestrator::{InboundMessage, LoggingSender, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = Orchestrator::from_env(LoggingSender)?;
//!     let _sweeper = orchestrator.spawn_sweeper();
//!
//!     let message = InboundMessage::new("general", "alice", "!what's new in rust?");
//!     let reply = orchestrator.process(message).await?;
//!
//!     println!("Reply: {}", reply.text);
//!     Ok(())
//! }
//! ```

pub mod classifier;
mod commands;
mod config;
pub mod directive;
mod error;
mod orchestrator;
mod sender;
mod sweep;

pub use classifier::{is_simple_turn, should_search, Classification};
pub use commands::{Command, HELP_TEXT};
pub use config::{
    OrchestratorConfig, OrchestratorConfigBuilder, DEFAULT_BOT_NAME, DEFAULT_PREFIX,
    DEFAULT_PROMPT_FILE, DEFAULT_SYSTEM_PROMPT, SIMPLE_HISTORY_TURNS,
};
pub use directive::{extract_query, strip_directives, Directive, DirectiveForm};
pub use error::OrchestratorError;
pub use orchestrator::{fallback_phrase, Orchestrator, Reply, EMPTY_PROMPT, FALLBACK_PHRASES};
pub use sender::{LoggingSender, MessageSender, NoOpSender};
pub use sweep::spawn_sweeper;

// Re-export commonly used types from dependencies
pub use brain_core::{async_trait, ContextStore, InboundMessage};

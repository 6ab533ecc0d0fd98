//! External collaborators for the Banter chat bot.
//!
//! The orchestrator talks to these only through the `brain-core`
//! collaborator traits, so every provider here is infallible at the trait
//! boundary: errors are logged and turn into an empty result.
//!
//! # Built-in Providers
//!
//! - [`DuckDuckGoSearch`] - Live web search by scraping DuckDuckGo's HTML endpoint.
//! - [`TenorGifs`] - Resolves a GIF query to a media URL via the Tenor v2 API.
//!
//! # Example
//!
//! ```rust,no_run
//! use agent_tools::{DuckDuckGoSearch, SearchProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let search = DuckDuckGoSearch::new()?;
//!     for result in search.search("rust async runtime", 3).await {
//!         println!("{} - {}", result.title, result.link);
//!     }
//!     Ok(())
//! }
//! ```

mod error;
pub mod tools;

pub use error::ToolError;
pub use tools::{decode_entities, parse_results, strip_tags, DuckDuckGoSearch, TenorGifs};

// Re-export the collaborator traits for convenience
pub use brain_core::{MediaResolver, SearchProvider, SearchResult};
pub use async_trait::async_trait;

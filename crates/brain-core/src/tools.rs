//! External collaborators consulted while answering a turn.
//!
//! The pipeline never fails because of these: a provider that cannot reach
//! its service returns an empty result and the turn proceeds without that
//! augmentation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One web search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title.
    pub title: String,
    /// Page URL.
    pub link: String,
    /// Short text excerpt.
    pub snippet: String,
}

impl SearchResult {
    /// Create a search result.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }
}

/// Live web search.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Return up to `max_results` hits in relevance order.
    ///
    /// Must return an empty vector, not fail, when nothing is found or the
    /// provider is unreachable.
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult>;

    /// Get a human-readable name for this provider.
    fn name(&self) -> &str;
}

/// Resolves a media directive query into a postable URL.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Return a media URL, or `None` when unresolvable or unconfigured.
    async fn resolve(&self, query: &str) -> Option<String>;
}

/// A search provider that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSearch;

#[async_trait]
impl SearchProvider for NoSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> Vec<SearchResult> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "NoSearch"
    }
}

/// A media resolver that never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMedia;

#[async_trait]
impl MediaResolver for NoMedia {
    async fn resolve(&self, _query: &str) -> Option<String> {
        None
    }
}

//! Backend-agnostic prompt input and prompt fingerprinting.

use sha2::{Digest, Sha256};

use crate::history::ConversationTurn;
use crate::tools::SearchResult;

/// Compute a stable SHA-256 fingerprint for a prompt string.
pub fn hash_prompt(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

/// Search results gathered for the current turn, in relevance order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchContext {
    /// The query that produced the results.
    pub query: String,
    /// Results as returned by the provider. Never empty.
    pub results: Vec<SearchResult>,
}

/// Everything a backend needs to answer one turn.
///
/// Optional sections are `None`/empty when their source data is absent;
/// backends render nothing for them.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    /// System instructions.
    pub system_prompt: String,
    /// Search results, present only when a search produced hits.
    pub search: Option<SearchContext>,
    /// Channel summary, if one is set.
    pub summary: Option<String>,
    /// Prior turns, oldest first, excluding the current one.
    pub history: Vec<ConversationTurn>,
    /// Author of the current turn.
    pub author: String,
    /// Text of the current turn (prefix and mention already stripped).
    pub text: String,
    /// Whether the current turn replies to another message.
    pub is_reply: bool,
}

impl PromptRequest {
    /// Create a request with just instructions and the current turn.
    pub fn new(
        system_prompt: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            search: None,
            summary: None,
            history: Vec::new(),
            author: author.into(),
            text: text.into(),
            is_reply: false,
        }
    }

    /// Attach prior turns.
    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    /// Attach a channel summary. Blank summaries are dropped.
    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary.filter(|s| !s.trim().is_empty());
        self
    }

    /// Attach search results. An empty result list leaves the section absent.
    pub fn with_search(mut self, query: impl Into<String>, results: Vec<SearchResult>) -> Self {
        self.search = if results.is_empty() {
            None
        } else {
            Some(SearchContext {
                query: query.into(),
                results,
            })
        };
        self
    }

    /// Mark the current turn as a reply.
    pub fn as_reply(mut self, is_reply: bool) -> Self {
        self.is_reply = is_reply;
        self
    }

    /// Whether search results are attached.
    pub fn has_search_results(&self) -> bool {
        self.search.is_some()
    }
}

//! Per-channel conversational memory.
//!
//! This module provides bounded per-channel turn tracking with a strict FIFO
//! sliding window, an optional free-text summary per channel, idle sweeping,
//! and LRU eviction of whole channels to prevent memory exhaustion.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

/// Default number of turns kept per channel.
pub const DEFAULT_MAX_TURNS: usize = 10;

/// Default maximum number of channels to track before LRU eviction.
pub const DEFAULT_MAX_CHANNELS: usize = 10_000;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// A human participant in the channel.
    User,
    /// The bot itself.
    Bot,
}

impl Origin {
    /// Chat-completion role name ("user" or "assistant").
    pub fn role(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "assistant",
        }
    }

    /// Label used when rendering history as plain text.
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Bot => "Assistant",
        }
    }
}

/// One message recorded into a channel's history. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    id: Uuid,
    author: String,
    content: String,
    origin: Origin,
    reply_to: Option<String>,
    timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    fn new(author: &str, content: &str, origin: Origin, reply_to: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: author.to_string(),
            content: content.to_string(),
            origin,
            reply_to: reply_to.map(str::to_string),
            timestamp: Utc::now(),
        }
    }

    /// Unique turn identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Author name or identifier.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Message content (directive-free for bot turns).
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether a user or the bot wrote this turn.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Whether the bot wrote this turn.
    pub fn is_bot(&self) -> bool {
        self.origin == Origin::Bot
    }

    /// Identifier of the message this turn replies to, if any.
    ///
    /// Lookup-only; the target may already have been evicted.
    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    /// When the turn was recorded.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// State for one channel: the bounded turn window plus an optional summary.
///
/// Both live in one entry so they are created and evicted together.
#[derive(Debug, Clone)]
struct ChannelState {
    turns: VecDeque<ConversationTurn>,
    summary: Option<String>,
    last_activity: Instant,
}

impl ChannelState {
    fn new() -> Self {
        Self {
            turns: VecDeque::new(),
            summary: None,
            last_activity: Instant::now(),
        }
    }
}

/// Bounded per-channel conversational memory.
///
/// Every channel keeps at most `max_turns` turns; appending past the cap
/// evicts the oldest turn regardless of who wrote it. Channels idle for
/// longer than a threshold are dropped wholesale by [`ContextStore::sweep_idle`].
///
/// All mutations (append, summary, sweep, clear) go through the same lock,
/// so a sweep can never delete a channel whose activity was refreshed by an
/// append it raced with.
///
/// # Example
///
/// ```rust
/// use brain_core::{ContextStore, Origin};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let store = ContextStore::new(2);
///
///     store.append("general", "alice", "one", Origin::User, None).await;
///     store.append("general", "bob", "two", Origin::User, None).await;
///     store.append("general", "alice", "three", Origin::User, None).await;
///
///     let turns = store.history("general").await;
///     assert_eq!(turns.len(), 2);
///     assert_eq!(turns[0].content(), "two");
/// }
/// ```
#[derive(Debug)]
pub struct ContextStore {
    /// Channel states keyed by channel ID, ordered by last append
    /// (least recently active first).
    channels: RwLock<IndexMap<String, ChannelState>>,
    /// Maximum number of turns kept per channel.
    max_turns: usize,
    /// Maximum number of channels to track before LRU eviction.
    max_channels: usize,
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

impl ContextStore {
    /// Create a store keeping `max_turns` turns per channel.
    ///
    /// Uses the default max channels limit (10,000).
    pub fn new(max_turns: usize) -> Self {
        Self::with_limits(max_turns, DEFAULT_MAX_CHANNELS)
    }

    /// Create a store with custom limits.
    ///
    /// # Arguments
    ///
    /// * `max_turns` - Maximum number of turns per channel
    /// * `max_channels` - Maximum number of channels to track before LRU eviction
    pub fn with_limits(max_turns: usize, max_channels: usize) -> Self {
        Self {
            channels: RwLock::new(IndexMap::new()),
            max_turns,
            max_channels,
        }
    }

    /// Configured per-channel turn cap.
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Record a turn, creating the channel on first use.
    ///
    /// Returns a copy of the stored turn so callers can refer to its ID.
    pub async fn append(
        &self,
        channel_id: &str,
        author: &str,
        content: &str,
        origin: Origin,
        reply_to: Option<&str>,
    ) -> ConversationTurn {
        let turn = ConversationTurn::new(author, content, origin, reply_to);
        let mut channels = self.channels.write().await;

        // Remove and re-insert to move to end (mark as recently active)
        let mut state = channels
            .shift_remove(channel_id)
            .unwrap_or_else(ChannelState::new);

        state.turns.push_back(turn.clone());
        while state.turns.len() > self.max_turns {
            state.turns.pop_front();
        }
        state.last_activity = Instant::now();

        channels.insert(channel_id.to_string(), state);
        self.evict_excess(&mut channels);

        turn
    }

    /// Snapshot of a channel's turns, oldest first.
    ///
    /// Returns an empty vector for unknown channels.
    pub async fn history(&self, channel_id: &str) -> Vec<ConversationTurn> {
        let channels = self.channels.read().await;
        channels
            .get(channel_id)
            .map(|state| state.turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Set the free-text summary for a channel.
    ///
    /// Creates the channel if it does not exist yet, subject to the channel
    /// cap; does not count as activity for an existing channel.
    pub async fn set_summary(&self, channel_id: &str, summary: impl Into<String>) {
        let mut channels = self.channels.write().await;
        channels
            .entry(channel_id.to_string())
            .or_insert_with(ChannelState::new)
            .summary = Some(summary.into());
        self.evict_excess(&mut channels);
    }

    /// Get the summary for a channel, if any.
    pub async fn summary(&self, channel_id: &str) -> Option<String> {
        let channels = self.channels.read().await;
        channels
            .get(channel_id)
            .and_then(|state| state.summary.clone())
    }

    /// Remove every channel whose last append is older than `max_age`.
    ///
    /// Returns the number of channels removed.
    pub async fn sweep_idle(&self, max_age: Duration) -> usize {
        let mut channels = self.channels.write().await;
        let now = Instant::now();
        let before = channels.len();
        channels.retain(|_, state| now.saturating_duration_since(state.last_activity) <= max_age);
        before - channels.len()
    }

    /// Remove a channel's turns and summary.
    pub async fn clear(&self, channel_id: &str) {
        let mut channels = self.channels.write().await;
        channels.shift_remove(channel_id);
    }

    /// LRU eviction: remove the least recently active channels over the cap.
    fn evict_excess(&self, channels: &mut IndexMap<String, ChannelState>) {
        while channels.len() > self.max_channels {
            channels.shift_remove_index(0);
        }
    }

    /// Get the current number of tracked channels.
    pub async fn channel_count(&self) -> usize {
        let channels = self.channels.read().await;
        channels.len()
    }
}

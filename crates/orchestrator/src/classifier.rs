//! Request classification heuristics.
//!
//! Two independent predicates over the user's text, both best-effort:
//! whether a turn is simple enough to answer with a short history window,
//! and whether it would benefit from a live web search.

use regex::Regex;
use std::sync::LazyLock;

/// Turns with at most this many tokens count as simple.
pub const SIMPLE_TURN_MAX_TOKENS: usize = 3;

/// Short greetings and reactions that need no context.
const SIMPLE_PHRASES: &[&str] = &[
    "hi", "hello", "hey", "heya", "yo", "sup", "hiya", "howdy", "gm", "gn", "bye", "cya",
    "thanks", "thank you", "thx", "ty", "ok", "okay", "k", "cool", "nice", "lol", "lmao",
    "haha", "hahaha", "wow", "omg", "yes", "no", "yep", "nope", "good morning",
    "good night", "what's up", "whats up",
];

/// Words that signal the user mostly wants a reaction or a GIF.
const MEDIA_KEYWORDS: &[&str] = &["gif", "meme", "sticker", "emoji", "reaction"];

/// Phrases that signal an information need.
const SEARCH_PHRASES: &[&str] = &[
    "search for",
    "look up",
    "find information",
    "what is",
    "who is",
    "when did",
    "where is",
    "how to",
    "tell me about",
    "explain",
    "current",
    "latest",
    "today",
    "recent",
    "new",
    "news",
    "top",
    "information on",
    "details about",
    "price of",
    "weather in",
    "definition of",
    "happening",
    "update",
];

static SEARCH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = SEARCH_PHRASES
        .iter()
        .map(|phrase| regex::escape(phrase))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{})\b", alternation)).expect("Invalid search phrase regex")
});

static QUESTION_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:what|who|when|where|how|why)\b").expect("Invalid question regex")
});

static MEDIA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:{})s?\b", MEDIA_KEYWORDS.join("|"))).expect("Invalid media regex")
});

/// Lower-case and trim.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Whether a turn can be answered with only the most recent history.
pub fn is_simple_turn(text: &str) -> bool {
    let text = normalize(text);
    let bare = text.strip_suffix('!').unwrap_or(&text).trim_end();

    SIMPLE_PHRASES.contains(&bare)
        || MEDIA_PATTERN.is_match(&text)
        || text.split_whitespace().count() <= SIMPLE_TURN_MAX_TOKENS
}

/// Whether a turn should be grounded with web search results.
pub fn should_search(text: &str) -> bool {
    let text = normalize(text);
    SEARCH_PATTERN.is_match(&text) || text.contains('?') || QUESTION_START.is_match(&text)
}

/// Both classifications for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// See [`is_simple_turn`].
    pub simple: bool,
    /// See [`should_search`].
    pub search: bool,
}

impl Classification {
    /// Classify a turn.
    pub fn of(text: &str) -> Self {
        Self {
            simple: is_simple_turn(text),
            search: should_search(text),
        }
    }
}

//! Text helpers for scraped result pages.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Wide enough that html2text never wraps a title, snippet, or link.
const RENDER_WIDTH: usize = 10_000;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("Invalid tag regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Remove markup, decode entities, and collapse whitespace.
///
/// Tags are dropped before rendering so highlight markup such as `<b>`
/// leaves no decoration behind.
pub fn strip_tags(fragment: &str) -> String {
    let text = TAG.replace_all(fragment, "");
    let text = decode_entities(&text);
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Decode HTML character references by rendering the text with html2text.
///
/// Unknown references are left as written. If rendering fails the input is
/// returned unchanged.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    match html2text::from_read(text.as_bytes(), RENDER_WIDTH) {
        Ok(rendered) => rendered.trim_end_matches('\n').to_string(),
        Err(e) => {
            debug!("HTML rendering failed, keeping raw text: {}", e);
            text.to_string()
        }
    }
}

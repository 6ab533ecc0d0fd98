//! Media directive extraction.
//!
//! Models are asked to suggest GIFs as `[GIF: <query>]`. They do not always
//! comply, so two malformed variants are recognised as well:
//!
//! - a bare short bracketed phrase, `[facepalm]`
//! - a bracket-less prefix, `GIF: facepalm`, ending at sentence punctuation
//!   or a line break
//!
//! Matchers are tried in a fixed priority order and the first form that
//! produces a query wins, regardless of where in the text it appears.

use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Bracketed fragments shorter than this may be directive remnants.
pub const MAX_BARE_DIRECTIVE_CHARS: usize = 50;

/// Which shape a directive was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveForm {
    /// `[GIF: query]`
    Canonical,
    /// `[query]`
    BracketOnly,
    /// `GIF: query`
    LoosePrefix,
}

impl DirectiveForm {
    fn is_malformed(self) -> bool {
        self != Self::Canonical
    }
}

/// A media directive found in model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Shape it was written in.
    pub form: DirectiveForm,
    /// Trimmed query text.
    pub query: String,
}

struct Matcher {
    form: DirectiveForm,
    pattern: Regex,
}

impl Matcher {
    fn new(form: DirectiveForm, pattern: &str) -> Self {
        Self {
            form,
            pattern: Regex::new(pattern).expect("Invalid directive regex"),
        }
    }

    fn find(&self, text: &str) -> Option<Directive> {
        self.pattern.captures_iter(text).find_map(|caps| {
            let whole = caps.get(0)?;
            let inner = caps.get(1)?.as_str();

            let accepted = match self.form {
                DirectiveForm::BracketOnly => looks_like_bare_directive(inner, &text[whole.end()..]),
                DirectiveForm::Canonical | DirectiveForm::LoosePrefix => true,
            };

            let query = inner.trim();
            (accepted && !query.is_empty()).then(|| Directive {
                form: self.form,
                query: query.to_string(),
            })
        })
    }
}

/// Matchers in priority order.
static MATCHERS: LazyLock<[Matcher; 3]> = LazyLock::new(|| {
    [
        Matcher::new(DirectiveForm::Canonical, r"(?i)\[GIF:\s*([^\]]+)\]"),
        Matcher::new(DirectiveForm::BracketOnly, r"\[([^\[\]]+)\]"),
        Matcher::new(DirectiveForm::LoosePrefix, r"(?i)GIF:\s*([^\n.!?\[\]]+)"),
    ]
});

/// A whole tag, or one cut off before its `]` (truncated output) up to the line end.
static CANONICAL_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\[GIF:[^\]\n]*(?:\]|$)").expect("Invalid canonical tag regex")
});

static LOOSE_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)GIF:[^\n.!?\[\]]*").expect("Invalid loose fragment regex"));

static BRACKET_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]*)\]").expect("Invalid bracket regex"));

static INLINE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("Invalid space regex"));

static TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+\n").expect("Invalid trailing space regex"));

/// Whether bracketed text reads like a stray directive rather than prose.
///
/// Short, single line, no sentence punctuation, not a `GIF:` tag, and not
/// the label of a markdown link.
fn looks_like_bare_directive(inner: &str, after: &str) -> bool {
    let trimmed = inner.trim();
    !trimmed.is_empty()
        && trimmed.chars().count() < MAX_BARE_DIRECTIVE_CHARS
        && !inner.contains('\n')
        && !trimmed.contains(&['.', ',', '!', '?', ';'][..])
        && !trimmed.to_ascii_lowercase().starts_with("gif:")
        && !after.starts_with('(')
}

/// Find the highest-priority directive in `text`.
pub fn extract(text: &str) -> Option<Directive> {
    let directive = MATCHERS.iter().find_map(|matcher| matcher.find(text))?;

    if directive.form.is_malformed() {
        warn!(
            "Recovered malformed media directive ({:?}): {:?}",
            directive.form, directive.query
        );
    }

    Some(directive)
}

/// Query text of the highest-priority directive in `text`.
pub fn extract_query(text: &str) -> Option<String> {
    extract(text).map(|directive| directive.query)
}

/// Remove every directive and directive-like fragment from `text`.
///
/// Repeats until nothing changes, so the result is a fixed point:
/// `strip_directives(strip_directives(x)) == strip_directives(x)`.
pub fn strip_directives(text: &str) -> String {
    let mut current = strip_once(text);
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(text: &str) -> String {
    let text = CANONICAL_TAG.replace_all(text, "");
    let text = LOOSE_FRAGMENT.replace_all(&text, "");

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in BRACKET_FRAGMENT.captures_iter(&text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let remnant = inner.as_str().trim().is_empty()
            || looks_like_bare_directive(inner.as_str(), &text[whole.end()..]);
        if remnant {
            out.push_str(&text[last..whole.start()]);
            last = whole.end();
        }
    }
    out.push_str(&text[last..]);

    let out = INLINE_SPACE.replace_all(&out, " ");
    let out = TRAILING_SPACE.replace_all(&out, "\n");
    out.trim().to_string()
}

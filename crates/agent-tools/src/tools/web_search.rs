//! DuckDuckGo HTML web search.

use std::time::Duration;

use async_trait::async_trait;
use brain_core::{SearchProvider, SearchResult};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use url::Url;

use super::html::{decode_entities, strip_tags};
use crate::error::ToolError;

/// DuckDuckGo's no-JavaScript search endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

static TITLE_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a\s([^>]*class="[^"]*\bresult__a\b[^"]*"[^>]*)>(.*?)</a>"#)
        .expect("Invalid title regex")
});

static SNIPPET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="[^"]*\bresult__snippet\b[^"]*"[^>]*>(.*?)</(?:a|div|td|span)>"#)
        .expect("Invalid snippet regex")
});

static HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]*)""#).expect("Invalid href regex"));

/// Web search backed by DuckDuckGo's HTML results page.
///
/// Network and parse failures are logged and reported as "no results".
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoSearch {
    /// Create a provider against the public endpoint.
    pub fn new() -> Result<Self, ToolError> {
        Self::with_base_url(DEFAULT_SEARCH_URL)
    }

    /// Create a provider against a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(SEARCH_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn fetch(&self, query: &str) -> Result<String, ToolError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("kl", "us-en")])
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "search returned HTTP {}",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        if query.trim().is_empty() || max_results == 0 {
            return Vec::new();
        }

        info!("Searching the web for: {:?}", query);

        let body = match self.fetch(query).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Web search failed: {}", e);
                return Vec::new();
            }
        };

        let results = parse_results(&body, max_results);
        info!("Web search found {} results", results.len());
        for result in &results {
            debug!("  {} <{}>", result.title, result.link);
        }
        results
    }

    fn name(&self) -> &str {
        "DuckDuckGo"
    }
}

/// Extract up to `max_results` complete results from a results page.
///
/// Results missing a title, link, or snippet are skipped, as are sponsored
/// links. Page order is preserved.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let anchors: Vec<_> = TITLE_ANCHOR.captures_iter(html).collect();
    let mut results = Vec::new();

    for (i, anchor) in anchors.iter().enumerate() {
        if results.len() >= max_results {
            break;
        }

        let (Some(whole), Some(attrs), Some(inner)) = (anchor.get(0), anchor.get(1), anchor.get(2))
        else {
            continue;
        };

        // The snippet belongs to this result if it appears before the next title.
        let block_end = anchors
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(html.len());
        let block = &html[whole.end()..block_end];

        let title = strip_tags(inner.as_str());
        let link = HREF
            .captures(attrs.as_str())
            .map(|c| unwrap_redirect(&decode_entities(&c[1])))
            .unwrap_or_default();
        let snippet = SNIPPET
            .captures(block)
            .map(|c| strip_tags(&c[1]))
            .unwrap_or_default();

        if title.is_empty() || link.is_empty() || snippet.is_empty() || is_ad(&link) {
            continue;
        }

        results.push(SearchResult::new(title, link, snippet));
    }

    results
}

/// Turn a DuckDuckGo redirect (`//duckduckgo.com/l/?uddg=...`) into its target.
fn unwrap_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    let Ok(url) = Url::parse(&absolute) else {
        return absolute;
    };

    let is_redirect = url
        .host_str()
        .map(|host| host.ends_with("duckduckgo.com"))
        .unwrap_or(false)
        && url.path().starts_with("/l/");

    if is_redirect {
        if let Some((_, target)) = url.query_pairs().find(|(key, _)| key == "uddg") {
            return target.into_owned();
        }
    }

    absolute
}

fn is_ad(link: &str) -> bool {
    link.contains("duckduckgo.com/y.js")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<div class="result results_links results_links_deep web-result ">
  <div class="links_main links_deep result__body">
    <h2 class="result__title">
      <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FParis&amp;rut=abc">Paris - <b>Wikipedia</b></a>
    </h2>
    <a class="result__snippet" href="//duckduckgo.com/l/?uddg=x">Paris is the <b>capital</b> of France &amp; its largest city.</a>
  </div>
</div>
<div class="result results_links results_links_deep web-result ">
  <div class="links_main links_deep result__body">
    <h2 class="result__title">
      <a rel="nofollow" class="result__a" href="https://example.com/no-snippet">No snippet here</a>
    </h2>
  </div>
</div>
<div class="result results_links results_links_deep web-result ">
  <div class="links_main links_deep result__body">
    <h2 class="result__title">
      <a rel="nofollow" class="result__a" href="https://www.britannica.com/place/Paris">Paris | History &amp; Facts</a>
    </h2>
    <a class="result__snippet" href="https://www.britannica.com/place/Paris">Paris, city and capital of France.</a>
  </div>
</div>
"#;

    #[test]
    fn test_parse_results() {
        let results = parse_results(PAGE, 10);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Paris - Wikipedia");
        assert_eq!(results[0].link, "https://en.wikipedia.org/wiki/Paris");
        assert_eq!(results[0].snippet, "Paris is the capital of France & its largest city.");
        assert_eq!(results[1].title, "Paris | History & Facts");
        assert_eq!(results[1].link, "https://www.britannica.com/place/Paris");
    }

    #[test]
    fn test_parse_results_caps_count() {
        let results = parse_results(PAGE, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Paris - Wikipedia");
    }

    #[test]
    fn test_parse_results_empty_page() {
        assert!(parse_results("<html><body>No results.</body></html>", 3).is_empty());
    }

    #[test]
    fn test_unwrap_redirect() {
        assert_eq!(
            unwrap_redirect("//duckduckgo.com/l/?uddg=https%3A%2F%2Frust-lang.org%2F&rut=1"),
            "https://rust-lang.org/"
        );
        assert_eq!(unwrap_redirect("https://docs.rs/"), "https://docs.rs/");
    }

    #[test]
    fn test_named_entities_decoded() {
        let page = r##"<a class="result__a" href="https://cafe.example/menu">Caf&eacute; menu</a>
<a class="result__snippet" href="#">Prices in &euro; &ndash; &frac12; off</a>"##;
        let results = parse_results(page, 3);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Café menu");
        assert_eq!(results[0].snippet, "Prices in € – ½ off");
    }

    #[test]
    fn test_ads_skipped() {
        let page = r##"<a class="result__a" href="https://duckduckgo.com/y.js?ad_provider=x">Buy now</a>
<a class="result__snippet" href="#">Great deals.</a>"##;
        assert!(parse_results(page, 3).is_empty());
    }
}

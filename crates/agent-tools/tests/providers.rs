//! Providers against local one-shot HTTP servers.

use agent_tools::{DuckDuckGoSearch, MediaResolver, SearchProvider, TenorGifs};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

async fn serve_once(status: &'static str, content_type: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 2048];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            content_type,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        String::from_utf8_lossy(&buf).to_string()
    });

    (format!("http://{}", addr), handle)
}

const RESULTS_PAGE: &str = r##"<html><body>
<div class="result"><h2 class="result__title">
<a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Ftokio.rs%2F&amp;rut=1">Tokio - An asynchronous Rust runtime</a></h2>
<a class="result__snippet" href="#">Tokio is an <b>asynchronous</b> runtime.</a></div>
<div class="result"><h2 class="result__title">
<a rel="nofollow" class="result__a" href="https://docs.rs/tokio">tokio - Rust</a></h2>
<a class="result__snippet" href="#">API documentation.</a></div>
<div class="result"><h2 class="result__title">
<a rel="nofollow" class="result__a" href="https://github.com/tokio-rs/tokio">GitHub - tokio-rs/tokio</a></h2>
<a class="result__snippet" href="#">Source code.</a></div>
</body></html>"##;

#[tokio::test]
async fn test_duckduckgo_search() {
    let (base, server) = serve_once("200 OK", "text/html", RESULTS_PAGE).await;
    let search = DuckDuckGoSearch::with_base_url(format!("{}/html/", base)).unwrap();

    let results = search.search("tokio runtime", 2).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].link, "https://tokio.rs/");
    assert_eq!(results[0].snippet, "Tokio is an asynchronous runtime.");
    assert_eq!(results[1].title, "tokio - Rust");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("GET /html/?q=tokio+runtime&kl=us-en"));
}

#[tokio::test]
async fn test_duckduckgo_error_status_is_empty() {
    let (base, _server) = serve_once("503 Service Unavailable", "text/html", "busy").await;
    let search = DuckDuckGoSearch::with_base_url(base).unwrap();

    assert!(search.search("anything", 3).await.is_empty());
}

#[tokio::test]
async fn test_duckduckgo_unreachable_is_empty() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let search = DuckDuckGoSearch::with_base_url(format!("http://{}/html/", addr)).unwrap();
    assert!(search.search("anything", 3).await.is_empty());
}

#[tokio::test]
async fn test_tenor_resolve() {
    let (base, server) = serve_once(
        "200 OK",
        "application/json",
        r#"{"results":[{"media_formats":{"gif":{"url":"https://media.tenor.com/cat.gif"}}}]}"#,
    )
    .await;
    let gifs = TenorGifs::new(Some("test-key".to_string()))
        .unwrap()
        .with_base_url(format!("{}/v2/search", base));

    assert_eq!(
        gifs.resolve("cat falling").await.as_deref(),
        Some("https://media.tenor.com/cat.gif")
    );

    let raw = server.await.unwrap();
    let request_line = raw.lines().next().unwrap();
    assert!(request_line.contains("q=cat+falling"));
    assert!(request_line.contains("key=test-key"));
    assert!(request_line.contains("media_filter=gif"));
    assert!(request_line.contains("contentfilter=medium"));
    assert!(request_line.contains("limit=1"));
}

#[tokio::test]
async fn test_tenor_malformed_body_is_none() {
    let (base, _server) = serve_once("200 OK", "application/json", "<html>oops</html>").await;
    let gifs = TenorGifs::new(Some("test-key".to_string()))
        .unwrap()
        .with_base_url(base);

    assert!(gifs.resolve("cat").await.is_none());
}

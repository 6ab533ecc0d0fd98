//! HTTP dispatch against local one-shot servers.

use std::time::{Duration, Instant};

use llm_backend::{BackendConfig, BackendRouter, Brain, BrainError, LlmConfig, PromptRequest};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Serve one canned response and hand back the raw request that was received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        request
    });

    (format!("http://{}", addr), handle)
}

fn router_for(model: &str, backend: BackendConfig, timeout: Duration) -> BackendRouter {
    let config = LlmConfig::builder()
        .api_url(backend.endpoint.clone())
        .model(model)
        .backend(model, backend)
        .timeout(timeout)
        .build();
    BackendRouter::new(config).unwrap()
}

fn request() -> PromptRequest {
    PromptRequest::new("You are friendly.", "alice", "tell me a joke")
}

#[tokio::test]
async fn test_completion_dispatch() {
    let (base, server) = serve_once("200 OK", r#"{"model":"llama3.1:8b","response":"  Why did the crab blush? [GIF: crab]  ","done":true}"#).await;
    let router = router_for(
        "llama3.1:8b",
        BackendConfig::completion(format!("{}/api/generate", base)),
        Duration::from_secs(5),
    );

    let reply = router.generate(&request()).await.unwrap();
    assert_eq!(reply, "Why did the crab blush? [GIF: crab]");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /api/generate"));
    assert!(raw.contains("\"stream\":false"));
    assert!(raw.contains("\"num_predict\":150"));
    assert!(raw.contains("<|start_header_id|>assistant<|end_header_id|>"));
}

#[tokio::test]
async fn test_chat_dispatch_sends_bearer_and_messages() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Knock knock."}}],"usage":{"prompt_tokens":10,"completion_tokens":3,"total_tokens":13}}"#,
    )
    .await;
    let router = router_for(
        "remote",
        BackendConfig::chat(format!("{}/v1/chat/completions", base))
            .with_model_name("gpt-4o-mini")
            .with_api_key("sk-test"),
        Duration::from_secs(5),
    );

    let reply = router.generate(&request()).await.unwrap();
    assert_eq!(reply, "Knock knock.");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /v1/chat/completions"));
    assert!(raw.to_lowercase().contains("authorization: bearer sk-test"));
    assert!(raw.contains("\"model\":\"gpt-4o-mini\""));
    assert!(raw.contains("\"messages\""));
}

#[tokio::test]
async fn test_error_status_is_failure() {
    let (base, _server) = serve_once("500 Internal Server Error", r#"{"error":"model not loaded"}"#).await;
    let router = router_for(
        "llama3.1:8b",
        BackendConfig::completion(format!("{}/api/generate", base)),
        Duration::from_secs(5),
    );

    match router.generate(&request()).await {
        Err(BrainError::ProcessingFailed(msg)) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("model not loaded"));
        }
        other => panic!("Expected ProcessingFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_overloaded_backend_is_unavailable() {
    let (base, _server) =
        serve_once("503 Service Unavailable", r#"{"error":"model is loading"}"#).await;
    let router = router_for(
        "llama3.1:8b",
        BackendConfig::completion(format!("{}/api/generate", base)),
        Duration::from_secs(5),
    );

    match router.generate(&request()).await {
        Err(BrainError::Unavailable(msg)) => assert!(msg.contains("model is loading")),
        other => panic!("Expected Unavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_failure() {
    let (base, _server) = serve_once("200 OK", r#"{"unexpected":true}"#).await;
    let router = router_for(
        "remote",
        BackendConfig::chat(format!("{}/v1/chat/completions", base)),
        Duration::from_secs(5),
    );

    assert!(router.generate(&request()).await.is_err());
}

#[tokio::test]
async fn test_blank_response_is_failure() {
    let (base, _server) = serve_once("200 OK", r#"{"response":"   "}"#).await;
    let router = router_for(
        "llama3.1:8b",
        BackendConfig::completion(format!("{}/api/generate", base)),
        Duration::from_secs(5),
    );

    assert!(matches!(
        router.generate(&request()).await,
        Err(BrainError::EmptyResponse)
    ));
}

#[tokio::test]
async fn test_connection_refused_is_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let router = router_for(
        "llama3.1:8b",
        BackendConfig::completion(format!("http://{}/api/generate", addr)),
        Duration::from_secs(5),
    );

    assert!(matches!(
        router.generate(&request()).await,
        Err(BrainError::Network(_))
    ));
}

#[tokio::test]
async fn test_stalled_backend_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_request(&mut stream).await;
        // Hold the connection open without answering.
        tokio::time::sleep(Duration::from_secs(60)).await;
        drop(stream);
    });

    let timeout = Duration::from_millis(300);
    let router = router_for(
        "llama3.1:8b",
        BackendConfig::completion(format!("http://{}/api/generate", addr)),
        timeout,
    );

    let started = Instant::now();
    let result = router.generate(&request()).await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(BrainError::Timeout(t)) if t == timeout));
    assert!(elapsed >= timeout);
    assert!(elapsed < Duration::from_secs(5), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_health_check() {
    let (base, server) = serve_once("200 OK", r#"{"models":[]}"#).await;
    let router = router_for(
        "llama3.1:8b",
        BackendConfig::completion(format!("{}/api/generate", base)),
        Duration::from_secs(5),
    );

    assert!(router.is_ready().await);
    let raw = server.await.unwrap();
    assert!(raw.starts_with("GET /api/tags"));
}

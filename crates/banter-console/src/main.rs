//! Banter chat bot on a terminal.
//!
//! Each stdin line is one chat message. Address the bot with the prefix
//! (default `!`) or an `@Banter` mention; other lines are only remembered.
//!
//! Run with: cargo run -p banter-console
//!
//! Configuration via .env file or environment variables:
//!   LLM_API_URL        - Primary backend endpoint (default: http://localhost:11434/api/generate)
//!   LLM_MODEL          - Model identifier to route (default: llama3.1:8b)
//!   LLM_BACKENDS       - JSON table of per-model backend overrides
//!   BOT_NAME           - Bot display name (default: Banter)
//!   BOT_PREFIX         - Address/command prefix (default: !)
//!   ENABLE_WEB_SEARCH  - Ground questions with web search (default: true)
//!   TENOR_API_KEY      - GIF lookups (optional)

mod console;

use std::env;
use std::sync::Arc;

use orchestrator::{Orchestrator, OrchestratorError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::console::{parse_line, ConsoleSender};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let bot_name =
        env::var("BOT_NAME").unwrap_or_else(|_| orchestrator::DEFAULT_BOT_NAME.to_string());
    let author = env::var("USER").unwrap_or_else(|_| "you".to_string());

    info!("Initializing orchestrator...");
    let orchestrator = Arc::new(Orchestrator::from_env(ConsoleSender::new(&bot_name))?);
    if !orchestrator.is_ready().await {
        warn!("Model backend is not reachable yet; replies will fall back until it is");
    }
    let sweeper = orchestrator.spawn_sweeper();

    println!(
        "{} is listening. Prefix lines with '{}' or mention @{} to get an answer.",
        bot_name,
        orchestrator.config().prefix,
        bot_name
    );
    println!("Use '#channel name: text' to switch channel or speaker. Ctrl+D to quit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut next_id: u64 = 0;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        next_id += 1;
        let Some(message) = parse_line(&line, &author, &bot_name, next_id) else {
            continue;
        };

        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            match orchestrator.process(message).await {
                Ok(reply) => debug!(
                    "Replied with {} chars (fallback: {}, media: {})",
                    reply.text.len(),
                    reply.fallback,
                    reply.media_url.is_some()
                ),
                Err(OrchestratorError::Skipped(reason)) => {
                    debug!("Message skipped by orchestrator: {}", reason)
                }
                Err(e) => error!("Orchestrator error: {}", e),
            }
        });
    }

    sweeper.abort();
    info!("Shutting down");
    Ok(())
}

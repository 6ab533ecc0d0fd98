//! Line-oriented chat transport over stdin/stdout.

use async_trait::async_trait;
use orchestrator::{InboundMessage, MessageSender, OrchestratorError};
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

/// Channel used when a line names none.
pub const DEFAULT_CHANNEL: &str = "console";

/// Prints bot output to stdout.
pub struct ConsoleSender {
    out: Mutex<Stdout>,
    bot_name: String,
}

impl ConsoleSender {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
            bot_name: bot_name.into(),
        }
    }

    async fn write_line(&self, line: String) -> Result<(), OrchestratorError> {
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes())
            .await
            .map_err(|e| OrchestratorError::SendFailed(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| OrchestratorError::SendFailed(e.to_string()))
    }
}

#[async_trait]
impl MessageSender for ConsoleSender {
    async fn reply(
        &self,
        channel_id: &str,
        reply_to: Option<&str>,
        text: &str,
    ) -> Result<(), OrchestratorError> {
        let target = reply_to.map(|id| format!(" (re {})", id)).unwrap_or_default();
        self.write_line(format!("[#{}] {}{}: {}\n", channel_id, self.bot_name, target, text))
            .await
    }

    async fn send_raw(&self, channel_id: &str, content: &str) -> Result<(), OrchestratorError> {
        self.write_line(format!("[#{}] {}\n", channel_id, content)).await
    }

    async fn set_typing(&self, channel_id: &str, started: bool) -> Result<(), OrchestratorError> {
        if started {
            self.write_line(format!("[#{}] {} is typing...\n", channel_id, self.bot_name))
                .await?;
        }
        Ok(())
    }
}

/// Parse one input line into a message.
///
/// Format: `[#channel] [author:] text`. The bot counts as mentioned when the
/// text contains `@<bot_name>` (any case) or `<@id>` markup. Returns `None`
/// for blank lines.
pub fn parse_line(
    line: &str,
    default_author: &str,
    bot_name: &str,
    message_id: u64,
) -> Option<InboundMessage> {
    let mut rest = line.trim();
    if rest.is_empty() {
        return None;
    }

    let mut channel = DEFAULT_CHANNEL;
    if let Some(tagged) = rest.strip_prefix('#') {
        let (name, text) = tagged.split_once(char::is_whitespace)?;
        channel = name;
        rest = text.trim_start();
    }

    let mut author = default_author;
    if let Some((name, text)) = rest.split_once(": ") {
        if !name.is_empty() && !name.contains(char::is_whitespace) {
            author = name;
            rest = text.trim_start();
        }
    }

    if rest.is_empty() {
        return None;
    }

    let mentioned = rest
        .to_lowercase()
        .contains(&format!("@{}", bot_name.to_lowercase()))
        || rest.contains("<@");

    let mut message =
        InboundMessage::new(channel, author, rest).with_message_id(message_id.to_string());
    if mentioned {
        message = message.mentioning_bot();
    }
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_line() {
        let msg = parse_line("!hello there", "you", "Banter", 1).unwrap();
        assert_eq!(msg.channel_id, DEFAULT_CHANNEL);
        assert_eq!(msg.author, "you");
        assert_eq!(msg.text, "!hello there");
        assert_eq!(msg.message_id.as_deref(), Some("1"));
        assert!(!msg.mentions_bot);
    }

    #[test]
    fn test_parse_channel_and_author() {
        let msg = parse_line("#games bob: @banter who is winning?", "you", "Banter", 7).unwrap();
        assert_eq!(msg.channel_id, "games");
        assert_eq!(msg.author, "bob");
        assert_eq!(msg.text, "@banter who is winning?");
        assert!(msg.mentions_bot);
    }

    #[test]
    fn test_prose_colon_is_not_an_author() {
        let msg = parse_line("note to self: buy milk", "you", "Banter", 2).unwrap();
        assert_eq!(msg.author, "you");
        assert_eq!(msg.text, "note to self: buy milk");
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        assert!(parse_line("   ", "you", "Banter", 3).is_none());
        assert!(parse_line("#general", "you", "Banter", 4).is_none());
    }

    #[tokio::test]
    async fn test_console_sender_accepts_output() {
        let sender = ConsoleSender::new("Banter");
        sender.set_typing("console", true).await.unwrap();
        sender.set_typing("console", false).await.unwrap();
        sender.reply("console", Some("1"), "hi").await.unwrap();
        sender.send_raw("console", "https://example.com/a.gif").await.unwrap();
    }
}

//! Inbound chat message as delivered by a transport.

use serde::{Deserialize, Serialize};

/// A message received from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Channel the message was posted in. All state is keyed by this.
    pub channel_id: String,
    /// Platform message ID, if the transport provides one.
    pub message_id: Option<String>,
    /// Author name or identifier.
    pub author: String,
    /// Raw message text.
    pub text: String,
    /// Whether the author is a bot (including ourselves).
    pub is_bot: bool,
    /// Whether the message mentions the bot directly.
    pub mentions_bot: bool,
    /// ID of the message this one replies to, if any.
    pub reply_to: Option<String>,
}

impl InboundMessage {
    /// Create a plain user message.
    pub fn new(
        channel_id: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            message_id: None,
            author: author.into(),
            text: text.into(),
            is_bot: false,
            mentions_bot: false,
            reply_to: None,
        }
    }

    /// Set the platform message ID.
    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Mark the message as a reply to another message.
    pub fn replying_to(mut self, id: impl Into<String>) -> Self {
        self.reply_to = Some(id.into());
        self
    }

    /// Mark the message as mentioning the bot.
    pub fn mentioning_bot(mut self) -> Self {
        self.mentions_bot = true;
        self
    }

    /// Mark the message as bot-authored.
    pub fn from_bot(mut self) -> Self {
        self.is_bot = true;
        self
    }
}

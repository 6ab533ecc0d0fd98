//! Message sender trait and implementations.

use async_trait::async_trait;

use crate::error::OrchestratorError;

/// Trait for sending replies, raw content, and typing indicators.
///
/// Abstracted to support different transports (chat gateways, console, tests).
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send a text reply.
    ///
    /// # Arguments
    /// * `channel_id` - Channel to post in
    /// * `reply_to` - Platform ID of the message being answered, if known
    /// * `text` - Message content
    async fn reply(
        &self,
        channel_id: &str,
        reply_to: Option<&str>,
        text: &str,
    ) -> Result<(), OrchestratorError>;

    /// Post content as-is, e.g. a media URL for the platform to embed.
    async fn send_raw(&self, channel_id: &str, content: &str) -> Result<(), OrchestratorError>;

    /// Set typing indicator state.
    ///
    /// # Arguments
    /// * `channel_id` - Channel to show the indicator in
    /// * `started` - true to start typing, false to stop
    async fn set_typing(&self, channel_id: &str, started: bool) -> Result<(), OrchestratorError>;
}

/// A no-op message sender for testing that discards all messages.
#[derive(Debug, Clone, Default)]
pub struct NoOpSender;

#[async_trait]
impl MessageSender for NoOpSender {
    async fn reply(
        &self,
        _channel_id: &str,
        _reply_to: Option<&str>,
        _text: &str,
    ) -> Result<(), OrchestratorError> {
        Ok(())
    }

    async fn send_raw(&self, _channel_id: &str, _content: &str) -> Result<(), OrchestratorError> {
        Ok(())
    }

    async fn set_typing(&self, _channel_id: &str, _started: bool) -> Result<(), OrchestratorError> {
        Ok(())
    }
}

/// A logging message sender for debugging that logs all operations.
#[derive(Debug, Clone, Default)]
pub struct LoggingSender;

#[async_trait]
impl MessageSender for LoggingSender {
    async fn reply(
        &self,
        channel_id: &str,
        reply_to: Option<&str>,
        text: &str,
    ) -> Result<(), OrchestratorError> {
        match reply_to {
            Some(id) => tracing::info!("[{}] Reply to {}: {}", channel_id, id, text),
            None => tracing::info!("[{}] Reply: {}", channel_id, text),
        }
        Ok(())
    }

    async fn send_raw(&self, channel_id: &str, content: &str) -> Result<(), OrchestratorError> {
        tracing::info!("[{}] Raw: {}", channel_id, content);
        Ok(())
    }

    async fn set_typing(&self, channel_id: &str, started: bool) -> Result<(), OrchestratorError> {
        let state = if started { "started" } else { "stopped" };
        tracing::info!("[{}] Typing {}", channel_id, state);
        Ok(())
    }
}

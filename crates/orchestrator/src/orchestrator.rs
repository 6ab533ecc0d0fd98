//! Main orchestrator that coordinates message processing.

use std::sync::{Arc, LazyLock};

use agent_tools::{DuckDuckGoSearch, TenorGifs};
use brain_core::{
    hash_prompt, Brain, BrainError, ContextStore, ConversationTurn, InboundMessage, MediaResolver,
    NoMedia, NoSearch, Origin, PromptRequest, SearchProvider, SearchResult,
};
use llm_backend::BackendRouter;
use rand::seq::SliceRandom;
use regex::Regex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::classifier::Classification;
use crate::commands::{Command, HELP_TEXT};
use crate::config::OrchestratorConfig;
use crate::directive::{extract_query, strip_directives};
use crate::error::OrchestratorError;
use crate::sender::MessageSender;
use crate::sweep::spawn_sweeper;

/// Canned replies used when the backend cannot produce one.
pub const FALLBACK_PHRASES: [&str; 4] = [
    "I'm having trouble thinking right now... 🤔",
    "My brain is buffering... 🔄",
    "Error 404: Thought not found 😅",
    "I need a coffee break ☕",
];

/// Text answered when the bot is addressed with nothing else.
pub const EMPTY_PROMPT: &str = "Hey!";

static MENTION_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@!?\d+>").expect("Invalid mention regex"));

/// Pick one of the fallback phrases at random.
pub fn fallback_phrase() -> &'static str {
    FALLBACK_PHRASES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_PHRASES[0])
}

/// What the orchestrator sent in answer to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text sent to the channel (directive-free). Empty when only media was sent.
    pub text: String,
    /// Media query found in the model output, if any.
    pub media_query: Option<String>,
    /// Media URL sent after the text, if the query resolved.
    pub media_url: Option<String>,
    /// Whether `text` is a fallback phrase rather than model output.
    pub fallback: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            media_query: None,
            media_url: None,
            fallback: false,
        }
    }

    fn fallback() -> Self {
        Self {
            fallback: true,
            ..Self::text(fallback_phrase())
        }
    }
}

/// Main orchestrator that coordinates message processing.
///
/// The orchestrator:
/// - Records every human message into its channel's history
/// - Answers only when mentioned or addressed with the prefix
/// - Decides history depth and search need per turn
/// - Grounds information requests with web search results
/// - Turns backend failures into a fallback phrase
/// - Splits media directives out of the reply and resolves them
/// - Maintains the typing indicator while a reply is prepared
pub struct Orchestrator<S: MessageSender> {
    brain: Arc<dyn Brain>,
    search: Arc<dyn SearchProvider>,
    media: Arc<dyn MediaResolver>,
    context: Arc<ContextStore>,
    sender: S,
    config: OrchestratorConfig,
}

impl<S: MessageSender> Orchestrator<S> {
    /// Create an orchestrator with no search or media collaborators.
    pub fn new(brain: Arc<dyn Brain>, sender: S, config: OrchestratorConfig) -> Self {
        let context = Arc::new(ContextStore::new(config.max_context_messages));

        info!(
            "Orchestrator initialized with brain: {}, prefix: {:?}, history cap: {}, system prompt fingerprint: {}",
            brain.name(),
            config.prefix,
            config.max_context_messages,
            hash_prompt(&config.system_prompt)
        );

        Self {
            brain,
            search: Arc::new(NoSearch),
            media: Arc::new(NoMedia),
            context,
            sender,
            config,
        }
    }

    /// Create an orchestrator from environment variables.
    ///
    /// Builds the backend router, DuckDuckGo search, and Tenor resolver.
    pub fn from_env(sender: S) -> Result<Self, OrchestratorError> {
        let config = OrchestratorConfig::from_env();
        let brain = BackendRouter::from_env()?;

        let search = DuckDuckGoSearch::new()
            .map_err(|e| OrchestratorError::Configuration(format!("search client: {}", e)))?;
        let media = TenorGifs::from_env()
            .map_err(|e| OrchestratorError::Configuration(format!("GIF client: {}", e)))?;
        if !media.is_configured() {
            info!("TENOR_API_KEY not set, GIF suggestions will be text-only");
        }

        Ok(Self::new(Arc::new(brain), sender, config)
            .with_search(Arc::new(search))
            .with_media(Arc::new(media)))
    }

    /// Use the given search provider.
    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = search;
        self
    }

    /// Use the given media resolver.
    pub fn with_media(mut self, media: Arc<dyn MediaResolver>) -> Self {
        self.media = media;
        self
    }

    /// Share an existing context store.
    pub fn with_context(mut self, context: Arc<ContextStore>) -> Self {
        self.context = context;
        self
    }

    /// The per-channel context store (for the sweeper).
    pub fn context(&self) -> &Arc<ContextStore> {
        &self.context
    }

    /// Get the configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Get the message sender.
    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Start the periodic idle sweep over this orchestrator's context.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        spawn_sweeper(
            Arc::clone(&self.context),
            self.config.sweep_interval,
            self.config.context_max_age,
        )
    }

    /// Check whether the brain is reachable.
    pub async fn is_ready(&self) -> bool {
        self.brain.is_ready().await
    }

    /// Process an incoming message end-to-end.
    ///
    /// Returns [`OrchestratorError::Skipped`] for bot-authored and
    /// unaddressed messages. Backend, search, and media failures never
    /// produce an error; only a failing transport does.
    pub async fn process(&self, message: InboundMessage) -> Result<Reply, OrchestratorError> {
        if message.is_bot {
            return Err(OrchestratorError::Skipped("bot-authored message".to_string()));
        }

        let channel = message.channel_id.as_str();
        let user_turn = self
            .context
            .append(
                channel,
                &message.author,
                &message.text,
                Origin::User,
                message.reply_to.as_deref(),
            )
            .await;

        let Some(prompt) = self.addressed_text(&message) else {
            debug!("Recorded unaddressed message in {}", channel);
            return Err(OrchestratorError::Skipped("not addressed to the bot".to_string()));
        };

        info!("Processing message from {} in {}", message.author, channel);

        if self.has_prefix(&message.text) {
            if let Some(command) = Command::parse(&prompt) {
                return self.run_command(&message, command).await;
            }
        }

        if let Err(e) = self.sender.set_typing(channel, true).await {
            warn!("Failed to start typing indicator: {}", e);
        }

        let mut reply = self.compose(&message, &user_turn, &prompt).await;

        if let Err(e) = self.sender.set_typing(channel, false).await {
            warn!("Failed to stop typing indicator: {}", e);
        }

        self.deliver(&message, &mut reply).await?;
        Ok(reply)
    }

    /// Generate the answer to one addressed turn and record it.
    async fn compose(
        &self,
        message: &InboundMessage,
        user_turn: &ConversationTurn,
        prompt: &str,
    ) -> Reply {
        let channel = message.channel_id.as_str();
        let classification = Classification::of(prompt);
        debug!("Classification: {:?}", classification);

        let search_results = if self.config.enable_web_search && classification.search {
            self.run_search(prompt).await
        } else {
            Vec::new()
        };

        let mut history: Vec<ConversationTurn> = self
            .context
            .history(channel)
            .await
            .into_iter()
            .filter(|turn| turn.id() != user_turn.id())
            .collect();
        if classification.simple && history.len() > self.config.simple_history_turns {
            history.drain(..history.len() - self.config.simple_history_turns);
        }

        let request = PromptRequest::new(&self.config.system_prompt, &message.author, prompt)
            .with_search(prompt, search_results)
            .with_summary(self.context.summary(channel).await)
            .with_history(history)
            .as_reply(message.reply_to.is_some());

        let timeout = self.config.response_timeout;
        let generated = match tokio::time::timeout(timeout, self.brain.generate(&request)).await {
            Ok(result) => result,
            Err(_) => Err(BrainError::Timeout(timeout)),
        };

        let mut reply = match generated {
            Ok(raw) => Reply {
                media_query: extract_query(&raw),
                ..Reply::text(strip_directives(&raw))
            },
            Err(e) => {
                warn!("Brain {} failed: {}", self.brain.name(), e);
                Reply::fallback()
            }
        };

        // A media-only answer must resolve, or the channel would see nothing.
        if reply.text.is_empty() {
            if let Some(ref query) = reply.media_query {
                reply.media_url = self.media.resolve(query).await;
            }
            if reply.media_url.is_none() {
                warn!("Model reply was empty after removing directives");
                reply = Reply::fallback();
            }
        }

        self.context
            .append(
                channel,
                &self.config.bot_name,
                &reply.text,
                Origin::Bot,
                message.reply_to.as_deref(),
            )
            .await;

        reply
    }

    /// Send the text, then any media. Only a failed text send is an error.
    async fn deliver(
        &self,
        message: &InboundMessage,
        reply: &mut Reply,
    ) -> Result<(), OrchestratorError> {
        let channel = message.channel_id.as_str();

        if !reply.text.is_empty() {
            self.sender
                .reply(channel, message.message_id.as_deref(), &reply.text)
                .await?;
        }

        let Some(ref query) = reply.media_query else {
            return Ok(());
        };
        if reply.media_url.is_none() {
            reply.media_url = self.media.resolve(query).await;
        }
        match reply.media_url {
            Some(ref url) => {
                if let Err(e) = self.sender.send_raw(channel, url).await {
                    warn!("Failed to send media: {}", e);
                }
            }
            None => debug!("No media resolved for {:?}", query),
        }
        Ok(())
    }

    async fn run_search(&self, query: &str) -> Vec<SearchResult> {
        info!("Web search triggered via {} for: {:?}", self.search.name(), query);
        let results = self
            .search
            .search(query, self.config.search_max_results)
            .await;

        if results.is_empty() {
            info!("No search results found");
        } else {
            info!("Found {} search results", results.len());
            for (i, result) in results.iter().enumerate() {
                debug!("  {}. {} <{}>", i + 1, result.title, result.link);
            }
        }
        results
    }

    async fn run_command(
        &self,
        message: &InboundMessage,
        command: Command,
    ) -> Result<Reply, OrchestratorError> {
        let channel = message.channel_id.as_str();
        info!("Running command {:?} in {}", command, channel);

        let text = match command {
            Command::Forget => {
                self.context.clear(channel).await;
                "Done, I've forgotten our conversation in this channel.".to_string()
            }
            Command::Summary(Some(summary)) => {
                self.context.set_summary(channel, summary).await;
                "Got it, I'll keep that summary in mind.".to_string()
            }
            Command::Summary(None) => match self.context.summary(channel).await {
                Some(summary) => format!("Current summary: {}", summary),
                None => "No summary set for this channel.".to_string(),
            },
            Command::Help => HELP_TEXT.to_string(),
        };

        self.sender
            .reply(channel, message.message_id.as_deref(), &text)
            .await?;
        Ok(Reply::text(text))
    }

    fn has_prefix(&self, text: &str) -> bool {
        !self.config.prefix.is_empty() && text.starts_with(&self.config.prefix)
    }

    /// The text the bot should answer, or `None` if the bot was not addressed.
    ///
    /// Strips the prefix and any mention markup. An empty remainder becomes
    /// [`EMPTY_PROMPT`].
    fn addressed_text(&self, message: &InboundMessage) -> Option<String> {
        let prefixed = self.has_prefix(&message.text);
        if !prefixed && !message.mentions_bot {
            return None;
        }

        let text = if prefixed {
            &message.text[self.config.prefix.len()..]
        } else {
            message.text.as_str()
        };

        let mention = format!("@{}", self.config.bot_name);
        let text = MENTION_MARKUP.replace_all(text, "");
        let text = strip_mention(&text, &mention);
        let text = text.trim();

        Some(if text.is_empty() {
            EMPTY_PROMPT.to_string()
        } else {
            text.to_string()
        })
    }
}

/// Remove a plain-text `@Name` mention, case-insensitively.
fn strip_mention(text: &str, mention: &str) -> String {
    let lower = text.to_lowercase();
    let needle = mention.to_lowercase();
    match lower.find(&needle) {
        // Lower-casing can change byte lengths; only cut when it did not.
        Some(start) if lower.len() == text.len() => {
            let end = start + needle.len();
            format!("{}{}", &text[..start], &text[end..])
        }
        _ => text.to_string(),
    }
}

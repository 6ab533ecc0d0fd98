//! Configuration for the orchestrator.

use std::env;
use std::path::Path;
use std::time::Duration;

use brain_core::DEFAULT_MAX_TURNS;

/// Default system prompt file name.
pub const DEFAULT_PROMPT_FILE: &str = "SYSTEM_PROMPT.md";

/// System prompt used when neither the env var nor the prompt file is set.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly and sometimes funny chat bot. \
Respond naturally to the conversation. Keep responses concise (1-3 sentences max). \
You can suggest a GIF by including \"[GIF: search term]\" in your response when appropriate.";

/// Default bot display name.
pub const DEFAULT_BOT_NAME: &str = "Banter";

/// Default command/address prefix.
pub const DEFAULT_PREFIX: &str = "!";

/// Number of prior turns sent for simple turns.
pub const SIMPLE_HISTORY_TURNS: usize = 3;

/// Configuration for the [`Orchestrator`](crate::Orchestrator).
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Name recorded as the author of bot turns.
    pub bot_name: String,

    /// Prefix that addresses the bot and introduces commands.
    pub prefix: String,

    /// System instructions.
    pub system_prompt: String,

    /// Maximum turns kept per channel.
    pub max_context_messages: usize,

    /// Channels idle longer than this are swept.
    pub context_max_age: Duration,

    /// How often the idle sweep runs.
    pub sweep_interval: Duration,

    /// Whether to ground information requests with web search.
    pub enable_web_search: bool,

    /// Results requested per search.
    pub search_max_results: usize,

    /// Prior turns sent for simple turns.
    pub simple_history_turns: usize,

    /// Upper bound on one brain call, on top of the backend's own timeout.
    pub response_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            bot_name: DEFAULT_BOT_NAME.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_context_messages: DEFAULT_MAX_TURNS,
            context_max_age: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(600),
            enable_web_search: true,
            search_max_results: 3,
            simple_history_turns: SIMPLE_HISTORY_TURNS,
            response_timeout: Duration::from_secs(45),
        }
    }
}

impl OrchestratorConfig {
    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `BOT_NAME` - Bot display name (default: Banter)
    /// - `BOT_PREFIX` - Address/command prefix (default: !)
    /// - `BOT_SYSTEM_PROMPT` - System prompt (overrides prompt file)
    /// - `BOT_PROMPT_FILE` - Path to system prompt file (default: SYSTEM_PROMPT.md)
    /// - `MAX_CONTEXT_MESSAGES` - Turns kept per channel (default: 10)
    /// - `CONTEXT_MAX_AGE_SECS` - Idle eviction age (default: 3600)
    /// - `CONTEXT_SWEEP_INTERVAL_SECS` - Sweep interval (default: 600)
    /// - `ENABLE_WEB_SEARCH` - Web search grounding (default: true; `false`/`0` disables)
    /// - `WEB_SEARCH_MAX_RESULTS` - Results per search (default: 3)
    /// - `BOT_RESPONSE_TIMEOUT_SECS` - Brain call bound (default: 45)
    ///
    /// System prompt priority:
    /// 1. `BOT_SYSTEM_PROMPT` env var (if set)
    /// 2. Contents of prompt file (if exists)
    /// 3. [`DEFAULT_SYSTEM_PROMPT`]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let system_prompt = if let Ok(prompt) = env::var("BOT_SYSTEM_PROMPT") {
            prompt
        } else {
            let prompt_file =
                env::var("BOT_PROMPT_FILE").unwrap_or_else(|_| DEFAULT_PROMPT_FILE.to_string());
            load_prompt_file(&prompt_file).unwrap_or(defaults.system_prompt)
        };

        let enable_web_search = env::var("ENABLE_WEB_SEARCH")
            .ok()
            .map(|v| {
                let v = v.trim().to_lowercase();
                v != "false" && v != "0"
            })
            .unwrap_or(defaults.enable_web_search);

        Self {
            bot_name: env::var("BOT_NAME").unwrap_or(defaults.bot_name),
            prefix: env::var("BOT_PREFIX")
                .ok()
                .filter(|p| !p.is_empty())
                .unwrap_or(defaults.prefix),
            system_prompt,
            max_context_messages: parse_var::<usize>("MAX_CONTEXT_MESSAGES")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_context_messages),
            context_max_age: parse_var::<u64>("CONTEXT_MAX_AGE_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.context_max_age),
            sweep_interval: parse_var::<u64>("CONTEXT_SWEEP_INTERVAL_SECS")
                .filter(|n| *n > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            enable_web_search,
            search_max_results: parse_var::<usize>("WEB_SEARCH_MAX_RESULTS")
                .unwrap_or(defaults.search_max_results),
            simple_history_turns: defaults.simple_history_turns,
            response_timeout: parse_var::<u64>("BOT_RESPONSE_TIMEOUT_SECS")
                .filter(|n| *n > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.response_timeout),
        }
    }

    /// Create a new config builder.
    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder::default()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Builder for OrchestratorConfig.
#[derive(Debug, Default)]
pub struct OrchestratorConfigBuilder {
    config: OrchestratorConfig,
}

impl OrchestratorConfigBuilder {
    /// Set the bot name.
    pub fn bot_name(mut self, name: impl Into<String>) -> Self {
        self.config.bot_name = name.into();
        self
    }

    /// Set the address/command prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// Set the system prompt.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    /// Set the per-channel turn cap.
    pub fn max_context_messages(mut self, turns: usize) -> Self {
        self.config.max_context_messages = turns;
        self
    }

    /// Set the idle eviction age.
    pub fn context_max_age(mut self, age: Duration) -> Self {
        self.config.context_max_age = age;
        self
    }

    /// Set the sweep interval.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = interval;
        self
    }

    /// Enable or disable web search grounding.
    pub fn enable_web_search(mut self, enable: bool) -> Self {
        self.config.enable_web_search = enable;
        self
    }

    /// Set the number of results requested per search.
    pub fn search_max_results(mut self, results: usize) -> Self {
        self.config.search_max_results = results;
        self
    }

    /// Set the brain call bound.
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config.response_timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> OrchestratorConfig {
        self.config
    }

    /// Load system prompt from a file.
    ///
    /// If the file exists and is non-empty, sets the system prompt.
    /// Returns self for chaining.
    pub fn load_prompt_file(mut self, path: impl AsRef<Path>) -> Self {
        if let Some(prompt) = load_prompt_file(path) {
            self.config.system_prompt = prompt;
        }
        self
    }
}

/// Load a prompt file, returning None if not found or empty.
fn load_prompt_file(path: impl AsRef<Path>) -> Option<String> {
    let content = std::fs::read_to_string(path.as_ref()).ok()?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

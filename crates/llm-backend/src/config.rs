//! Configuration for the model backends.

use std::env;
use std::time::Duration;

use brain_core::BrainError;
use serde::{Deserialize, Serialize};

/// Default completion endpoint (a local Ollama server).
pub const DEFAULT_API_URL: &str = "http://localhost:11434/api/generate";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "llama3.1:8b";

/// Default dispatch timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Stop sequences for Llama 3 style completion prompts.
pub const LLAMA3_STOP_SEQUENCES: [&str; 2] = ["<|eot_id|>", "<|end_of_text|>"];

/// Wire protocol spoken by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Single prompt blob in, `{response}` out (Ollama `/api/generate`).
    #[default]
    #[serde(alias = "completion-style")]
    Completion,
    /// Role-tagged messages in, `{choices}` out (OpenAI-compatible).
    #[serde(alias = "chat-style")]
    Chat,
}

/// Where and how to reach one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Wire protocol.
    pub kind: BackendKind,
    /// Full request URL.
    pub endpoint: String,
    /// Backend-side model name, when it differs from the model identifier.
    #[serde(default)]
    pub model_name: Option<String>,
    /// Bearer token for chat-style backends.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl BackendConfig {
    /// A completion-style backend at `endpoint`.
    pub fn completion(endpoint: impl Into<String>) -> Self {
        Self {
            kind: BackendKind::Completion,
            endpoint: endpoint.into(),
            model_name: None,
            api_key: None,
        }
    }

    /// A chat-style backend at `endpoint`.
    pub fn chat(endpoint: impl Into<String>) -> Self {
        Self {
            kind: BackendKind::Chat,
            endpoint: endpoint.into(),
            model_name: None,
            api_key: None,
        }
    }

    /// Override the model name sent on the wire.
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    /// Attach a bearer token.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Model name to send for `model_id`.
    pub fn wire_model<'a>(&'a self, model_id: &'a str) -> &'a str {
        self.model_name.as_deref().unwrap_or(model_id)
    }
}

/// One `LLM_BACKENDS` registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendEntry {
    /// Model identifier this entry answers for.
    pub model_id: String,
    /// Backend reached for that identifier.
    #[serde(flatten)]
    pub backend: BackendConfig,
}

/// Generation parameters shared by every backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Baseline sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling threshold.
    pub top_p: f32,
    /// Top-k sampling cutoff.
    pub top_k: u32,
    /// Token budget.
    pub max_tokens: u32,
    /// Repetition penalty.
    pub repeat_penalty: f32,
    /// Stop sequences for completion-style prompts.
    pub stop_sequences: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            max_tokens: 150,
            repeat_penalty: 1.1,
            stop_sequences: LLAMA3_STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Configuration for the [`BackendRouter`](crate::BackendRouter).
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Primary endpoint; unknown model identifiers route here.
    pub api_url: String,

    /// Model identifier used for every turn.
    pub model: String,

    /// Registry of per-model backends.
    pub backends: Vec<BackendEntry>,

    /// Upper bound on one dispatch, connect to last body byte.
    pub timeout: Duration,

    /// Sampling parameters.
    pub generation: GenerationConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            backends: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            generation: GenerationConfig::default(),
        }
    }
}

impl LlmConfig {
    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `LLM_API_URL` - Primary endpoint (default: http://localhost:11434/api/generate)
    /// - `LLM_MODEL` - Model identifier (default: llama3.1:8b)
    /// - `LLM_BACKENDS` - JSON array of `{model_id, kind, endpoint, model_name?, api_key?}`
    /// - `LLM_TIMEOUT_SECS` - Dispatch timeout (default: 30)
    /// - `LLM_TEMPERATURE` - Baseline temperature (default: 0.7)
    /// - `LLM_TOP_P` - Top-p (default: 0.9)
    /// - `LLM_TOP_K` - Top-k (default: 40)
    /// - `LLM_MAX_TOKENS` - Token budget (default: 150)
    /// - `LLM_REPEAT_PENALTY` - Repeat penalty (default: 1.1)
    ///
    /// Fails only when `LLM_BACKENDS` is set but is not valid JSON.
    pub fn from_env() -> Result<Self, BrainError> {
        let defaults = Self::default();

        let api_url = env::var("LLM_API_URL").unwrap_or(defaults.api_url);
        let model = env::var("LLM_MODEL").unwrap_or(defaults.model);

        let backends = match env::var("LLM_BACKENDS") {
            Ok(raw) if !raw.trim().is_empty() => parse_backends(&raw)?,
            _ => Vec::new(),
        };

        let timeout = env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let generation = GenerationConfig {
            temperature: parse_var("LLM_TEMPERATURE").unwrap_or(defaults.generation.temperature),
            top_p: parse_var("LLM_TOP_P").unwrap_or(defaults.generation.top_p),
            top_k: parse_var("LLM_TOP_K").unwrap_or(defaults.generation.top_k),
            max_tokens: parse_var("LLM_MAX_TOKENS").unwrap_or(defaults.generation.max_tokens),
            repeat_penalty: parse_var("LLM_REPEAT_PENALTY")
                .unwrap_or(defaults.generation.repeat_penalty),
            stop_sequences: defaults.generation.stop_sequences,
        };

        Ok(Self {
            api_url,
            model,
            backends,
            timeout,
            generation,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> LlmConfigBuilder {
        LlmConfigBuilder::default()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse an `LLM_BACKENDS` JSON array.
pub fn parse_backends(raw: &str) -> Result<Vec<BackendEntry>, BrainError> {
    serde_json::from_str(raw)
        .map_err(|e| BrainError::Configuration(format!("LLM_BACKENDS is not valid: {}", e)))
}

/// Builder for LlmConfig.
#[derive(Debug, Default)]
pub struct LlmConfigBuilder {
    config: LlmConfig,
}

impl LlmConfigBuilder {
    /// Set the primary endpoint.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Register a backend for a model identifier.
    pub fn backend(mut self, model_id: impl Into<String>, backend: BackendConfig) -> Self {
        self.config.backends.push(BackendEntry {
            model_id: model_id.into(),
            backend,
        });
        self
    }

    /// Set the dispatch timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the baseline temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    /// Set the token budget.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.generation.max_tokens = tokens;
        self
    }

    /// Replace all generation parameters.
    pub fn generation(mut self, generation: GenerationConfig) -> Self {
        self.config.generation = generation;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> LlmConfig {
        self.config
    }
}

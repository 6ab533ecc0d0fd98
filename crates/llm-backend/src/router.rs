//! BackendRouter: model registry lookup plus single-shot dispatch.

use std::collections::HashMap;
use std::time::Duration;

use brain_core::{async_trait, hash_prompt, Brain, BrainError, PromptRequest};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use crate::api_types::{error_message, ChatCompletionResponse, GenerateResponse};
use crate::assembler::{Payload, PromptAssembler};
use crate::config::{BackendConfig, BackendKind, LlmConfig};

/// Timeout for backend health probes.
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Routes prompts to the backend registered for the configured model.
///
/// Every dispatch is exactly one HTTP request bounded by the configured
/// timeout. Failures come back as `Err`; nothing is retried here.
pub struct BackendRouter {
    client: Client,
    config: LlmConfig,
    registry: HashMap<String, BackendConfig>,
    assembler: PromptAssembler,
}

impl BackendRouter {
    /// Create a new router with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, BrainError> {
        let client = Client::builder()
            .build()
            .map_err(|e| BrainError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        let registry: HashMap<String, BackendConfig> = config
            .backends
            .iter()
            .map(|entry| (entry.model_id.clone(), entry.backend.clone()))
            .collect();

        let assembler = PromptAssembler::new(config.generation.clone());

        info!(
            "BackendRouter initialized with model: {}, endpoint: {}, registered backends: {}, timeout: {:?}",
            config.model,
            config.api_url,
            registry.len(),
            config.timeout
        );

        Ok(Self {
            client,
            config,
            registry,
            assembler,
        })
    }

    /// Create a router from environment variables.
    ///
    /// See [`LlmConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, BrainError> {
        Self::new(LlmConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Get the prompt assembler.
    pub fn assembler(&self) -> &PromptAssembler {
        &self.assembler
    }

    /// Look up the backend for a model identifier.
    ///
    /// Unknown identifiers get a completion-style backend on the primary
    /// endpoint.
    pub fn resolve(&self, model_id: &str) -> BackendConfig {
        match self.registry.get(model_id) {
            Some(backend) => backend.clone(),
            None => {
                debug!("No backend registered for {}, using primary endpoint", model_id);
                BackendConfig::completion(self.config.api_url.clone())
            }
        }
    }

    /// Send one payload to one backend and return the model text.
    ///
    /// Returns `Err` on transport failure, non-2xx status, timeout, or a
    /// missing or blank response field.
    pub async fn dispatch(
        &self,
        backend: &BackendConfig,
        payload: &Payload,
    ) -> Result<String, BrainError> {
        if payload.kind() != backend.kind {
            warn!(
                "Payload shaped for {:?} sent to {:?} backend at {}",
                payload.kind(),
                backend.kind,
                backend.endpoint
            );
        }

        let timeout = self.config.timeout;
        let text = tokio::time::timeout(timeout, self.send(backend, payload))
            .await
            .map_err(|_| BrainError::Timeout(timeout))??;

        let text = text.trim();
        if text.is_empty() {
            return Err(BrainError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    async fn send(&self, backend: &BackendConfig, payload: &Payload) -> Result<String, BrainError> {
        debug!(
            "Dispatching to {} ({:?}, model {})",
            backend.endpoint,
            backend.kind,
            payload.model()
        );

        let mut request = self.client.post(&backend.endpoint);
        if let Some(ref key) = backend.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let request = match payload {
            Payload::Completion(body) => request.json(body),
            Payload::Chat(body) => request.json(body),
        };

        let response = request
            .send()
            .await
            .map_err(|e| BrainError::Network(format!("Failed to send request: {}", e)))?;
        let response = check_status(response).await?;

        match payload {
            Payload::Completion(_) => {
                let body: GenerateResponse = response.json().await.map_err(|e| {
                    BrainError::ProcessingFailed(format!("Failed to parse response: {}", e))
                })?;
                body.response.ok_or(BrainError::EmptyResponse)
            }
            Payload::Chat(_) => {
                let body: ChatCompletionResponse = response.json().await.map_err(|e| {
                    BrainError::ProcessingFailed(format!("Failed to parse response: {}", e))
                })?;

                if let Some(usage) = body.usage {
                    debug!(
                        "Token usage - prompt: {}, completion: {}, total: {}",
                        usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
                    );
                }

                body.choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .ok_or(BrainError::EmptyResponse)
            }
        }
    }

    /// Probe a backend's model listing endpoint.
    pub async fn check_health(&self, backend: &BackendConfig) -> bool {
        let Some(url) = health_url(backend) else {
            warn!("Cannot derive health URL from {}", backend.endpoint);
            return false;
        };

        let mut request = self.client.get(&url).timeout(HEALTH_CHECK_TIMEOUT);
        if let Some(ref key) = backend.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Health check against {} failed: {}", url, e);
                false
            }
        }
    }
}

async fn check_status(response: Response) -> Result<Response, BrainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = format!("API error ({}): {}", status.as_u16(), error_message(&body));

    // Overloaded or still loading the model.
    if status == StatusCode::SERVICE_UNAVAILABLE || status == StatusCode::TOO_MANY_REQUESTS {
        return Err(BrainError::Unavailable(message));
    }
    Err(BrainError::ProcessingFailed(message))
}

/// URL listing a backend's models: `/api/tags` for completion backends,
/// `/models` next to `/chat/completions` for chat backends.
pub fn health_url(backend: &BackendConfig) -> Option<String> {
    let mut url = Url::parse(&backend.endpoint).ok()?;
    let path = url.path().trim_end_matches('/').to_string();

    let health_path = match backend.kind {
        BackendKind::Completion => match path.strip_suffix("/api/generate") {
            Some(base) => format!("{}/api/tags", base),
            None => "/api/tags".to_string(),
        },
        BackendKind::Chat => match path.strip_suffix("/chat/completions") {
            Some(base) => format!("{}/models", base),
            None => format!("{}/models", path),
        },
    };

    url.set_path(&health_path);
    url.set_query(None);
    Some(url.to_string())
}

#[async_trait]
impl Brain for BackendRouter {
    async fn generate(&self, request: &PromptRequest) -> Result<String, BrainError> {
        let model_id = self.config.model.as_str();
        let backend = self.resolve(model_id);
        let payload = self
            .assembler
            .assemble(backend.kind, backend.wire_model(model_id), request);

        debug!(
            "Assembled {:?} payload, prompt fingerprint {}, temperature {}",
            backend.kind,
            hash_prompt(&request.system_prompt),
            payload.temperature()
        );

        self.dispatch(&backend, &payload).await
    }

    fn name(&self) -> &str {
        "BackendRouter"
    }

    async fn is_ready(&self) -> bool {
        let backend = self.resolve(&self.config.model);
        self.check_health(&backend).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> BackendRouter {
        let config = LlmConfig::builder()
            .api_url("http://localhost:11434/api/generate")
            .model("llama3.1:8b")
            .backend(
                "gpt-4o-mini",
                BackendConfig::chat("https://api.openai.com/v1/chat/completions")
                    .with_api_key("sk-test"),
            )
            .backend(
                "big",
                BackendConfig::completion("http://gpu:11434/api/generate").with_model_name("llama3.1:70b"),
            )
            .build();
        BackendRouter::new(config).unwrap()
    }

    #[test]
    fn test_resolve_registered() {
        let router = router();

        let chat = router.resolve("gpt-4o-mini");
        assert_eq!(chat.kind, BackendKind::Chat);
        assert_eq!(chat.api_key.as_deref(), Some("sk-test"));

        let big = router.resolve("big");
        assert_eq!(big.endpoint, "http://gpu:11434/api/generate");
        assert_eq!(big.wire_model("big"), "llama3.1:70b");
    }

    #[test]
    fn test_resolve_unknown_uses_default_kind() {
        let router = router();
        let backend = router.resolve("never-registered");

        assert_eq!(backend.kind, BackendKind::default());
        assert_eq!(backend.kind, BackendKind::Completion);
        assert_eq!(backend.endpoint, "http://localhost:11434/api/generate");
        assert_eq!(backend.wire_model("never-registered"), "never-registered");
    }

    #[test]
    fn test_health_url() {
        assert_eq!(
            health_url(&BackendConfig::completion("http://localhost:11434/api/generate")).as_deref(),
            Some("http://localhost:11434/api/tags")
        );
        assert_eq!(
            health_url(&BackendConfig::chat("https://api.example.com/v1/chat/completions")).as_deref(),
            Some("https://api.example.com/v1/models")
        );
        assert_eq!(
            health_url(&BackendConfig::chat("http://localhost:8080/v1")).as_deref(),
            Some("http://localhost:8080/v1/models")
        );
        assert!(health_url(&BackendConfig::completion("not a url")).is_none());
    }

    #[test]
    fn test_brain_name() {
        assert_eq!(router().name(), "BackendRouter");
    }
}

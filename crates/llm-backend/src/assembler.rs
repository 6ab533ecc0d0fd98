//! Turning a [`PromptRequest`] into the payload a backend expects.
//!
//! Both payload shapes carry the same sections in the same relative order:
//! search results, summary, history, then the current turn. Absent sections
//! are omitted entirely.

use brain_core::{ConversationTurn, PromptRequest, SearchContext};

use crate::api_types::{ChatCompletionRequest, ChatMessage, GenerateOptions, GenerateRequest};
use crate::config::{BackendKind, GenerationConfig};

/// Factor applied to the baseline temperature when search results are present.
pub const SEARCH_TEMPERATURE_FACTOR: f32 = 0.5;

/// Lowest baseline temperature used. Smaller configured values (including
/// zero) are raised to this so a search-grounded turn is still strictly cooler.
pub const MIN_TEMPERATURE: f32 = 0.05;

/// Instruction appended to rendered search results.
pub const GROUNDING_INSTRUCTION: &str = "Use these search results to answer accurately. \
Prefer them over what you remember and mention the source when you rely on one.";

const BEGIN_OF_TEXT: &str = "<|begin_of_text|>";
const END_OF_TURN: &str = "<|eot_id|>";

/// A request body ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Completion-style body.
    Completion(GenerateRequest),
    /// Chat-style body.
    Chat(ChatCompletionRequest),
}

impl Payload {
    /// Backend kind this payload is shaped for.
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Completion(_) => BackendKind::Completion,
            Self::Chat(_) => BackendKind::Chat,
        }
    }

    /// Sampling temperature carried by the payload.
    pub fn temperature(&self) -> f32 {
        match self {
            Self::Completion(req) => req.options.temperature,
            Self::Chat(req) => req.temperature,
        }
    }

    /// Model name carried by the payload.
    pub fn model(&self) -> &str {
        match self {
            Self::Completion(req) => &req.model,
            Self::Chat(req) => &req.model,
        }
    }
}

/// Builds backend payloads from prompt requests.
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    generation: GenerationConfig,
}

impl PromptAssembler {
    /// Create an assembler with the given generation parameters.
    pub fn new(generation: GenerationConfig) -> Self {
        Self { generation }
    }

    /// Generation parameters in use.
    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    /// Build the payload for `kind`.
    pub fn assemble(&self, kind: BackendKind, model: &str, request: &PromptRequest) -> Payload {
        match kind {
            BackendKind::Completion => Payload::Completion(self.completion(model, request)),
            BackendKind::Chat => Payload::Chat(self.chat(model, request)),
        }
    }

    /// Temperature for a request: lowered when search results are attached.
    ///
    /// The baseline is never below [`MIN_TEMPERATURE`].
    pub fn temperature_for(&self, request: &PromptRequest) -> f32 {
        let baseline = self.generation.temperature.max(MIN_TEMPERATURE);
        if request.has_search_results() {
            baseline * SEARCH_TEMPERATURE_FACTOR
        } else {
            baseline
        }
    }

    fn completion(&self, model: &str, request: &PromptRequest) -> GenerateRequest {
        let mut prompt = String::from(BEGIN_OF_TEXT);
        push_section(&mut prompt, "system", &request.system_prompt);

        if let Some(ref search) = request.search {
            push_section(&mut prompt, "search", &render_search_section(search));
        }

        if let Some(ref summary) = request.summary {
            push_section(&mut prompt, "summary", summary);
        }

        if !request.history.is_empty() {
            let lines: Vec<String> = request.history.iter().map(render_history_line).collect();
            push_section(&mut prompt, "context", &lines.join("\n"));
        }

        push_section(&mut prompt, "user", &render_current_turn(request));
        push_header(&mut prompt, "assistant");

        GenerateRequest {
            model: model.to_string(),
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature_for(request),
                top_p: self.generation.top_p,
                top_k: self.generation.top_k,
                num_predict: self.generation.max_tokens,
                repeat_penalty: self.generation.repeat_penalty,
                stop: self.generation.stop_sequences.clone(),
            },
        }
    }

    fn chat(&self, model: &str, request: &PromptRequest) -> ChatCompletionRequest {
        let mut messages = vec![ChatMessage::system(request.system_prompt.clone())];

        if let Some(ref search) = request.search {
            messages.push(ChatMessage::system(render_search_section(search)));
        }

        if let Some(ref summary) = request.summary {
            messages.push(ChatMessage::system(format!(
                "Conversation summary:\n{}",
                summary
            )));
        }

        for turn in &request.history {
            if turn.is_bot() {
                messages.push(ChatMessage::assistant(turn.content()));
            } else {
                messages.push(ChatMessage::user(format!(
                    "{}: {}",
                    speaker(turn.author(), turn.reply_to().is_some()),
                    turn.content()
                )));
            }
        }

        messages.push(ChatMessage::user(render_current_turn(request)));

        ChatCompletionRequest {
            model: model.to_string(),
            messages,
            temperature: self.temperature_for(request),
            max_tokens: self.generation.max_tokens,
            stream: false,
        }
    }
}

fn push_header(prompt: &mut String, label: &str) {
    prompt.push_str("<|start_header_id|>");
    prompt.push_str(label);
    prompt.push_str("<|end_header_id|>\n\n");
}

fn push_section(prompt: &mut String, label: &str, body: &str) {
    push_header(prompt, label);
    prompt.push_str(body);
    prompt.push_str(END_OF_TURN);
}

const REPLY_MARKER: &str = " (replying to previous message)";

fn reply_marker(is_reply: bool) -> &'static str {
    if is_reply {
        REPLY_MARKER
    } else {
        ""
    }
}

fn speaker(author: &str, is_reply: bool) -> String {
    format!("{}{}", author, reply_marker(is_reply))
}

/// Render one history turn as `Role (author)[ (replying to previous message)]: content`.
pub fn render_history_line(turn: &ConversationTurn) -> String {
    format!(
        "{} ({}){}: {}",
        turn.origin().label(),
        turn.author(),
        reply_marker(turn.reply_to().is_some()),
        turn.content()
    )
}

/// Render the current turn as `author[ (replying to previous message)]: text`.
pub fn render_current_turn(request: &PromptRequest) -> String {
    format!("{}: {}", speaker(&request.author, request.is_reply), request.text)
}

/// Render search results in relevance order, numbered from 1.
pub fn render_search_results(search: &SearchContext) -> String {
    let mut out = format!("Search results for \"{}\":\n\n", search.query);
    for (i, result) in search.results.iter().enumerate() {
        out.push_str(&format!(
            "{}. {}\n   {}\n   Source: {}\n\n",
            i + 1,
            result.title,
            result.snippet,
            result.link
        ));
    }
    out
}

fn render_search_section(search: &SearchContext) -> String {
    format!("{}{}", render_search_results(search), GROUNDING_INSTRUCTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::{ContextStore, Origin, SearchResult};

    fn results() -> Vec<SearchResult> {
        vec![
            SearchResult::new("Paris - Wikipedia", "https://en.wikipedia.org/wiki/Paris", "Paris is the capital of France."),
            SearchResult::new("France facts", "https://example.com/france", "Facts about France."),
        ]
    }

    async fn history() -> Vec<ConversationTurn> {
        let store = ContextStore::new(10);
        store.append("c", "alice", "hey bot", Origin::User, None).await;
        store.append("c", "Banter", "hey alice!", Origin::Bot, Some("m1")).await;
        store.history("c").await
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("{:?} not found in prompt", needle))
    }

    #[test]
    fn test_search_lowers_temperature() {
        let assembler = PromptAssembler::default();
        let plain = PromptRequest::new("sys", "alice", "what is the capital of France?");
        let grounded = plain.clone().with_search("capital of France", results());

        for kind in [BackendKind::Completion, BackendKind::Chat] {
            let base = assembler.assemble(kind, "m", &plain).temperature();
            let lowered = assembler.assemble(kind, "m", &grounded).temperature();
            assert!(lowered < base, "{:?}: {} !< {}", kind, lowered, base);
        }
    }

    #[tokio::test]
    async fn test_completion_section_order() {
        let request = PromptRequest::new("Be nice.", "alice", "what is the capital of France?")
            .with_search("capital of France", results())
            .with_summary(Some("Alice is planning a trip.".to_string()))
            .with_history(history().await);

        let payload = PromptAssembler::default().assemble(BackendKind::Completion, "llama3.1:8b", &request);
        let Payload::Completion(req) = payload else {
            panic!("Expected completion payload");
        };
        let prompt = &req.prompt;

        assert!(prompt.starts_with("<|begin_of_text|><|start_header_id|>system<|end_header_id|>\n\nBe nice.<|eot_id|>"));
        let search = position(prompt, "Search results for \"capital of France\":");
        let summary = position(prompt, "Alice is planning a trip.");
        let history = position(prompt, "User (alice): hey bot");
        let current = position(prompt, "<|start_header_id|>user<|end_header_id|>\n\nalice: what is the capital of France?");
        assert!(search < summary && summary < history && history < current);

        assert!(prompt.contains("Assistant (Banter) (replying to previous message): hey alice!"));
        assert!(prompt.ends_with("<|start_header_id|>assistant<|end_header_id|>\n\n"));
        assert!(position(prompt, "1. Paris - Wikipedia") < position(prompt, "2. France facts"));
        assert!(prompt.contains("   Source: https://en.wikipedia.org/wiki/Paris"));
        assert_eq!(req.options.num_predict, 150);
        assert!(!req.stream);
    }

    #[test]
    fn test_completion_omits_absent_sections() {
        let request = PromptRequest::new("Be nice.", "alice", "hi");
        let Payload::Completion(req) = PromptAssembler::default().assemble(BackendKind::Completion, "m", &request) else {
            panic!("Expected completion payload");
        };

        assert!(!req.prompt.contains("search<|end_header_id|>"));
        assert!(!req.prompt.contains("summary<|end_header_id|>"));
        assert!(!req.prompt.contains("context<|end_header_id|>"));
        assert_eq!(req.options.temperature, 0.7);
    }

    #[tokio::test]
    async fn test_chat_message_order() {
        let request = PromptRequest::new("Be nice.", "alice", "what is the capital of France?")
            .with_search("capital of France", results())
            .with_summary(Some("Alice is planning a trip.".to_string()))
            .with_history(history().await);

        let Payload::Chat(req) = PromptAssembler::default().assemble(BackendKind::Chat, "gpt-4o-mini", &request) else {
            panic!("Expected chat payload");
        };

        let roles: Vec<&str> = req.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "system", "system", "user", "assistant", "user"]);
        assert_eq!(req.messages[0].content, "Be nice.");
        assert!(req.messages[1].content.starts_with("Search results for"));
        assert!(req.messages[2].content.contains("Alice is planning a trip."));
        assert_eq!(req.messages[3].content, "alice: hey bot");
        assert_eq!(req.messages[4].content, "hey alice!");
        assert_eq!(req.messages[5].content, "alice: what is the capital of France?");
        assert_eq!(req.model, "gpt-4o-mini");
        assert!(!req.stream);
    }

    #[test]
    fn test_chat_minimal() {
        let request = PromptRequest::new("Be nice.", "alice", "hi");
        let payload = PromptAssembler::default().assemble(BackendKind::Chat, "m", &request);

        assert_eq!(payload.kind(), BackendKind::Chat);
        let Payload::Chat(req) = payload else {
            panic!("Expected chat payload");
        };
        assert_eq!(req.messages.len(), 2);
    }

    #[test]
    fn test_zero_baseline_still_lowered_by_search() {
        let assembler = PromptAssembler::new(GenerationConfig {
            temperature: 0.0,
            ..GenerationConfig::default()
        });
        let plain = PromptRequest::new("sys", "alice", "who won?");
        let grounded = plain.clone().with_search("who won", results());

        let base = assembler.temperature_for(&plain);
        assert_eq!(base, MIN_TEMPERATURE);
        assert!(assembler.temperature_for(&grounded) < base);
        assert!(assembler.temperature_for(&grounded) > 0.0);
    }

    #[test]
    fn test_current_turn_carries_author_and_reply() {
        let assembler = PromptAssembler::default();
        let from_alice = PromptRequest::new("sys", "alice", "sounds good");
        let from_bob = PromptRequest::new("sys", "bob", "sounds good").as_reply(true);

        let Payload::Completion(alice) = assembler.assemble(BackendKind::Completion, "m", &from_alice) else {
            panic!("Expected completion payload");
        };
        let Payload::Completion(bob) = assembler.assemble(BackendKind::Completion, "m", &from_bob) else {
            panic!("Expected completion payload");
        };
        assert_ne!(alice.prompt, bob.prompt);
        assert!(alice.prompt.contains("user<|end_header_id|>\n\nalice: sounds good<|eot_id|>"));
        assert!(bob
            .prompt
            .contains("user<|end_header_id|>\n\nbob (replying to previous message): sounds good<|eot_id|>"));

        let Payload::Chat(chat) = assembler.assemble(BackendKind::Chat, "m", &from_bob) else {
            panic!("Expected chat payload");
        };
        assert_eq!(
            chat.messages.last().map(|m| m.content.as_str()),
            Some("bob (replying to previous message): sounds good")
        );
    }

    #[test]
    fn test_render_search_results_format() {
        let search = SearchContext {
            query: "rust".to_string(),
            results: vec![SearchResult::new("Rust", "https://rust-lang.org", "A language.")],
        };

        assert_eq!(
            render_search_results(&search),
            "Search results for \"rust\":\n\n1. Rust\n   A language.\n   Source: https://rust-lang.org\n\n"
        );
    }
}

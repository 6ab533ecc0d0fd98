//! Scripted brain implementation - replays canned replies.

use std::collections::VecDeque;

use brain_core::{async_trait, Brain, BrainError, PromptRequest};
use tokio::sync::Mutex;

enum Step {
    Reply(String),
    Fail(String),
}

/// A brain that answers from a script and records what it was asked.
///
/// Steps are consumed in order. Once the script runs out, every call
/// returns [`BrainError::EmptyResponse`].
#[derive(Default)]
pub struct ScriptedBrain {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<PromptRequest>>,
}

impl ScriptedBrain {
    /// Create a brain with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a brain that returns the given replies in order.
    pub fn replying<I, T>(replies: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let script = replies.into_iter().map(|r| Step::Reply(r.into())).collect();
        Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply.
    pub async fn push_reply(&self, reply: impl Into<String>) {
        self.script.lock().await.push_back(Step::Reply(reply.into()));
    }

    /// Queue a failure.
    pub async fn push_failure(&self, reason: impl Into<String>) {
        self.script.lock().await.push_back(Step::Fail(reason.into()));
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<PromptRequest> {
        self.requests.lock().await.clone()
    }

    /// The most recent request, if any.
    pub async fn last_request(&self) -> Option<PromptRequest> {
        self.requests.lock().await.last().cloned()
    }
}

#[async_trait]
impl Brain for ScriptedBrain {
    async fn generate(&self, request: &PromptRequest) -> Result<String, BrainError> {
        self.requests.lock().await.push(request.clone());

        match self.script.lock().await.pop_front() {
            Some(Step::Reply(text)) => Ok(text),
            Some(Step::Fail(reason)) => Err(BrainError::ProcessingFailed(reason)),
            None => Err(BrainError::EmptyResponse),
        }
    }

    fn name(&self) -> &str {
        "ScriptedBrain"
    }
}

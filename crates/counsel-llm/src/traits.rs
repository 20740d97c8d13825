use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::streaming::RunEventStream;

/// Conversation primitives of an assistant provider.
///
/// A thread is the provider-side conversation; a run asks an assistant to
/// answer the thread. Both streaming calls return the run's event stream.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Append a user message to an existing thread
    async fn create_message(&self, thread_id: &str, content: &str) -> Result<ThreadMessage>;

    /// Start a streamed run on an existing thread
    async fn create_run_stream(&self, thread_id: &str, request: RunRequest) -> Result<RunEventStream>;

    /// Create a thread seeded with `messages` and start a streamed run on it
    async fn create_thread_and_run_stream(
        &self,
        request: RunRequest,
        messages: Vec<MessageInput>,
    ) -> Result<RunEventStream>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub assistant_id: String,
    pub additional_instructions: Option<String>,
}

impl RunRequest {
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            additional_instructions: None,
        }
    }

    pub fn additional_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.additional_instructions = Some(instructions.into());
        self
    }
}

/// Message used to seed a new thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInput {
    pub role: String,
    pub content: String,
}

impl MessageInput {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// The provider's acknowledgement of a created message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub thread_id: String,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_seed_is_a_user_message() {
        let seed = serde_json::to_value(MessageInput::user("Olá")).unwrap();
        assert_eq!(seed, serde_json::json!({ "role": "user", "content": "Olá" }));
    }

    #[test]
    fn test_run_request_instructions() {
        let run = RunRequest::new("asst_1").additional_instructions("Seja breve.");
        assert_eq!(run.assistant_id, "asst_1");
        assert_eq!(run.additional_instructions.as_deref(), Some("Seja breve."));
    }
}

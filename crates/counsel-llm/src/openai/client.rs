// OpenAI Assistants client (HTTP direct, no SDK)

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Response;
use serde::Serialize;

use crate::config::DEFAULT_BASE_URL;
use crate::streaming::{parse_run_sse_stream, RunEventStream};
use crate::traits::{AssistantClient, MessageInput, RunRequest, ThreadMessage};

const OPENAI_BETA: &str = "openai-beta";
const ASSISTANTS_V2: &str = "assistants=v2";

/// Client for threads, messages and streamed runs
pub struct OpenAIAssistantClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIAssistantClient {
    /// Create new client with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (proxies, mock servers)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(OPENAI_BETA),
            HeaderValue::from_static(ASSISTANTS_V2),
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Assistant API request");

        let response = self
            .http_client
            .post(&url)
            .json(payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}): {}", status, error_text);
        }

        Ok(response)
    }
}

// ============================================================================
// REQUEST PAYLOADS
// ============================================================================

#[derive(Serialize)]
struct CreateMessagePayload<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CreateRunPayload<'a> {
    assistant_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    additional_instructions: Option<&'a str>,
    stream: bool,
}

#[derive(Serialize)]
struct ThreadSeed {
    messages: Vec<MessageInput>,
}

#[derive(Serialize)]
struct CreateThreadAndRunPayload<'a> {
    assistant_id: &'a str,
    thread: ThreadSeed,
    #[serde(skip_serializing_if = "Option::is_none")]
    additional_instructions: Option<&'a str>,
    stream: bool,
}

#[async_trait]
impl AssistantClient for OpenAIAssistantClient {
    async fn create_message(&self, thread_id: &str, content: &str) -> Result<ThreadMessage> {
        let payload = CreateMessagePayload {
            role: "user",
            content,
        };

        let response = self
            .post(&format!("/threads/{}/messages", thread_id), &payload)
            .await?;

        response
            .json::<ThreadMessage>()
            .await
            .context("Failed to parse message response")
    }

    async fn create_run_stream(&self, thread_id: &str, request: RunRequest) -> Result<RunEventStream> {
        let payload = CreateRunPayload {
            assistant_id: &request.assistant_id,
            additional_instructions: request.additional_instructions.as_deref(),
            stream: true,
        };

        let response = self
            .post(&format!("/threads/{}/runs", thread_id), &payload)
            .await?;

        Ok(parse_run_sse_stream(response))
    }

    async fn create_thread_and_run_stream(
        &self,
        request: RunRequest,
        messages: Vec<MessageInput>,
    ) -> Result<RunEventStream> {
        let payload = CreateThreadAndRunPayload {
            assistant_id: &request.assistant_id,
            thread: ThreadSeed { messages },
            additional_instructions: request.additional_instructions.as_deref(),
            stream: true,
        };

        let response = self.post("/threads/runs", &payload).await?;

        Ok(parse_run_sse_stream(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_trimmed() {
        let client = OpenAIAssistantClient::with_base_url("k", "http://localhost:9/v1/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:9/v1");
    }

    #[test]
    fn test_invalid_api_key_is_rejected() {
        assert!(OpenAIAssistantClient::new("bad\nkey").is_err());
    }

    #[test]
    fn test_thread_and_run_payload_shape() {
        let payload = CreateThreadAndRunPayload {
            assistant_id: "asst_1",
            thread: ThreadSeed {
                messages: vec![MessageInput::user("Olá")],
            },
            additional_instructions: None,
            stream: true,
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "assistant_id": "asst_1",
                "thread": { "messages": [{ "role": "user", "content": "Olá" }] },
                "stream": true
            })
        );
    }
}

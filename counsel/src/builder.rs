use crate::client::{ChatSession, DisplayMode, HttpRelayTransport};
use crate::types::WireFormat;
use anyhow::{Context, Result};
use std::sync::Arc;

const CHAT_STREAM_PATH: &str = "/api/chat/stream";

/// Builds a [`ChatSession`] wired to the relay's chat endpoint.
///
/// ```rust,no_run
/// use counsel::prelude::*;
///
/// # fn main() -> Result<()> {
/// let chat = ChatBuilder::new()
///     .relay_url("http://localhost:8000")
///     .assistant_id("asst_123")
///     .format(WireFormat::Legacy)
///     .display_mode(DisplayMode::Buffered)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChatBuilder {
    relay_url: Option<String>,
    assistant_id: Option<String>,
    format: WireFormat,
    display: DisplayMode,
    thread_id: Option<String>,
}

impl ChatBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base URL of the relay (required)
    pub fn relay_url(mut self, url: impl Into<String>) -> Self {
        self.relay_url = Some(url.into());
        self
    }

    /// Assistant answering the conversation (required)
    pub fn assistant_id(mut self, id: impl Into<String>) -> Self {
        self.assistant_id = Some(id.into());
        self
    }

    /// Wire format requested from the relay (default: ndjson)
    pub fn format(mut self, format: WireFormat) -> Self {
        self.format = format;
        self
    }

    pub fn display_mode(mut self, display: DisplayMode) -> Self {
        self.display = display;
        self
    }

    /// Resume an existing conversation
    pub fn thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn build(self) -> Result<ChatSession> {
        let relay_url = self
            .relay_url
            .filter(|url| !url.trim().is_empty())
            .context("relay URL is required")?;
        let assistant_id = self
            .assistant_id
            .filter(|id| !id.trim().is_empty())
            .context("assistant id is required")?;

        let endpoint = format!("{}{}", relay_url.trim_end_matches('/'), CHAT_STREAM_PATH);
        let transport = Arc::new(HttpRelayTransport::new(endpoint));

        let session = ChatSession::new(transport, assistant_id)
            .with_format(self.format)
            .with_display_mode(self.display);

        Ok(match self.thread_id {
            Some(thread_id) => session.with_thread_id(thread_id),
            None => session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_relay_and_assistant() {
        let err = ChatBuilder::new().assistant_id("asst_1").build().err().unwrap();
        assert!(err.to_string().contains("relay URL"));

        let err = ChatBuilder::new()
            .relay_url("http://localhost:8000")
            .assistant_id("  ")
            .build()
            .err().unwrap();
        assert!(err.to_string().contains("assistant id"));
    }

    #[test]
    fn test_build_resumes_thread() {
        let chat = ChatBuilder::new()
            .relay_url("http://localhost:8000/")
            .assistant_id("asst_1")
            .thread_id("t_42")
            .build()
            .unwrap();

        assert_eq!(chat.assistant_id(), "asst_1");
        assert_eq!(chat.thread_id().as_deref(), Some("t_42"));
        assert!(!chat.is_loading());
    }
}

use anyhow::{Context, Result};
use counsel_types::UsageData;
use futures::{Stream, StreamExt};
use reqwest::Response;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::sse::{SseEvent, SseEventParser};

/// Boxed stream of run events, in provider order.
pub type RunEventStream = Pin<Box<dyn Stream<Item = Result<RunEvent>> + Send>>;

/// Run lifecycle events the relay acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    /// A new thread was created for this run
    ThreadCreated {
        thread_id: String,
    },

    /// Incremental assistant text
    MessageDelta {
        text: String,
    },

    /// The run finished successfully
    RunCompleted {
        #[serde(skip_serializing_if = "Option::is_none")]
        thread_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        usage: Option<RunUsage>,
    },

    /// The run ended without completing (failed, cancelled, expired, incomplete)
    RunFailed {
        status: String,
        message: String,
    },

    /// Provider signalled end of stream
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl From<RunUsage> for UsageData {
    fn from(usage: RunUsage) -> Self {
        UsageData {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

// ============================================================================
// PROVIDER WIRE TYPES (only the fields we read)
// ============================================================================

#[derive(Debug, Deserialize)]
struct ThreadObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageDeltaObject {
    delta: MessageDeltaBody,
}

#[derive(Debug, Deserialize)]
struct MessageDeltaBody {
    #[serde(default)]
    content: Vec<DeltaContent>,
}

#[derive(Debug, Deserialize)]
struct DeltaContent {
    #[serde(default)]
    index: u32,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<DeltaText>,
}

#[derive(Debug, Deserialize)]
struct DeltaText {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    #[serde(default)]
    thread_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    usage: Option<RunUsage>,
    #[serde(default)]
    last_error: Option<ErrorObject>,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Lifecycle events that carry nothing the relay needs.
const IGNORED_EVENTS: &[&str] = &[
    "thread.run.created",
    "thread.run.queued",
    "thread.run.in_progress",
    "thread.run.requires_action",
    "thread.run.cancelling",
    "thread.run.step.created",
    "thread.run.step.in_progress",
    "thread.run.step.delta",
    "thread.run.step.completed",
    "thread.run.step.failed",
    "thread.run.step.cancelled",
    "thread.run.step.expired",
    "thread.message.created",
    "thread.message.in_progress",
    "thread.message.completed",
    "thread.message.incomplete",
];

impl RunEvent {
    /// Map one SSE event to a run event.
    ///
    /// Returns `Ok(None)` for events the relay does not act on, including
    /// message deltas without text content.
    pub fn from_sse(event: &SseEvent) -> Result<Option<RunEvent>> {
        let parsed = match event.event.as_str() {
            "thread.created" => {
                let thread: ThreadObject = parse_data(event)?;
                Some(RunEvent::ThreadCreated { thread_id: thread.id })
            }
            "thread.message.delta" => {
                let delta: MessageDeltaObject = parse_data(event)?;
                let mut parts = delta.delta.content;
                parts.sort_by_key(|part| part.index);
                let text: String = parts
                    .into_iter()
                    .filter(|part| part.kind == "text")
                    .filter_map(|part| part.text.and_then(|t| t.value))
                    .collect();
                if text.is_empty() {
                    tracing::debug!("Message delta without text content");
                    None
                } else {
                    Some(RunEvent::MessageDelta { text })
                }
            }
            "thread.run.completed" => {
                let run: RunObject = parse_data(event)?;
                Some(RunEvent::RunCompleted {
                    thread_id: run.thread_id,
                    usage: run.usage,
                })
            }
            "thread.run.failed"
            | "thread.run.cancelled"
            | "thread.run.expired"
            | "thread.run.incomplete" => {
                let run: RunObject = parse_data(event)?;
                let status = run
                    .status
                    .unwrap_or_else(|| event.event.trim_start_matches("thread.run.").to_string());
                let message = run
                    .last_error
                    .map(|e| match (e.code, e.message) {
                        (Some(code), Some(message)) => format!("{code}: {message}"),
                        (None, Some(message)) => message,
                        (Some(code), None) => code,
                        (None, None) => "run did not complete".to_string(),
                    })
                    .unwrap_or_else(|| "run did not complete".to_string());
                Some(RunEvent::RunFailed { status, message })
            }
            "error" => {
                let err: ErrorObject = parse_data(event)?;
                anyhow::bail!(
                    "Provider stream error: {}",
                    err.message.unwrap_or_else(|| event.data.clone())
                );
            }
            "done" => Some(RunEvent::Done),
            name if IGNORED_EVENTS.contains(&name) => {
                tracing::trace!(event = name, "Skipping run lifecycle event");
                None
            }
            name => {
                tracing::debug!(event = name, "Unknown assistant stream event");
                None
            }
        };
        Ok(parsed)
    }
}

fn parse_data<T: serde::de::DeserializeOwned>(event: &SseEvent) -> Result<T> {
    serde_json::from_str(&event.data)
        .with_context(|| format!("Failed to parse `{}` event payload", event.event))
}

/// Turn a streamed run response into typed run events.
///
/// The stream ends after the provider's `done` event or when the body closes.
pub fn parse_run_sse_stream(response: Response) -> RunEventStream {
    let stream = response.bytes_stream();

    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut parser = SseEventParser::new();

        'read: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    let events = match parser.feed(&bytes) {
                        Ok(events) => events,
                        Err(e) => {
                            yield Err(e);
                            break 'read;
                        }
                    };

                    for sse in events {
                        match RunEvent::from_sse(&sse) {
                            Ok(Some(RunEvent::Done)) => {
                                yield Ok(RunEvent::Done);
                                break 'read;
                            }
                            Ok(Some(event)) => yield Ok(event),
                            Ok(None) => {}
                            Err(e) => {
                                yield Err(e);
                                break 'read;
                            }
                        }
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    break 'read;
                }
            }
        }

        match parser.finish() {
            Ok(Some(sse)) => match RunEvent::from_sse(&sse) {
                Ok(Some(event)) => yield Ok(event),
                Ok(None) => {}
                Err(e) => yield Err(e),
            },
            Ok(None) => {}
            Err(e) => yield Err(e),
        }
    })
}

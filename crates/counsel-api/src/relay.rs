//! Provider-to-caller pump for one streamed turn.
//!
//! The pump owns the provider's run event stream and writes encoded frames
//! into a bounded channel whose receiver is the HTTP response body. It writes
//! one frame per content delta, in event order, and at most one terminal.

use bytes::Bytes;
use counsel_llm::{RunEvent, RunEventStream};
use counsel_types::{Frame, RelayErrorKind, TerminalMetadata, WireFormat};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;

/// How a pumped turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpOutcome {
    /// Terminal metadata was written
    Completed,
    /// An error terminal was written (framed) or the stream was truncated (legacy)
    Aborted(RelayErrorKind),
    /// The caller went away; the provider stream was dropped
    Disconnected,
}

pub struct RelayPump {
    format: WireFormat,
    idle_timeout: Duration,
    /// Thread id of the request, for continued conversations
    request_thread_id: Option<String>,
}

impl RelayPump {
    pub fn new(format: WireFormat, idle_timeout: Duration) -> Self {
        Self {
            format,
            idle_timeout,
            request_thread_id: None,
        }
    }

    pub fn with_thread_id(mut self, thread_id: Option<String>) -> Self {
        self.request_thread_id = thread_id;
        self
    }

    pub async fn run(self, mut events: RunEventStream, tx: mpsc::Sender<Bytes>) -> PumpOutcome {
        let mut created_thread_id: Option<String> = None;
        let mut fragments = 0usize;

        let terminal = loop {
            let next = tokio::select! {
                biased;
                _ = tx.closed() => {
                    tracing::info!(fragments, "Caller disconnected; dropping provider stream");
                    return PumpOutcome::Disconnected;
                }
                next = tokio::time::timeout(self.idle_timeout, events.next()) => next,
            };

            let event = match next {
                Err(_) => {
                    tracing::warn!(
                        timeout_ms = self.idle_timeout.as_millis() as u64,
                        "No provider event within the idle timeout"
                    );
                    break Frame::error(
                        RelayErrorKind::Timeout,
                        format!(
                            "no provider event within {}ms",
                            self.idle_timeout.as_millis()
                        ),
                    );
                }
                Ok(None) => {
                    tracing::warn!("Provider stream closed before the run completed");
                    break Frame::error(
                        RelayErrorKind::Incomplete,
                        "provider stream ended before the run completed",
                    );
                }
                Ok(Some(Err(e))) => {
                    tracing::error!("Provider stream error: {:#}", e);
                    break Frame::error(RelayErrorKind::Provider, e.to_string());
                }
                Ok(Some(Ok(event))) => event,
            };

            match event {
                RunEvent::ThreadCreated { thread_id } => {
                    tracing::debug!(thread_id = %thread_id, "Thread created");
                    created_thread_id = Some(thread_id);
                }
                RunEvent::MessageDelta { text } => {
                    fragments += 1;
                    if !self.write(&tx, &Frame::fragment(text)).await {
                        tracing::info!(fragments, "Caller disconnected mid-stream");
                        return PumpOutcome::Disconnected;
                    }
                }
                RunEvent::RunCompleted { thread_id, usage } => {
                    let thread_id = created_thread_id
                        .take()
                        .or(thread_id)
                        .or_else(|| self.request_thread_id.clone());
                    tracing::info!(
                        fragments,
                        thread_id = thread_id.as_deref().unwrap_or_default(),
                        total_tokens = usage.map(|u| u.total_tokens).unwrap_or_default(),
                        "Run completed"
                    );
                    break Frame::done(TerminalMetadata::new(thread_id, usage.map(Into::into)));
                }
                RunEvent::RunFailed { status, message } => {
                    tracing::warn!(status = %status, message = %message, "Run did not complete");
                    break Frame::error(RelayErrorKind::Provider, format!("run {status}: {message}"));
                }
                RunEvent::Done => {
                    tracing::warn!("Provider finished without a completed run");
                    break Frame::error(
                        RelayErrorKind::Incomplete,
                        "provider finished without a completed run",
                    );
                }
            }
        };

        let outcome = match &terminal {
            Frame::Error { kind, .. } => PumpOutcome::Aborted(*kind),
            _ => PumpOutcome::Completed,
        };
        if !self.write(&tx, &terminal).await {
            return PumpOutcome::Disconnected;
        }
        outcome
    }

    /// Encode and send one frame. Returns false once the caller is gone.
    async fn write(&self, tx: &mpsc::Sender<Bytes>, frame: &Frame) -> bool {
        match self.format.encode(frame) {
            Ok(Some(bytes)) => tx.send(bytes).await.is_ok(),
            Ok(None) => true,
            Err(e) => {
                tracing::error!("Failed to encode frame: {}", e);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counsel_llm::RunUsage;

    fn events(items: Vec<anyhow::Result<RunEvent>>) -> RunEventStream {
        futures::stream::iter(items).boxed()
    }

    async fn drain(mut rx: mpsc::Receiver<Bytes>) -> String {
        let mut body = Vec::new();
        while let Some(chunk) = rx.recv().await {
            body.extend_from_slice(&chunk);
        }
        String::from_utf8(body).unwrap()
    }

    fn delta(text: &str) -> anyhow::Result<RunEvent> {
        Ok(RunEvent::MessageDelta { text: text.into() })
    }

    #[tokio::test]
    async fn test_thread_id_prefers_created_thread() {
        let (tx, rx) = mpsc::channel(8);
        let pump = RelayPump::new(WireFormat::Ndjson, Duration::from_secs(1));

        let outcome = pump
            .run(
                events(vec![
                    Ok(RunEvent::ThreadCreated {
                        thread_id: "t_new".into(),
                    }),
                    delta("Oi"),
                    Ok(RunEvent::RunCompleted {
                        thread_id: Some("t_run".into()),
                        usage: Some(RunUsage {
                            prompt_tokens: 1,
                            completion_tokens: 2,
                            total_tokens: 3,
                        }),
                    }),
                ]),
                tx,
            )
            .await;

        assert_eq!(outcome, PumpOutcome::Completed);
        let body = drain(rx).await;
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], r#"{"type":"fragment","text":"Oi"}"#);
        assert_eq!(
            lines[1],
            r#"{"type":"done","meta":{"threadId":"t_new","usageData":{"prompt_tokens":1,"completion_tokens":2,"total_tokens":3}}}"#
        );
    }

    #[tokio::test]
    async fn test_continuation_falls_back_to_request_thread() {
        let (tx, rx) = mpsc::channel(8);
        let pump = RelayPump::new(WireFormat::Legacy, Duration::from_secs(1))
            .with_thread_id(Some("t_req".into()));

        pump.run(
            events(vec![
                delta("Ok"),
                Ok(RunEvent::RunCompleted {
                    thread_id: None,
                    usage: None,
                }),
            ]),
            tx,
        )
        .await;

        assert_eq!(
            drain(rx).await,
            "Ok\n[EXTRA_DATA]: {\"response\":{\"threadId\":\"t_req\",\"usageData\":null}}"
        );
    }

    #[tokio::test]
    async fn test_at_most_one_terminal() {
        let (tx, rx) = mpsc::channel(8);
        let pump = RelayPump::new(WireFormat::Ndjson, Duration::from_secs(1));

        pump.run(
            events(vec![
                Ok(RunEvent::RunCompleted {
                    thread_id: Some("t_1".into()),
                    usage: None,
                }),
                delta("late"),
                Ok(RunEvent::Done),
            ]),
            tx,
        )
        .await;

        let body = drain(rx).await;
        assert_eq!(body.lines().count(), 1);
        assert!(body.contains("\"type\":\"done\""));
    }

    #[tokio::test]
    async fn test_idle_timeout_writes_timeout_error() {
        let (tx, rx) = mpsc::channel(8);
        let pump = RelayPump::new(WireFormat::Ndjson, Duration::from_millis(20));
        let stream = futures::stream::iter(vec![delta("par")])
            .chain(futures::stream::pending())
            .boxed();

        let outcome = pump.run(stream, tx).await;

        assert_eq!(outcome, PumpOutcome::Aborted(RelayErrorKind::Timeout));
        let body = drain(rx).await;
        let last = body.lines().last().unwrap();
        assert!(last.starts_with(r#"{"type":"error","kind":"timeout""#), "{last}");
    }

    #[tokio::test]
    async fn test_legacy_error_truncates() {
        let (tx, rx) = mpsc::channel(8);
        let pump = RelayPump::new(WireFormat::Legacy, Duration::from_secs(1));

        let outcome = pump
            .run(
                events(vec![delta("cort"), Err(anyhow::anyhow!("connection reset"))]),
                tx,
            )
            .await;

        assert_eq!(outcome, PumpOutcome::Aborted(RelayErrorKind::Provider));
        assert_eq!(drain(rx).await, "cort");
    }

    #[tokio::test]
    async fn test_disconnect_drops_provider_stream() {
        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let pump = RelayPump::new(WireFormat::Ndjson, Duration::from_secs(30));
        let stream = futures::stream::pending::<anyhow::Result<RunEvent>>().boxed();

        let outcome = tokio::time::timeout(Duration::from_secs(1), pump.run(stream, tx))
            .await
            .expect("pump notices the closed channel");

        assert_eq!(outcome, PumpOutcome::Disconnected);
    }
}

use counsel_types::{Frame, RelayErrorKind, Transcript, TurnRequest, UsageData, WireFormat};
use futures::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, ClientResult};
use crate::transport::{ByteStream, RelayTransport};

/// How assistant text reaches the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Every fragment is published as it arrives
    #[default]
    Streaming,
    /// Fragments are collected and published once the stream ends
    Buffered,
}

/// Observable state of a chat session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub transcript: Transcript,
    pub thread_id: Option<String>,
    pub loading: bool,
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing was sent
    Ignored,
    /// The relay wrote its terminal metadata
    Completed {
        thread_id: Option<String>,
        usage: Option<UsageData>,
    },
    /// The relay aborted the turn with an error frame
    Failed { kind: RelayErrorKind, message: String },
    /// The stream closed without a terminal frame
    Incomplete,
    /// `ChatSession::cancel` was called while the turn was in flight
    Cancelled,
}

/// Client-side conversation with one assistant.
///
/// Holds the transcript and the conversation's thread id, and drives one turn
/// at a time against the relay. Observers follow state changes through
/// [`ChatSession::subscribe`]; in streaming mode one snapshot is published per
/// fragment.
pub struct ChatSession {
    transport: Arc<dyn RelayTransport>,
    assistant_id: String,
    format: WireFormat,
    display: DisplayMode,
    state: watch::Sender<SessionSnapshot>,
    in_flight: Mutex<Option<CancellationToken>>,
}

impl ChatSession {
    pub fn new(transport: Arc<dyn RelayTransport>, assistant_id: impl Into<String>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            transport,
            assistant_id: assistant_id.into(),
            format: WireFormat::default(),
            display: DisplayMode::default(),
            state,
            in_flight: Mutex::new(None),
        }
    }

    pub fn with_format(mut self, format: WireFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_display_mode(mut self, display: DisplayMode) -> Self {
        self.display = display;
        self
    }

    /// Resume an existing conversation
    pub fn with_thread_id(self, thread_id: impl Into<String>) -> Self {
        let thread_id = thread_id.into();
        self.state.send_modify(|s| s.thread_id = Some(thread_id));
        self
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn transcript(&self) -> Transcript {
        self.state.borrow().transcript.clone()
    }

    pub fn thread_id(&self) -> Option<String> {
        self.state.borrow().thread_id.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Send one user message and stream the reply into the transcript.
    ///
    /// Blank input is ignored. A second call while a turn is in flight fails
    /// with [`ClientError::TurnInFlight`]. On errors the transcript keeps
    /// whatever was applied so far; loading is cleared on every path.
    pub async fn send(&self, text: &str) -> ClientResult<TurnOutcome> {
        let message = text.trim();
        if message.is_empty() {
            tracing::debug!("Ignoring blank chat input");
            return Ok(TurnOutcome::Ignored);
        }

        let token = CancellationToken::new();
        let mut thread_id = None;
        let started = self.state.send_if_modified(|s| {
            if s.loading {
                return false;
            }
            *self.lock_in_flight() = Some(token.clone());
            thread_id = s.thread_id.clone();
            s.transcript.begin_turn(message);
            s.loading = true;
            true
        });
        if !started {
            return Err(ClientError::TurnInFlight);
        }
        let _guard = TurnGuard { session: self };

        let mut request = TurnRequest::new(&self.assistant_id, message);
        if let Some(id) = thread_id {
            request = request.with_thread(id);
        }

        tracing::debug!(
            assistant_id = %self.assistant_id,
            continuation = request.is_continuation(),
            format = self.format.as_str(),
            "Starting chat turn"
        );

        let result = self.run_turn(&request, &token).await;
        match &result {
            Ok(outcome) => tracing::debug!(?outcome, "Chat turn finished"),
            Err(e) => tracing::error!(error = %e, "Chat turn failed"),
        }
        result
    }

    /// Cancel the in-flight turn, if any. Returns false when idle.
    pub fn cancel(&self) -> bool {
        match self.lock_in_flight().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Start over: clear the transcript and forget the thread id.
    pub fn reset(&self) -> ClientResult<()> {
        let reset = self.state.send_if_modified(|s| {
            if s.loading {
                return false;
            }
            *s = SessionSnapshot::default();
            true
        });
        if reset {
            Ok(())
        } else {
            Err(ClientError::TurnInFlight)
        }
    }

    async fn run_turn(
        &self,
        request: &TurnRequest,
        token: &CancellationToken,
    ) -> ClientResult<TurnOutcome> {
        let mut body: ByteStream = tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(TurnOutcome::Cancelled),
            opened = self.transport.open_turn(request, self.format) => opened?,
        };

        let mut decoder = self.format.decoder();
        let mut reader = TurnReader::default();

        loop {
            let chunk = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    self.flush(&mut reader, false);
                    return Ok(TurnOutcome::Cancelled);
                }
                chunk = body.next() => chunk,
            };

            match chunk {
                Some(chunk) => {
                    let frames = decoder.push(&chunk?)?;
                    self.apply(&mut reader, frames);
                }
                None => break,
            }
        }

        let frames = decoder.finish()?;
        self.apply(&mut reader, frames);
        self.flush(&mut reader, true);

        Ok(self.conclude(request, reader.terminal))
    }

    fn apply(&self, reader: &mut TurnReader, frames: Vec<Frame>) {
        for frame in frames {
            match frame {
                Frame::Fragment { text } => match self.display {
                    DisplayMode::Streaming => {
                        let first = !std::mem::replace(&mut reader.seen_fragment, true);
                        self.state.send_modify(|s| {
                            s.transcript.apply_fragment(&text, first);
                        });
                    }
                    DisplayMode::Buffered => {
                        reader.seen_fragment = true;
                        reader.buffer.push_str(&text);
                    }
                },
                terminal => reader.terminal = Some(terminal),
            }
        }
    }

    /// Publish the buffered reply. At stream end the placeholder is always
    /// replaced, even by empty text; a cancelled turn keeps it unless text arrived.
    fn flush(&self, reader: &mut TurnReader, stream_ended: bool) {
        if self.display == DisplayMode::Buffered && (stream_ended || reader.seen_fragment) {
            let content = std::mem::take(&mut reader.buffer);
            self.state.send_modify(|s| {
                s.transcript.replace_last_assistant(content);
            });
        }
    }

    fn conclude(&self, request: &TurnRequest, terminal: Option<Frame>) -> TurnOutcome {
        match terminal {
            Some(Frame::Done { meta }) => {
                if !request.is_continuation() {
                    if let Some(id) = meta.thread_id.clone().filter(|id| !id.trim().is_empty()) {
                        self.state.send_modify(|s| s.thread_id = Some(id));
                    }
                }
                TurnOutcome::Completed {
                    thread_id: meta.thread_id,
                    usage: meta.usage_data,
                }
            }
            Some(Frame::Error { kind, message }) => {
                tracing::warn!(%kind, %message, "Relay aborted the turn");
                TurnOutcome::Failed { kind, message }
            }
            Some(Frame::Fragment { .. }) | None => {
                tracing::warn!("Relay stream ended without terminal metadata");
                TurnOutcome::Incomplete
            }
        }
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Default)]
struct TurnReader {
    seen_fragment: bool,
    buffer: String,
    terminal: Option<Frame>,
}

/// Clears the in-flight marker and the loading flag however the turn ends.
struct TurnGuard<'a> {
    session: &'a ChatSession,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.session.lock_in_flight().take();
        self.session.state.send_modify(|s| s.loading = false);
    }
}

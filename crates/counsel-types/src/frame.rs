use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::codec::{FrameDecoder, SentinelDecoder, StreamDecoder, EXTRA_DATA_SENTINEL};
use crate::error::{ProtocolError, Result};
use crate::metadata::{LegacyEnvelope, TerminalMetadata};

/// One message of the relay's framed stream.
///
/// A well-formed stream is `Fragment*` followed by exactly one `Done` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    /// Incremental piece of the assistant's reply
    Fragment { text: String },

    /// Turn completed; carries usage and the conversation id
    Done { meta: TerminalMetadata },

    /// Turn aborted by the relay
    Error { kind: RelayErrorKind, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayErrorKind {
    /// The provider failed mid-stream
    Provider,
    /// No provider event arrived within the idle timeout
    Timeout,
    /// The provider stream closed before the run completed
    Incomplete,
}

impl Frame {
    pub fn fragment(text: impl Into<String>) -> Self {
        Frame::Fragment { text: text.into() }
    }

    pub fn done(meta: TerminalMetadata) -> Self {
        Frame::Done { meta }
    }

    pub fn error(kind: RelayErrorKind, message: impl Into<String>) -> Self {
        Frame::Error {
            kind,
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Frame::Done { .. } | Frame::Error { .. })
    }

    /// Serialize as one NDJSON line (trailing `\n` included).
    pub fn to_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self).map_err(ProtocolError::Encode)?;
        line.push('\n');
        Ok(line)
    }
}

impl fmt::Display for RelayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelayErrorKind::Provider => "provider",
            RelayErrorKind::Timeout => "timeout",
            RelayErrorKind::Incomplete => "incomplete",
        };
        f.write_str(s)
    }
}

/// Body encoding of the relay's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Newline-delimited JSON envelopes (`Frame`)
    #[default]
    Ndjson,
    /// Raw text followed by a `\n[EXTRA_DATA]: ` trailer
    Legacy,
}

impl WireFormat {
    /// Name used in the `format` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            WireFormat::Ndjson => "ndjson",
            WireFormat::Legacy => "legacy",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            WireFormat::Ndjson => "application/x-ndjson",
            WireFormat::Legacy => "text/plain; charset=utf-8",
        }
    }

    /// Encode a frame for this format.
    ///
    /// Returns `None` when the format has no representation for the frame:
    /// the legacy format signals errors by truncating the stream.
    pub fn encode(&self, frame: &Frame) -> Result<Option<Bytes>> {
        match self {
            WireFormat::Ndjson => Ok(Some(Bytes::from(frame.to_line()?))),
            WireFormat::Legacy => match frame {
                Frame::Fragment { text } => Ok(Some(Bytes::from(text.clone()))),
                Frame::Done { meta } => {
                    let envelope = LegacyEnvelope {
                        response: Some(meta.clone()),
                    };
                    let json = serde_json::to_string(&envelope).map_err(ProtocolError::Encode)?;
                    Ok(Some(Bytes::from(format!("{EXTRA_DATA_SENTINEL}{json}"))))
                }
                Frame::Error { .. } => Ok(None),
            },
        }
    }

    /// Fresh incremental decoder for this format.
    pub fn decoder(&self) -> Box<dyn StreamDecoder> {
        match self {
            WireFormat::Ndjson => Box::new(FrameDecoder::new()),
            WireFormat::Legacy => Box::new(SentinelDecoder::new()),
        }
    }
}

impl FromStr for WireFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ndjson" => Ok(WireFormat::Ndjson),
            "legacy" | "sentinel" => Ok(WireFormat::Legacy),
            other => Err(format!("unknown wire format: {other}")),
        }
    }
}

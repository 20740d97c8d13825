use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid UTF-8 in stream: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Malformed frame: {0}")]
    MalformedFrame(#[source] serde_json::Error),

    #[error("Malformed terminal metadata: {0}")]
    MalformedMetadata(#[source] serde_json::Error),

    #[error("Frame encoding failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Data received after terminal frame")]
    TrailingData,
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

use counsel_types::ProtocolError;
use thiserror::Error;

/// Errors raised while driving a chat turn.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("A turn is already in flight")]
    TurnInFlight,

    #[error("Relay rejected the turn ({status}): {body}")]
    Relay { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Stream decode error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

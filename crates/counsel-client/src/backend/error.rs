use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    /// Session missing or rejected; the caller should sign in again
    #[error("Not signed in or session expired")]
    Unauthorized,

    #[error("Backend error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected backend response: {0}")]
    InvalidResponse(String),

    #[error("Receipt is not valid base64: {0}")]
    InvalidReceipt(#[from] base64::DecodeError),
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

use async_trait::async_trait;
use bytes::Bytes;
use counsel_types::{TurnRequest, WireFormat};
use futures::{Stream, StreamExt, TryStreamExt};
use std::pin::Pin;

use crate::error::{ClientError, ClientResult};

/// Raw response body of a relay turn, chunked as it arrives.
pub type ByteStream = Pin<Box<dyn Stream<Item = ClientResult<Bytes>> + Send>>;

/// How a session reaches the relay.
///
/// Implementations resolve once the relay accepted the turn (2xx) and hand
/// back the body without reading it.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn open_turn(&self, request: &TurnRequest, format: WireFormat) -> ClientResult<ByteStream>;
}

/// Relay transport over HTTP.
pub struct HttpRelayTransport {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpRelayTransport {
    /// `endpoint` is the full stream URL, e.g. `http://localhost:8000/api/chat/stream`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(http_client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn open_turn(&self, request: &TurnRequest, format: WireFormat) -> ClientResult<ByteStream> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("format", format.as_str())])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Relay {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes_stream().map_err(ClientError::from);
        Ok(body.boxed())
    }
}

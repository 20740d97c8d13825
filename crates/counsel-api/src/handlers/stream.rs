use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use counsel_llm::{MessageInput, RunEventStream, RunRequest};
use counsel_types::{TurnRequest, WireFormat};
use futures::StreamExt;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    relay::RelayPump,
    state::AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StreamQuery {
    /// Response body encoding: `ndjson` or `legacy`
    pub format: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatStreamRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub assistant_id: String,
    /// Continue this conversation; absent to start a new one
    #[serde(default)]
    pub thread_id: Option<String>,
}

impl From<ChatStreamRequest> for TurnRequest {
    fn from(req: ChatStreamRequest) -> Self {
        TurnRequest {
            assistant_id: req.assistant_id,
            message: req.message,
            thread_id: req.thread_id,
        }
    }
}

/// Relay one conversation turn as a live stream
///
/// Continues the conversation when `threadId` is present, otherwise starts a
/// new one. The body carries one frame per provider delta and a single
/// terminal frame.
#[utoipa::path(
    post,
    path = "/api/chat/stream",
    params(StreamQuery),
    request_body = ChatStreamRequest,
    responses(
        (status = 200, description = "Fragment stream", content_type = "application/x-ndjson"),
        (status = 400, description = "Empty message, missing assistant or unknown format"),
        (status = 502, description = "Provider call failed before streaming")
    ),
    tag = "chat"
)]
pub async fn chat_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StreamQuery>,
    Json(req): Json<ChatStreamRequest>,
) -> ApiResult<Response> {
    relay_turn(state, req.into(), &query).await
}

/// Start a new conversation; any `threadId` is ignored
#[utoipa::path(
    post,
    path = "/api/new-thread/stream",
    params(StreamQuery),
    request_body = ChatStreamRequest,
    responses(
        (status = 200, description = "Fragment stream", content_type = "application/x-ndjson"),
        (status = 400, description = "Empty message, missing assistant or unknown format"),
        (status = 502, description = "Provider call failed before streaming")
    ),
    tag = "chat"
)]
pub async fn new_thread_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StreamQuery>,
    Json(req): Json<ChatStreamRequest>,
) -> ApiResult<Response> {
    let mut turn: TurnRequest = req.into();
    turn.thread_id = None;
    relay_turn(state, turn, &query).await
}

/// Continue an existing conversation; `threadId` is required
#[utoipa::path(
    post,
    path = "/api/current-thread/stream",
    params(StreamQuery),
    request_body = ChatStreamRequest,
    responses(
        (status = 200, description = "Fragment stream", content_type = "application/x-ndjson"),
        (status = 400, description = "Missing threadId, empty message or unknown format"),
        (status = 502, description = "Provider call failed before streaming")
    ),
    tag = "chat"
)]
pub async fn current_thread_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StreamQuery>,
    Json(req): Json<ChatStreamRequest>,
) -> ApiResult<Response> {
    let turn: TurnRequest = req.into();
    if !turn.is_continuation() {
        return Err(ApiError::BadRequest("threadId is required".to_string()));
    }
    relay_turn(state, turn, &query).await
}

async fn relay_turn(
    state: Arc<AppState>,
    turn: TurnRequest,
    query: &StreamQuery,
) -> ApiResult<Response> {
    let format = match query.format.as_deref() {
        Some(format) => format.parse::<WireFormat>().map_err(ApiError::BadRequest)?,
        None => state.config.relay.wire_format,
    };
    let message = turn
        .trimmed_message()
        .ok_or_else(|| ApiError::BadRequest("message must not be empty".to_string()))?
        .to_string();
    let assistant_id = turn.assistant_id.trim();
    if assistant_id.is_empty() {
        return Err(ApiError::BadRequest("assistantId is required".to_string()));
    }
    let thread_id = turn
        .is_continuation()
        .then(|| turn.thread_id.clone())
        .flatten();

    let span = tracing::info_span!(
        "relay_turn",
        turn_id = %Uuid::new_v4(),
        assistant_id = %assistant_id,
        format = format.as_str(),
        continuation = thread_id.is_some(),
    );

    let mut run = RunRequest::new(assistant_id);
    if let Some(instructions) = &state.config.relay.additional_instructions {
        run = run.additional_instructions(instructions.clone());
    }

    let events = open_run(&state, run, thread_id.as_deref(), message)
        .instrument(span.clone())
        .await?;

    let (tx, rx) = mpsc::channel(state.config.relay.channel_capacity.max(1));
    let pump = RelayPump::new(format, state.config.relay.idle_timeout()).with_thread_id(thread_id);
    tokio::spawn(
        async move {
            let outcome = pump.run(events, tx).await;
            tracing::debug!(?outcome, "Relay turn finished");
        }
        .instrument(span),
    );

    let body = Body::from_stream(ReceiverStream::new(rx).map(Ok::<_, Infallible>));

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type()),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response())
}

/// Issue the provider calls for the turn's shape and return the run's events.
async fn open_run(
    state: &AppState,
    run: RunRequest,
    thread_id: Option<&str>,
    message: String,
) -> ApiResult<RunEventStream> {
    let events = match thread_id {
        Some(thread_id) => {
            tracing::info!(thread_id, "Continuing conversation");
            state.assistant.create_message(thread_id, &message).await?;
            state.assistant.create_run_stream(thread_id, run).await?
        }
        None => {
            tracing::info!("Starting new conversation");
            state
                .assistant
                .create_thread_and_run_stream(run, vec![MessageInput::user(message)])
                .await?
        }
    };
    Ok(events)
}

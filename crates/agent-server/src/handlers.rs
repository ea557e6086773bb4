//! HTTP/WebSocket Handlers

use axum::{
    Json,
    extract::{Path, Query, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::Response,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};

use agent_core::{
    AgentError, CancellationToken, ThreadId, ToolSchema,
    message::Message as ChatMessage,
    session::ThreadSummary,
};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model_connected: bool,
    pub lookup_connected: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub thread_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ListThreadsQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

const fn default_limit() -> usize {
    50
}

#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    pub thread_id: String,
    pub messages: Vec<ChatMessage>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

/// HTTP status for a failed turn
const fn status_for(error: &AgentError) -> StatusCode {
    match error {
        AgentError::ModelUnavailable(_) => StatusCode::BAD_GATEWAY,
        AgentError::LoopExceeded(_) => StatusCode::LOOP_DETECTED,
        AgentError::Cancelled => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn agent_error(error: &AgentError) -> ApiError {
    api_error(status_for(error), error.code(), error.user_message())
}

fn thread_for(requested: Option<String>) -> ThreadId {
    requested
        .filter(|id| !id.trim().is_empty())
        .map_or_else(ThreadId::generate, ThreadId::from_string)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (model, lookup) = tokio::join!(
        state.agent.provider().health_check(),
        state.lookup.health_check(),
    );
    let model_connected = model.unwrap_or(false);

    Json(HealthResponse {
        status: if model_connected && lookup { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        model_connected,
        lookup_connected: lookup,
    })
}

/// Tool catalogue, in registration order
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolSchema>> {
    Json(state.agent.tools().schemas())
}

/// Main chat endpoint (non-streaming)
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "EMPTY_MESSAGE", "Message must not be empty"));
    }

    let thread = thread_for(payload.thread_id);

    let answer = state.agent.run(&thread, &payload.message).await.map_err(|e| {
        tracing::error!(thread = %thread, "Agent error: {}", e);
        agent_error(&e)
    })?;

    Ok(Json(ChatResponse {
        message: answer,
        thread_id: thread.to_string(),
    }))
}

/// WebSocket streaming chat
pub async fn chat_stream_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_stream(socket, state))
}

async fn handle_stream(socket: WebSocket, state: AppState) {
    let (sender, receiver) = socket.split();
    serve_stream(sender, receiver, state).await;
}

/// Run one turn per text frame, streaming its events back.
///
/// The client side is watched while a turn runs: a close or a dropped
/// connection cancels the turn, and a message sent mid-turn is refused.
async fn serve_stream<S, R>(mut sender: S, mut receiver: R, state: AppState)
where
    S: Sink<Message> + Unpin,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
            _ => continue,
        };

        let request: ChatRequest = match serde_json::from_str(&msg) {
            Ok(r) => r,
            Err(e) => {
                if send_frame(&mut sender, &error_frame(e.to_string(), "INVALID_REQUEST")).await.is_err() {
                    break;
                }
                continue;
            }
        };
        if request.message.trim().is_empty() {
            if send_frame(&mut sender, &error_frame("Message must not be empty", "EMPTY_MESSAGE"))
                .await
                .is_err()
            {
                break;
            }
            continue;
        }

        let thread = thread_for(request.thread_id);
        let cancel = CancellationToken::new();
        let mut events = state.agent.stream(thread.clone(), request.message, cancel.clone());

        let connected = loop {
            tokio::select! {
                event = events.next() => {
                    let Some(event) = event else { break true };
                    let frame = match event {
                        Ok(event) => serde_json::to_value(&event)
                            .unwrap_or_else(|e| error_frame(e.to_string(), "JSON_ERROR")),
                        Err(e) => error_frame(e.user_message(), e.code()),
                    };
                    if send_frame(&mut sender, &frame).await.is_err() {
                        break false;
                    }
                }
                incoming = receiver.next() => match incoming {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break false,
                    Some(Ok(Message::Text(_))) => {
                        let busy = error_frame("A turn is already running on this connection", "TURN_IN_PROGRESS");
                        if send_frame(&mut sender, &busy).await.is_err() {
                            break false;
                        }
                    }
                    Some(Ok(_)) => {}
                },
            }
        };
        drop(events);

        if !connected {
            tracing::debug!(thread = %thread, "Client left mid-turn, cancelling");
            cancel.cancel();
            break;
        }
        let done = serde_json::json!({"type": "done", "thread_id": thread.as_str()});
        if send_frame(&mut sender, &done).await.is_err() {
            break;
        }
    }
}

fn error_frame(error: impl Into<String>, code: &str) -> serde_json::Value {
    serde_json::json!({"type": "error", "error": error.into(), "code": code})
}

async fn send_frame<S: Sink<Message> + Unpin>(
    sender: &mut S,
    frame: &serde_json::Value,
) -> Result<(), S::Error> {
    sender.send(Message::Text(frame.to_string().into())).await
}

/// Stored threads, most recently updated first
pub async fn list_threads(
    State(state): State<AppState>,
    Query(query): Query<ListThreadsQuery>,
) -> Result<Json<Vec<ThreadSummary>>, ApiError> {
    state
        .agent
        .store()
        .list(query.limit)
        .map(Json)
        .map_err(|e| agent_error(&e))
}

/// Full history of one thread
pub async fn get_thread(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ThreadResponse>, ApiError> {
    let thread = ThreadId::from_string(id);
    let store = state.agent.store();

    if store.summary(&thread).map_err(|e| agent_error(&e))?.is_none() {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            "THREAD_NOT_FOUND",
            format!("No thread '{thread}'"),
        ));
    }

    let messages = store.load(&thread).map_err(|e| agent_error(&e))?;
    Ok(Json(ThreadResponse {
        thread_id: thread.to_string(),
        messages,
    }))
}

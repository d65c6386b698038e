//! HTTP routes.
//!
//! Every chat endpoint streams its answer as server-sent events. Pipeline
//! failures never break the HTTP exchange: an error before streaming starts
//! or mid-stream is delivered as a terminal `error` event.

use axum::extract::{Path, Query as QueryParams, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::Router;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use std::pin::Pin;
use tracing::{debug, warn};

use wavesearch_core::TextStream;

use crate::state::AppState;

type EventStream = Pin<Box<dyn Stream<Item = std::result::Result<Event, Infallible>> + Send>>;

/// Conversation used when a request does not name one.
const DEFAULT_CHAT_ID: &str = "ai";

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", get(chat))
        .route("/chatMemory/memory", get(chat))
        .route("/chatMemory/{chatId}", delete(clear_memory))
        .route("/search", get(search))
        .route("/web/search", get(web_search))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ChatParams {
    prompt: String,
    #[serde(rename = "chatId")]
    chat_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    #[serde(rename = "chatId")]
    chat_id: Option<String>,
}

/// `GET /chat?prompt=&chatId=` - memory-backed chat.
async fn chat(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ChatParams>,
) -> Response {
    debug!("chat request: {:?}", params);
    stream_answer(&state, &params.prompt, params.chat_id.as_deref()).await
}

/// `GET /search?query=` - one-shot answer without conversation memory.
async fn search(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<SearchParams>,
) -> Response {
    debug!("search request: {:?}", params);
    stream_answer(&state, &params.query, None).await
}

/// `GET /web/search?query=&chatId=` - the full web-search pipeline.
///
/// An omitted `chatId` falls back to the shared "ai" conversation, so the
/// endpoint is always memory-backed.
async fn web_search(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<SearchParams>,
) -> Response {
    debug!("web search request: {:?}", params);
    if params.query.trim().is_empty() {
        return single_event("invalid query");
    }
    let chat_id = params.chat_id.as_deref().unwrap_or(DEFAULT_CHAT_ID);
    stream_answer(&state, &params.query, Some(chat_id)).await
}

/// `DELETE /chatMemory/{chatId}` - drop one conversation's history.
async fn clear_memory(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> StatusCode {
    match state.memory.clear(&chat_id).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => {
            warn!("Failed to clear conversation {chat_id}: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn stream_answer(
    state: &AppState,
    prompt: &str,
    conversation_id: Option<&str>,
) -> Response {
    match state.engine.chat_stream(prompt, conversation_id).await {
        Ok(stream) => sse_from_text(stream),
        Err(e) => {
            warn!("Chat pipeline failed before streaming: {e}");
            error_event(&e.to_string())
        }
    }
}

/// Adapt a text stream to SSE. A stream error becomes a terminal `error`
/// event instead of aborting the response body.
fn sse_from_text(stream: TextStream) -> Response {
    let events = futures::stream::unfold(Some(stream), |state| async move {
        let mut stream = state?;
        match stream.next().await {
            Some(Ok(chunk)) => Some((Ok(Event::default().data(chunk)), Some(stream))),
            Some(Err(e)) => {
                warn!("Stream failed mid-response: {e}");
                Some((Ok(Event::default().event("error").data(e.to_string())), None))
            }
            None => None,
        }
    });
    Sse::new(Box::pin(events) as EventStream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn single_event(message: &str) -> Response {
    let event = Event::default().data(message.to_string());
    Sse::new(Box::pin(futures::stream::iter(vec![Ok(event)])) as EventStream).into_response()
}

fn error_event(message: &str) -> Response {
    let event = Event::default().event("error").data(message.to_string());
    Sse::new(Box::pin(futures::stream::iter(vec![Ok(event)])) as EventStream).into_response()
}

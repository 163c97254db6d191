use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::directory::Server;
use crate::engine::events::MessageInfo;
use crate::engine::grouping::should_group_with_previous;
use crate::engine::roster::Participant;

use super::app_state::AppState;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

fn not_found(error: String) -> ApiError {
    (StatusCode::NOT_FOUND, Json(ErrorResponse { error }))
}

// ── Directory & roster ──────────────────────────────────────────

pub async fn list_servers(State(state): State<Arc<AppState>>) -> Json<Vec<Server>> {
    Json(state.engine.directory().servers().to_vec())
}

pub async fn list_participants(State(state): State<Arc<AppState>>) -> Json<Vec<Participant>> {
    let participants = state
        .engine
        .roster()
        .all()
        .iter()
        .map(|p| (**p).clone())
        .collect();
    Json(participants)
}

// ── Messages ────────────────────────────────────────────────────

/// A message as rendered in a channel listing, annotated with whether it
/// visually continues the previous entry.
#[derive(Serialize)]
pub struct RenderedMessage {
    #[serde(flatten)]
    pub message: MessageInfo,
    pub grouped_with_previous: bool,
}

pub async fn get_channel_messages(
    Path(channel_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RenderedMessage>>, ApiError> {
    if state.engine.directory().find_channel(&channel_id).is_none() {
        return Err(not_found(format!("No such channel: {channel_id}")));
    }

    let messages = state.engine.messages(&channel_id);
    let rendered = messages
        .iter()
        .enumerate()
        .map(|(i, msg)| RenderedMessage {
            message: MessageInfo::from_message(msg),
            grouped_with_previous: i > 0 && should_group_with_previous(msg, &messages[i - 1]),
        })
        .collect();

    Ok(Json(rendered))
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub content: String,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub id: Uuid,
}

pub async fn submit_message(
    Path(channel_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let id = state
        .engine
        .submit(&channel_id, &request.content)
        .map_err(bad_request)?;
    Ok((StatusCode::CREATED, Json(SubmitResponse { id })))
}

// ── Typing indicator ────────────────────────────────────────────

#[derive(Serialize)]
pub struct TypingResponse {
    pub typing: bool,
}

pub async fn get_typing(
    Path(channel_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<TypingResponse> {
    Json(TypingResponse {
        typing: state.engine.is_typing(&channel_id),
    })
}

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation;
use super::{ApiError, AppState, ConversationDto, MessageDto};
use crate::db::ConversationOutcome;
use crate::entities::conversations;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartConversationPayload {
    pub recipient_id: i32,
}

#[derive(Deserialize)]
pub struct SendMessagePayload {
    pub content: String,
}

fn is_participant(conversation: &conversations::Model, user_id: i32) -> bool {
    conversation.user_a == user_id || conversation.user_b == user_id
}

/// GET /messages/conversations
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<ConversationDto>>, ApiError> {
    let conversations = state.store.list_conversations(current.id).await?;

    Ok(Json(
        conversations.into_iter().map(ConversationDto::from).collect(),
    ))
}

/// POST /messages/conversations
/// Returns the existing conversation with the recipient if there is
/// one, otherwise creates it.
pub async fn start_conversation(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<StartConversationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let recipient_id = validation::validate_id(payload.recipient_id, "user")?;

    if recipient_id == current.id {
        return Err(ApiError::validation(
            "Cannot start a conversation with yourself",
        ));
    }

    state
        .store
        .get_user(recipient_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", recipient_id))?;

    match state
        .store
        .find_or_create_conversation(current.id, recipient_id)
        .await?
    {
        ConversationOutcome::Created(model) => {
            Ok((StatusCode::CREATED, Json(ConversationDto::from(model))))
        }
        ConversationOutcome::Existing(model) => {
            Ok((StatusCode::OK, Json(ConversationDto::from(model))))
        }
    }
}

/// GET /messages/conversations/{id}
/// Participants only.
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let id = validation::validate_id(id, "conversation")?;

    let conversation = state
        .store
        .get_conversation(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Conversation", id))?;

    if !is_participant(&conversation, current.id) {
        return Err(ApiError::forbidden(
            "You are not a participant in this conversation",
        ));
    }

    let messages = state.store.list_messages(id).await?;

    Ok(Json(messages.into_iter().map(MessageDto::from).collect()))
}

/// POST /messages/conversations/{id}
/// Participants only.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let id = validation::validate_id(id, "conversation")?;
    let content = validation::validate_content(&payload.content)?;

    let conversation = state
        .store
        .get_conversation(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Conversation", id))?;

    if !is_participant(&conversation, current.id) {
        return Err(ApiError::forbidden(
            "You are not a participant in this conversation",
        ));
    }

    let message = state.store.send_message(id, current.id, content).await?;

    Ok((StatusCode::CREATED, Json(MessageDto::from(message))))
}

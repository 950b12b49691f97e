// handlers/data/messages.rs - /api/messages handlers

use axum::extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{Message, MessagePatch, NewMessage};
use crate::middleware::{ApiResponse, ApiResult};
use crate::observer::DomainEvent;

use super::views::{non_blank, reference};

#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub contract: Option<i64>,
}

/// GET /api/messages[?contract=] - oldest first
pub async fn list(State(state): State<AppState>, query: Result<Query<MessageQuery>, QueryRejection>) -> ApiResult<Vec<Message>> {
    let Query(query) = query?;
    Ok(ApiResponse::success(state.store.list_messages(query.contract).await?))
}

/// POST /api/messages
///
/// Sender and receiver are free-form user names. A message to an unknown
/// receiver is still stored; it just produces no notification.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewMessage>, JsonRejection>,
) -> ApiResult<Message> {
    let Json(body) = payload?;
    non_blank(&body.sender, "sender")?;
    non_blank(&body.receiver, "receiver")?;
    reference(state.store.get_contract(body.contract).await, "contract")?;

    let message = state.store.create_message(body).await?;
    tracing::debug!(
        "Message {} on contract {} from {} to {}",
        message.id,
        message.contract,
        message.sender,
        message.receiver
    );

    state
        .notify(DomainEvent::MessageSent {
            message: message.clone(),
        })
        .await;

    Ok(ApiResponse::created(message))
}

/// GET /api/messages/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Message> {
    Ok(ApiResponse::success(state.store.get_message(id).await?))
}

/// PUT/PATCH /api/messages/:id - edits are stored silently
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<MessagePatch>, JsonRejection>,
) -> ApiResult<Message> {
    let Json(patch) = payload?;
    if let Some(sender) = &patch.sender {
        non_blank(sender, "sender")?;
    }
    if let Some(receiver) = &patch.receiver {
        non_blank(receiver, "receiver")?;
    }
    Ok(ApiResponse::success(state.store.update_message(id, patch).await?))
}

/// DELETE /api/messages/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.store.delete_message(id).await?;
    Ok(ApiResponse::no_content())
}

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::{info, warn};
use uuid::Uuid;

use deco_db::models::MessageRow;
use deco_types::api::{CreateMessageRequest, DeleteMessageQuery, DeleteMessageResponse};
use deco_types::models::Message;

use crate::clock::iso_timestamp;
use crate::error::ApiError;
use crate::gate;
use crate::state::{AppState, soft_read};

/// POST /messages. Anyone holding a tree id may post; the tree is not looked up.
/// The echoed message is never masked.
pub async fn create_message(
    State(state): State<AppState>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    let msg = Message {
        id: Uuid::new_v4().to_string(),
        tree_id: req.tree_id,
        content: req.content,
        sender: req.sender,
        color: req.color,
        created_at: iso_timestamp(state.clock.now()),
    };

    let row = MessageRow::from(&msg);
    state.with_db(move |db| db.insert_message(&row)).await?;

    Ok(Json(msg))
}

/// GET /messages/{tree_id} — newest first, passed through the seasonal gate.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(tree_id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let rows = state.with_db(move |db| db.get_messages_by_tree(&tree_id)).await;
    let messages: Vec<Message> = soft_read(rows, "messages")?
        .into_iter()
        .map(Message::from)
        .collect();

    let now = state.clock.now();
    Ok(Json(gate::apply(&now, messages)))
}

/// DELETE /messages/{message_id}?user_id=... — only the owner of the
/// message's tree may delete it.
pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
    Query(query): Query<DeleteMessageQuery>,
) -> Result<Json<DeleteMessageResponse>, ApiError> {
    let mid = message_id.clone();
    let message = state
        .with_db(move |db| db.get_message(&mid))
        .await?
        .ok_or_else(|| ApiError::NotFound("Message not found".into()))?;

    let tree = state
        .with_db(move |db| db.get_tree(&message.tree_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Associated tree not found".into()))?;

    if tree.owner_id != query.user_id {
        warn!(
            "User {} tried to delete message {} on tree {} they do not own",
            query.user_id, message_id, tree.id
        );
        return Err(ApiError::Forbidden);
    }

    let mid = message_id.clone();
    let removed = state.with_db(move |db| db.delete_message(&mid)).await?;
    if removed != 1 {
        return Err(ApiError::Internal(anyhow::anyhow!(
            "Failed to delete message {}",
            message_id
        )));
    }

    info!("Deleted message {} from tree {}", message_id, tree.id);
    Ok(Json(DeleteMessageResponse {
        status: "deleted".into(),
        id: message_id,
    }))
}

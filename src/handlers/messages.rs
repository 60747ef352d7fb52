use axum::{extract::State, response::Json};

use crate::error::ApiError;
use crate::models::ChatMessage;
use crate::AppState;

/// `GET /api/messages`: the full chat transcript, oldest first.
pub async fn list_messages(State(state): State<AppState>) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let messages = state.stores.chat.list_all().await?;
    Ok(Json(messages))
}

//! Chat completion endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::api::types::ApiError;
use crate::domain::chat::{ChatCompletionRequest, ChatCompletionResponse, ChatService};

/// State for chat API
#[derive(Clone)]
pub struct ChatApiState {
    pub chat: Arc<ChatService>,
}

/// Run one chat completion
pub async fn chat_completions(
    State(state): State<ChatApiState>,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Json<ChatCompletionResponse>, ApiError> {
    tracing::debug!(
        model = %request.model,
        messages = request.messages.len(),
        stream = request.stream,
        "Chat completion request"
    );

    let response = state
        .chat
        .complete(request)
        .await
        .map_err(ApiError::from_chat)?;

    Ok(Json(response))
}

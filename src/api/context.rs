// src/api/context.rs

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;
use crate::chat::Command;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextQuery {
    pub user_id: Option<String>,
}

#[derive(Serialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
pub struct ContextResponse {
    pub messages: Vec<HistoryEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClearRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: &'static str,
}

fn require_user_id(user_id: Option<String>) -> ApiResult<String> {
    match user_id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(ApiError::bad_request("User ID required")),
    }
}

/// GET /context - project the stored history as plain role/content pairs.
/// Image turns surface their caption, or a placeholder when there is none.
pub async fn get_context_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ContextQuery>,
) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let user_id = require_user_id(params.user_id)?;

        let messages: Vec<HistoryEntry> = state
            .chat
            .history(&user_id)
            .await
            .iter()
            .map(|m| HistoryEntry {
                role: m.role.as_str().to_string(),
                content: m.content.display_text().to_string(),
            })
            .collect();

        Ok(Json(ContextResponse { messages }))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

/// POST /context - run one conversational turn. Provider trouble is already
/// folded into the reply text by the gateway, so this always answers 200
/// once validation passes.
pub async fn post_chat_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let user_id = require_user_id(request.user_id)?;

        let message = request.message.unwrap_or_default();
        let image = request.image.as_deref().filter(|url| !url.is_empty());
        if message.is_empty() && image.is_none() {
            return Err(ApiError::bad_request("Message or image required"));
        }

        info!("Processing chat message for user {}", user_id);
        let outcome = state.chat.converse(&user_id, &message, image).await;

        let kind = if matches!(outcome.command, Command::AnalyzeImage) {
            "image_analysis"
        } else {
            "text"
        };

        Ok(Json(ChatResponse {
            success: true,
            response: outcome.reply.display_text().to_string(),
            kind,
        }))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

/// DELETE /context - forget a user's history. Tolerates an absent or
/// malformed body and answers 200 either way; clearing an unknown user is
/// a no-op.
pub async fn clear_context_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> impl IntoResponse {
    let request: ClearRequest = serde_json::from_slice(&body).unwrap_or_default();

    if let Some(user_id) = request.user_id.filter(|id| !id.is_empty()) {
        state.chat.reset(&user_id).await;
        info!("Cleared context for user {}", user_id);
    }

    Json(ClearResponse {
        success: true,
        message: "Context cleared",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_user_id() {
        assert_eq!(require_user_id(Some("u1".to_string())).unwrap(), "u1");
        assert!(require_user_id(Some(String::new())).is_err());
        assert!(require_user_id(None).is_err());
    }

    #[test]
    fn test_chat_request_accepts_camel_case() {
        let request: ChatRequest = serde_json::from_value(json!({
            "message": "привет",
            "userId": "u1"
        }))
        .unwrap();

        assert_eq!(request.message.as_deref(), Some("привет"));
        assert_eq!(request.user_id.as_deref(), Some("u1"));
        assert!(request.image.is_none());
    }

    #[test]
    fn test_chat_response_kind_serializes_as_type() {
        let value = serde_json::to_value(ChatResponse {
            success: true,
            response: "ответ".to_string(),
            kind: "image_analysis",
        })
        .unwrap();

        assert_eq!(value["type"], json!("image_analysis"));
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_clear_request_tolerates_empty_body() {
        let request: ClearRequest = serde_json::from_slice(b"{}").unwrap_or_default();
        assert!(request.user_id.is_none());

        let request: ClearRequest = serde_json::from_slice(b"").unwrap_or_default();
        assert!(request.user_id.is_none());
    }
}

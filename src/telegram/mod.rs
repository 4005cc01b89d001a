// src/telegram/mod.rs
//! Telegram Bot API client and the wire types for incoming webhook updates.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Thin client for the Bot API methods this service uses.
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Send a Markdown-formatted reply.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.call(
            "sendMessage",
            &SendMessageRequest {
                chat_id,
                text,
                parse_mode: Some("Markdown"),
            },
        )
        .await
    }

    /// Send a plain-text notice, e.g. a progress message while an image is
    /// being generated. No parse mode, so user-supplied text cannot break
    /// Markdown rendering.
    pub async fn send_notice(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.call(
            "sendMessage",
            &SendMessageRequest {
                chat_id,
                text,
                parse_mode: None,
            },
        )
        .await
    }

    pub async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
    ) -> Result<(), TelegramError> {
        self.call(
            "sendPhoto",
            &SendPhotoRequest {
                chat_id,
                photo: photo_url,
                caption,
            },
        )
        .await
    }

    async fn call<T: Serialize>(&self, method: &str, payload: &T) -> Result<(), TelegramError> {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);
        let response = self.client.post(&url).json(payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("(failed to read body: {})", e));
            return Err(TelegramError::Status { status, body });
        }

        Ok(())
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Serialize)]
struct SendPhotoRequest<'a> {
    chat_id: i64,
    photo: &'a str,
    caption: &'a str,
}

/// One webhook update. Only the message field is of interest; everything
/// else Telegram sends is ignored.
#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramMessage {
    pub chat: TelegramChat,
    #[serde(default)]
    pub from: Option<TelegramUser>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUser {
    #[serde(default)]
    pub is_bot: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_parses_text_message() {
        let update: TelegramUpdate = serde_json::from_value(json!({
            "update_id": 100,
            "message": {
                "message_id": 7,
                "chat": { "id": 42, "type": "private" },
                "from": { "id": 9, "is_bot": false, "first_name": "Ира" },
                "text": "привет"
            }
        }))
        .unwrap();

        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.text.as_deref(), Some("привет"));
        assert!(!message.from.unwrap().is_bot);
    }

    #[test]
    fn test_update_without_message_is_accepted() {
        let update: TelegramUpdate =
            serde_json::from_value(json!({ "update_id": 101 })).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn test_message_without_text_or_sender() {
        let update: TelegramUpdate = serde_json::from_value(json!({
            "update_id": 102,
            "message": {
                "message_id": 8,
                "chat": { "id": 43 },
                "sticker": { "file_id": "abc" }
            }
        }))
        .unwrap();

        let message = update.message.unwrap();
        assert!(message.text.is_none());
        assert!(message.from.is_none());
    }

    #[test]
    fn test_send_message_skips_absent_parse_mode() {
        let plain = serde_json::to_value(SendMessageRequest {
            chat_id: 1,
            text: "⏳",
            parse_mode: None,
        })
        .unwrap();
        assert!(plain.get("parse_mode").is_none());

        let markdown = serde_json::to_value(SendMessageRequest {
            chat_id: 1,
            text: "**жирный**",
            parse_mode: Some("Markdown"),
        })
        .unwrap();
        assert_eq!(markdown["parse_mode"], json!("Markdown"));
    }
}

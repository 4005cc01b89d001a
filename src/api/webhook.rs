// src/api/webhook.rs

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use tracing::{error, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;
use crate::chat::{classify, Command};
use crate::telegram::{TelegramError, TelegramMessage, TelegramUpdate};

/// Menu sent in reply to the /start command.
const START_MENU: &str = "🤖 Привет! Я NeuromaniaGPT бот с реальным AI!\n\n🧠 Просто пиши мне - отвечу через Claude 3.5 Haiku\n🎨 \"нарисуй [описание]\" - создам изображение через FLUX\n💻 \"код [задача]\" - помогу с программированием через DeepSeek\n\nПопробуй написать: \"Расскажи интересный факт\"";

#[derive(Serialize)]
pub struct WebhookResponse {
    pub success: bool,
}

/// POST /webhook - process one Telegram update. Updates without a usable
/// text message (stickers, channel posts, messages from other bots) are
/// acknowledged without action so Telegram does not retry them.
pub async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    Json(update): Json<TelegramUpdate>,
) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        if let Some(message) = update.message {
            if let Err(e) = process_message(&state, message).await {
                error!("Failed to deliver Telegram reply: {}", e);
                return Err(ApiError::internal("Internal server error"));
            }
        }
        Ok(Json(WebhookResponse { success: true }))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

async fn process_message(
    state: &AppState,
    message: TelegramMessage,
) -> Result<(), TelegramError> {
    if message.from.as_ref().is_some_and(|user| user.is_bot) {
        return Ok(());
    }
    let Some(text) = message.text else {
        return Ok(());
    };
    let chat_id = message.chat.id;
    info!("Telegram message from chat {}", chat_id);

    if text == "/start" {
        return state.telegram.send_message(chat_id, START_MENU).await;
    }

    // Image generation takes a while; tell the user it started.
    if let Command::DrawImage { prompt } = classify(&text, false) {
        let notice = format!("🎨 Генерирую изображение: \"{}\"\n⏳ Подождите...", prompt);
        state.telegram.send_notice(chat_id, &notice).await?;
    }

    // Telegram chats get their own context keyspace so a chat id can never
    // collide with a web client's userId.
    let user_id = format!("tg-{}", chat_id);
    let outcome = state.chat.converse(&user_id, &text, None).await;

    if let Some(image) = outcome.reply.generated_image() {
        let caption = format!("🎨 \"{}\"", image.prompt);
        state
            .telegram
            .send_photo(chat_id, &image.url, &caption)
            .await
    } else {
        state
            .telegram
            .send_message(chat_id, outcome.reply.display_text())
            .await
    }
}

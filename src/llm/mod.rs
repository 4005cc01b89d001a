// src/llm/mod.rs
//! Provider gateway: turns a classified command plus recent context into one
//! provider call and a ready-to-display reply.
//!
//! Failures never cross this boundary as errors. Transport faults, non-2xx
//! statuses and empty payloads are all rendered into apologetic display text,
//! so the caller always has something to show the user.

mod completion;
mod image;

pub use completion::{CompletionClient, CompletionRequest, ContentPart, ImageUrl, WireContent, WireMessage};
pub use image::{ImageClient, ImageRequest};

use reqwest::StatusCode;
use thiserror::Error;
use tracing::warn;

use crate::chat::command::Command;
use crate::chat::message::{Message, MessageContent};
use crate::config::BoltunConfig;

/// Turns of stored context forwarded with each completion request.
pub const CONTEXT_WINDOW: usize = 5;

/// Per-kind completion ceilings.
pub const MAX_TOKENS_CHAT: u32 = 1000;
pub const MAX_TOKENS_CODE: u32 = 2000;
pub const MAX_TOKENS_VISION: u32 = 1500;

const TEMPERATURE_CHAT: f32 = 0.8;
const TEMPERATURE_CODE: f32 = 0.7;
const TEMPERATURE_VISION: f32 = 0.7;

const IMAGE_COUNT: u32 = 1;
const IMAGE_SIZE: &str = "1024x1024";

/// Canned reply for greetings, answered locally without a provider call.
pub const GREETING_REPLY: &str = "👋 Привет! Как дела? Я помню наш разговор!";

const CHAT_SYSTEM_PROMPT: &str = "Ты дружелюбный AI-ассистент. Отвечай кратко, но информативно на русском языке. Учитывай контекст предыдущих сообщений для более персонализированного общения.";
const CODE_SYSTEM_PROMPT: &str = "Ты опытный программист. Отвечай кратко и по делу. Код оформляй в markdown. Учитывай контекст предыдущих сообщений.";
const VISION_SYSTEM_PROMPT: &str = "Ты AI-ассистент, который может анализировать изображения. Отвечай на русском языке, будь дружелюбным и подробным.";

/// Question sent in place of a caption for image turns without one.
const DEFAULT_VISION_QUESTION: &str = "Что на этом изображении?";

// ============================================================================
// Errors
// ============================================================================

/// Faults raised by the provider clients. Internal to this module's
/// boundary; [`ProviderGateway::respond`] converts them into replies.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("empty completion in response")]
    EmptyCompletion,

    #[error("no image url in response")]
    MissingImageUrl,
}

// ============================================================================
// Replies
// ============================================================================

/// What went wrong when a reply is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport fault, non-2xx status, or an undecodable body.
    Provider,
    /// The provider answered 2xx but the expected payload was missing.
    EmptyResponse,
}

/// Image produced by a draw command, kept alongside the display text so the
/// Telegram surface can deliver the picture itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub url: String,
    pub prompt: String,
}

/// Outcome of one gateway dispatch. Both variants carry ready-to-display
/// text; `Failure` marks replies that apologize instead of answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderReply {
    Success {
        text: String,
        image: Option<GeneratedImage>,
    },
    Failure {
        kind: FailureKind,
        text: String,
    },
}

impl ProviderReply {
    fn success(text: impl Into<String>) -> Self {
        ProviderReply::Success {
            text: text.into(),
            image: None,
        }
    }

    fn failure(kind: FailureKind, text: impl Into<String>) -> Self {
        ProviderReply::Failure {
            kind,
            text: text.into(),
        }
    }

    /// Text shown to the user regardless of outcome.
    pub fn display_text(&self) -> &str {
        match self {
            ProviderReply::Success { text, .. } | ProviderReply::Failure { text, .. } => text,
        }
    }

    pub fn generated_image(&self) -> Option<&GeneratedImage> {
        match self {
            ProviderReply::Success { image, .. } => image.as_ref(),
            ProviderReply::Failure { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ProviderReply::Failure { .. })
    }
}

// ============================================================================
// Gateway
// ============================================================================

pub struct ProviderGateway {
    completion: CompletionClient,
    image: ImageClient,
    chat_model: String,
    code_model: String,
    vision_model: String,
    image_model: String,
}

impl ProviderGateway {
    /// Build both provider clients from configuration.
    pub fn new(config: &BoltunConfig) -> Result<Self, ProviderError> {
        let timeout = config.request_timeout();
        Ok(Self {
            completion: CompletionClient::new(
                &config.provider_base_url,
                &config.provider_api_key,
                timeout,
            )?,
            image: ImageClient::new(
                &config.provider_base_url,
                &config.provider_api_key,
                timeout,
            )?,
            chat_model: config.chat_model.clone(),
            code_model: config.code_model.clone(),
            vision_model: config.vision_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    /// Dispatch one classified command. `context` is the stored history as it
    /// stands after the triggering turn was appended; completion kinds
    /// forward its most recent [`CONTEXT_WINDOW`] turns.
    pub async fn respond(&self, command: &Command, context: &[Message]) -> ProviderReply {
        match command {
            Command::Greeting => ProviderReply::success(GREETING_REPLY),
            Command::DrawImage { prompt } => self.draw(prompt).await,
            Command::CodeAssist { task } => self.code_assist(task, context).await,
            Command::Chat { text } => self.chat(text, context).await,
            Command::AnalyzeImage => self.analyze_image(context).await,
        }
    }

    async fn draw(&self, prompt: &str) -> ProviderReply {
        let request = ImageRequest {
            model: self.image_model.clone(),
            prompt: prompt.to_string(),
            n: IMAGE_COUNT,
            size: IMAGE_SIZE.to_string(),
        };

        match self.image.generate(&request).await {
            Ok(url) => ProviderReply::Success {
                text: format!("🎨 Изображение создано!\n\n![{}]({})", prompt, url),
                image: Some(GeneratedImage {
                    url,
                    prompt: prompt.to_string(),
                }),
            },
            Err(ProviderError::MissingImageUrl) => {
                warn!("Image generation returned no url");
                ProviderReply::failure(FailureKind::EmptyResponse, "❌ Ошибка генерации изображения")
            }
            Err(err) => {
                warn!("Image generation failed: {}", err);
                ProviderReply::failure(FailureKind::Provider, format!("❌ Ошибка FLUX: {}", err))
            }
        }
    }

    async fn chat(&self, text: &str, context: &[Message]) -> ProviderReply {
        let request = CompletionRequest {
            model: self.chat_model.clone(),
            messages: build_text_messages(CHAT_SYSTEM_PROMPT, context, text),
            max_tokens: MAX_TOKENS_CHAT,
            temperature: TEMPERATURE_CHAT,
        };

        match self.completion.complete(&request).await {
            Ok(content) => {
                ProviderReply::success(format!("🧠 **Claude 3.5 Haiku:**\n\n{}", content))
            }
            Err(ProviderError::EmptyCompletion) => ProviderReply::failure(
                FailureKind::EmptyResponse,
                "❌ Ошибка получения ответа от Claude",
            ),
            Err(err) => {
                warn!("Chat completion failed: {}", err);
                ProviderReply::failure(FailureKind::Provider, format!("❌ Ошибка Claude: {}", err))
            }
        }
    }

    async fn code_assist(&self, task: &str, context: &[Message]) -> ProviderReply {
        let request = CompletionRequest {
            model: self.code_model.clone(),
            messages: build_text_messages(CODE_SYSTEM_PROMPT, context, task),
            max_tokens: MAX_TOKENS_CODE,
            temperature: TEMPERATURE_CODE,
        };

        match self.completion.complete(&request).await {
            Ok(content) => {
                ProviderReply::success(format!("💻 **DeepSeek V3:**\n\n{}", content))
            }
            Err(ProviderError::EmptyCompletion) => ProviderReply::failure(
                FailureKind::EmptyResponse,
                "❌ Ошибка получения ответа от DeepSeek",
            ),
            Err(err) => {
                warn!("Code completion failed: {}", err);
                ProviderReply::failure(
                    FailureKind::Provider,
                    format!("❌ Ошибка DeepSeek: {}", err),
                )
            }
        }
    }

    async fn analyze_image(&self, context: &[Message]) -> ProviderReply {
        let request = CompletionRequest {
            model: self.vision_model.clone(),
            messages: build_vision_messages(context),
            max_tokens: MAX_TOKENS_VISION,
            temperature: TEMPERATURE_VISION,
        };

        match self.completion.complete(&request).await {
            Ok(content) => {
                ProviderReply::success(format!("🖼️ **Анализ изображения:**\n\n{}", content))
            }
            Err(ProviderError::EmptyCompletion) => ProviderReply::failure(
                FailureKind::EmptyResponse,
                "❌ Ошибка анализа изображения",
            ),
            Err(err) => {
                warn!("Image analysis failed: {}", err);
                ProviderReply::failure(
                    FailureKind::Provider,
                    format!("❌ Ошибка анализа изображения: {}", err),
                )
            }
        }
    }
}

// ============================================================================
// Payload Building
// ============================================================================

/// System prompt, the recent text-only turns, then the new user text.
fn build_text_messages(system: &str, context: &[Message], user_text: &str) -> Vec<WireMessage> {
    let mut messages = vec![WireMessage {
        role: "system".to_string(),
        content: WireContent::Text(system.to_string()),
    }];

    for message in context_window(context) {
        if let MessageContent::Text(text) = &message.content {
            messages.push(WireMessage {
                role: message.role.as_str().to_string(),
                content: WireContent::Text(text.clone()),
            });
        }
    }

    messages.push(WireMessage {
        role: "user".to_string(),
        content: WireContent::Text(user_text.to_string()),
    });

    messages
}

/// System prompt plus the recent turns, with image turns expanded into
/// multimodal content parts so the provider sees the picture again.
fn build_vision_messages(context: &[Message]) -> Vec<WireMessage> {
    let mut messages = vec![WireMessage {
        role: "system".to_string(),
        content: WireContent::Text(VISION_SYSTEM_PROMPT.to_string()),
    }];

    for message in context_window(context) {
        let content = match &message.content {
            MessageContent::Text(text) => WireContent::Text(text.clone()),
            MessageContent::Image { text, url } => WireContent::Parts(vec![
                ContentPart::Text {
                    text: text
                        .clone()
                        .unwrap_or_else(|| DEFAULT_VISION_QUESTION.to_string()),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: url.clone() },
                },
            ]),
        };
        messages.push(WireMessage {
            role: message.role.as_str().to_string(),
            content,
        });
    }

    messages
}

fn context_window(context: &[Message]) -> &[Message] {
    &context[context.len().saturating_sub(CONTEXT_WINDOW)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::Message;
    use serde_json::json;

    fn text_turns(count: usize) -> Vec<Message> {
        (0..count)
            .map(|i| Message::user_text(format!("turn-{}", i)))
            .collect()
    }

    #[test]
    fn test_window_truncates_to_most_recent() {
        let context = text_turns(8);
        let window = context_window(&context);
        assert_eq!(window.len(), CONTEXT_WINDOW);
        assert_eq!(window[0].content.display_text(), "turn-3");
        assert_eq!(window[4].content.display_text(), "turn-7");
    }

    #[test]
    fn test_window_handles_short_context() {
        let context = text_turns(2);
        assert_eq!(context_window(&context).len(), 2);
        assert!(context_window(&[]).is_empty());
    }

    #[test]
    fn test_text_messages_start_with_system_and_end_with_user() {
        let context = text_turns(3);
        let messages = build_text_messages(CODE_SYSTEM_PROMPT, &context, "sort a list");

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[4].role, "user");
        let value = serde_json::to_value(&messages[4]).unwrap();
        assert_eq!(value["content"], json!("sort a list"));
    }

    #[test]
    fn test_text_messages_filter_image_turns() {
        let context = vec![
            Message::user_text("привет"),
            Message::user_image(Some("кот".to_string()), "http://img/cat.png"),
            Message::assistant_text("ответ"),
        ];
        let messages = build_text_messages(CHAT_SYSTEM_PROMPT, &context, "дальше");

        // system + 2 text turns + final user text; the image turn is dropped
        assert_eq!(messages.len(), 4);
        let serialized = serde_json::to_string(&messages).unwrap();
        assert!(!serialized.contains("image_url"));
    }

    #[test]
    fn test_vision_messages_keep_image_parts() {
        let context = vec![
            Message::user_text("смотри"),
            Message::user_image(None, "http://img/cat.png"),
        ];
        let messages = build_vision_messages(&context);

        assert_eq!(messages.len(), 3);
        let value = serde_json::to_value(&messages[2]).unwrap();
        assert_eq!(value["content"][0]["text"], json!(DEFAULT_VISION_QUESTION));
        assert_eq!(
            value["content"][1]["image_url"]["url"],
            json!("http://img/cat.png")
        );
    }

    #[test]
    fn test_vision_messages_use_caption_when_present() {
        let context = vec![Message::user_image(
            Some("мой кот".to_string()),
            "http://img/cat.png",
        )];
        let messages = build_vision_messages(&context);
        let value = serde_json::to_value(&messages[1]).unwrap();
        assert_eq!(value["content"][0]["text"], json!("мой кот"));
    }

    #[test]
    fn test_reply_accessors() {
        let success = ProviderReply::Success {
            text: "готово".to_string(),
            image: Some(GeneratedImage {
                url: "http://x/y.png".to_string(),
                prompt: "кот".to_string(),
            }),
        };
        assert_eq!(success.display_text(), "готово");
        assert_eq!(success.generated_image().unwrap().url, "http://x/y.png");
        assert!(!success.is_failure());

        let failure = ProviderReply::failure(FailureKind::EmptyResponse, "❌ Ошибка");
        assert_eq!(failure.display_text(), "❌ Ошибка");
        assert!(failure.generated_image().is_none());
        assert!(failure.is_failure());
    }
}

// src/chat/message.rs

use serde::{Deserialize, Serialize};

/// Label shown for image turns that carry no caption.
pub const IMAGE_PLACEHOLDER: &str = "Изображение";

/// Originator of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Content of a single turn. Image turns keep the source URL so a later
/// analysis request can resend the image to the provider.
///
/// The caption is `None` when the sender attached an image without any text;
/// projection and payload building substitute their own defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    Image { text: Option<String>, url: String },
}

impl MessageContent {
    /// Text used when the turn is projected into a plain history listing.
    pub fn display_text(&self) -> &str {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Image { text, .. } => text.as_deref().unwrap_or(IMAGE_PLACEHOLDER),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, MessageContent::Text(_))
    }
}

/// One immutable turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_image(text: Option<String>, url: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Image {
                text,
                url: url.into(),
            },
        }
    }
}

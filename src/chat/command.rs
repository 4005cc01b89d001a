// src/chat/command.rs

/// Substring that marks a greeting anywhere in the message.
const GREETING_TOKEN: &str = "привет";
/// Prefix commanding an image generation.
const DRAW_TOKEN: &str = "нарисуй";
/// Prefix commanding a code-assist completion.
const CODE_TOKEN: &str = "код";

/// What an inbound message asks the relay to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Greeting,
    DrawImage { prompt: String },
    CodeAssist { task: String },
    Chat { text: String },
    AnalyzeImage,
}

/// Classify a message. An attached image wins over every text rule; the text
/// rules run case-insensitively on the trimmed message, in order: greeting
/// substring, draw prefix, code prefix, plain chat.
///
/// Pure and total: identical input always yields the same command. Command
/// payloads keep the original casing of the remainder text.
pub fn classify(text: &str, has_image: bool) -> Command {
    if has_image {
        return Command::AnalyzeImage;
    }

    let trimmed = text.trim();
    let lowered = trimmed.to_lowercase();

    if lowered.contains(GREETING_TOKEN) {
        Command::Greeting
    } else if lowered.starts_with(DRAW_TOKEN) {
        Command::DrawImage {
            prompt: strip_token(trimmed, DRAW_TOKEN),
        }
    } else if lowered.starts_with(CODE_TOKEN) {
        Command::CodeAssist {
            task: strip_token(trimmed, CODE_TOKEN),
        }
    } else {
        Command::Chat {
            text: trimmed.to_string(),
        }
    }
}

/// Drop the leading command token from the original-case message. Token
/// lengths are counted in chars; the command words are Cyrillic and occupy
/// two bytes per char in UTF-8.
fn strip_token(text: &str, token: &str) -> String {
    text.chars()
        .skip(token.chars().count())
        .collect::<String>()
        .trim()
        .to_string()
}

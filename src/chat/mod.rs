// src/chat/mod.rs
//! Conversation domain: message types, per-user context storage, command
//! classification and the service that runs one turn end to end.

pub mod command;
pub mod context;
pub mod message;
pub mod service;

pub use command::{classify, Command};
pub use context::{ContextStore, MAX_CONTEXT_MESSAGES};
pub use message::{Message, MessageContent, Role, IMAGE_PLACEHOLDER};
pub use service::{ChatOutcome, ChatService};

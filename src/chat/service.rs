// src/chat/service.rs
//! One conversational turn from end to end: classify the incoming message,
//! record it, dispatch to the provider gateway, record the reply.

use crate::chat::command::{classify, Command};
use crate::chat::context::ContextStore;
use crate::chat::message::Message;
use crate::llm::{ProviderGateway, ProviderReply};

/// What a completed turn produced, for the surface that requested it.
pub struct ChatOutcome {
    pub command: Command,
    pub reply: ProviderReply,
}

pub struct ChatService {
    store: ContextStore,
    gateway: ProviderGateway,
}

impl ChatService {
    pub fn new(store: ContextStore, gateway: ProviderGateway) -> Self {
        Self { store, gateway }
    }

    /// Snapshot of the stored turns for `user_id`, oldest first.
    pub async fn history(&self, user_id: &str) -> Vec<Message> {
        self.store.get(user_id).await
    }

    /// Drop the stored context for `user_id`. Unknown ids are a no-op.
    pub async fn reset(&self, user_id: &str) {
        self.store.clear(user_id).await;
    }

    /// Run one turn for `user_id`. The incoming message is appended before
    /// dispatch, so the provider's context window includes it; the reply's
    /// display text is appended afterwards, failures included, keeping the
    /// stored history identical to what the user saw.
    pub async fn converse(
        &self,
        user_id: &str,
        text: &str,
        image_url: Option<&str>,
    ) -> ChatOutcome {
        let command = classify(text, image_url.is_some());

        let user_turn = match image_url {
            Some(url) => Message::user_image(non_blank(text), url),
            None => Message::user_text(text),
        };
        self.store.append(user_id, user_turn).await;

        let context = self.store.get(user_id).await;
        let reply = self.gateway.respond(&command, &context).await;

        self.store
            .append(user_id, Message::assistant_text(reply.display_text()))
            .await;

        ChatOutcome { command, reply }
    }
}

fn non_blank(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

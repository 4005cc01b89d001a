// src/chat/context.rs

use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;

use super::message::Message;

/// Maximum number of turns kept per user.
pub const MAX_CONTEXT_MESSAGES: usize = 10;

/// In-memory per-user conversation log with FIFO truncation.
///
/// One lock guards the whole map, so append and clear for the same user can
/// never interleave mid-update. Contexts are created lazily on first append
/// and live for the process lifetime until cleared. Nothing is persisted.
#[derive(Default)]
pub struct ContextStore {
    contexts: RwLock<HashMap<String, VecDeque<Message>>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored turns for a user, oldest first. Unknown users
    /// read as empty; reading never creates an entry.
    pub async fn get(&self, user_id: &str) -> Vec<Message> {
        let contexts = self.contexts.read().await;
        contexts
            .get(user_id)
            .map(|turns| turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Append one turn, evicting the oldest entries once the bound is hit.
    pub async fn append(&self, user_id: &str, message: Message) {
        let mut contexts = self.contexts.write().await;
        let turns = contexts.entry(user_id.to_string()).or_default();
        turns.push_back(message);
        while turns.len() > MAX_CONTEXT_MESSAGES {
            turns.pop_front();
        }
    }

    /// Drop a user's context entirely. Clearing an unknown user is a no-op.
    pub async fn clear(&self, user_id: &str) {
        let mut contexts = self.contexts.write().await;
        contexts.remove(user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::Role;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_append_preserves_order() {
        let store = ContextStore::new();

        store.append("u1", Message::user_text("раз")).await;
        store.append("u1", Message::assistant_text("два")).await;
        store.append("u1", Message::user_text("три")).await;

        let turns = store.get("u1").await;
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].content.display_text(), "раз");
        assert_eq!(turns[1].content.display_text(), "два");
        assert_eq!(turns[2].content.display_text(), "три");
    }

    #[tokio::test]
    async fn test_eviction_keeps_most_recent() {
        let store = ContextStore::new();

        for i in 0..13 {
            store.append("u1", Message::user_text(format!("msg-{}", i))).await;
        }

        let turns = store.get("u1").await;
        assert_eq!(turns.len(), MAX_CONTEXT_MESSAGES);
        assert_eq!(turns[0].content.display_text(), "msg-3");
        assert_eq!(turns[9].content.display_text(), "msg-12");
    }

    #[tokio::test]
    async fn test_unknown_user_reads_empty() {
        let store = ContextStore::new();
        assert!(store.get("nobody").await.is_empty());
        // Reading twice must still be empty; get does not create entries
        assert!(store.get("nobody").await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_context() {
        let store = ContextStore::new();

        store.append("u1", Message::user_text("привет")).await;
        assert_eq!(store.get("u1").await.len(), 1);

        store.clear("u1").await;
        assert!(store.get("u1").await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_unknown_user_is_noop() {
        let store = ContextStore::new();
        store.clear("nobody").await;
        store.clear("nobody").await;
        assert!(store.get("nobody").await.is_empty());
    }

    #[tokio::test]
    async fn test_contexts_are_isolated_per_user() {
        let store = ContextStore::new();

        store.append("u1", Message::user_text("от первого")).await;
        store.append("u2", Message::user_text("от второго")).await;
        store.clear("u1").await;

        assert!(store.get("u1").await.is_empty());
        assert_eq!(store.get("u2").await.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_appends_respect_bound() {
        let store = Arc::new(ContextStore::new());

        let mut handles = Vec::new();
        for task in 0..4 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..5 {
                    store
                        .append("shared", Message::user_text(format!("t{}-{}", task, i)))
                        .await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let turns = store.get("shared").await;
        assert_eq!(turns.len(), MAX_CONTEXT_MESSAGES);
        assert!(turns.iter().all(|turn| turn.role == Role::User));
    }
}

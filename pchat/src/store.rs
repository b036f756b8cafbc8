//! Conversation storage contracts and a basic in-memory implementation.
//!
//! ```rust
//! use pchat::{ConversationStore, InMemoryConversationStore};
//! use pcommon::ConversationId;
//! use pprovider::Message;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = InMemoryConversationStore::new();
//! let conversation = ConversationId::from("conv-1");
//!
//! let id = store.append(&conversation, Message::user("hi")).await.unwrap();
//! assert_eq!(id.as_str(), "msg-1");
//! assert_eq!(store.list(&conversation).await.unwrap().len(), 1);
//! # });
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use pcommon::{ConversationId, MessageId};
use pprovider::Message;

use crate::ChatError;

pub type ChatFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Append-only conversation log. `list` returns messages in creation order.
pub trait ConversationStore: Send + Sync {
    fn append<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        message: Message,
    ) -> ChatFuture<'a, Result<MessageId, ChatError>>;

    fn list<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> ChatFuture<'a, Result<Vec<Message>, ChatError>>;
}

#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    conversations: Mutex<HashMap<ConversationId, Vec<Message>>>,
    last_id: AtomicU64,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_message_id(&self) -> MessageId {
        let n = self.last_id.fetch_add(1, Ordering::Relaxed) + 1;
        MessageId::new(format!("msg-{n}"))
    }
}

impl ConversationStore for InMemoryConversationStore {
    fn append<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        message: Message,
    ) -> ChatFuture<'a, Result<MessageId, ChatError>> {
        Box::pin(async move {
            let mut conversations = self
                .conversations
                .lock()
                .map_err(|_| ChatError::store("conversation store lock poisoned"))?;

            let id = self.next_message_id();
            conversations
                .entry(conversation_id.clone())
                .or_default()
                .push(message);

            Ok(id)
        })
    }

    fn list<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> ChatFuture<'a, Result<Vec<Message>, ChatError>> {
        Box::pin(async move {
            let conversations = self
                .conversations
                .lock()
                .map_err(|_| ChatError::store("conversation store lock poisoned"))?;

            Ok(conversations
                .get(conversation_id)
                .cloned()
                .unwrap_or_default())
        })
    }
}

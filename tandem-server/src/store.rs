//! Message persistence
//!
//! The monitor only needs four operations from storage. [`MemoryStore`]
//! backs the CLI and the tests; a database-backed store plugs in through
//! the same trait.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;

use tandem_protocol::{Message, NewMessage, PromptStatus, SessionKey, SessionState};
use tandem_utils::Result;

/// Storage used by pollers and the session monitor
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a message and return the stored record
    async fn create_message(&self, message: NewMessage) -> Result<Message>;

    /// Current extraction state; a default state for unknown keys
    async fn session_state(&self, key: &SessionKey) -> Result<SessionState>;

    async fn update_session_state(&self, key: &SessionKey, state: SessionState) -> Result<()>;

    /// Resolve every pending prompt of a session, returning how many changed
    async fn mark_pending_prompts_as_answered(&self, key: &SessionKey) -> Result<usize>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    messages: RwLock<Vec<Message>>,
    states: DashMap<SessionKey, SessionState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages of one session in creation order
    pub fn messages(&self, key: &SessionKey) -> Vec<Message> {
        self.messages
            .read()
            .iter()
            .filter(|m| m.workspace_id == key.workspace_id && m.tool == key.tool)
            .cloned()
            .collect()
    }

    pub fn pending_prompts(&self, key: &SessionKey) -> Vec<Message> {
        self.messages(key)
            .into_iter()
            .filter(Message::is_pending_prompt)
            .collect()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create_message(&self, message: NewMessage) -> Result<Message> {
        let message = Message::from_new(message);
        self.messages.write().push(message.clone());
        Ok(message)
    }

    async fn session_state(&self, key: &SessionKey) -> Result<SessionState> {
        Ok(self.states.get(key).map(|s| *s).unwrap_or_default())
    }

    async fn update_session_state(&self, key: &SessionKey, state: SessionState) -> Result<()> {
        self.states.insert(key.clone(), state);
        Ok(())
    }

    async fn mark_pending_prompts_as_answered(&self, key: &SessionKey) -> Result<usize> {
        let mut messages = self.messages.write();
        let mut count = 0;
        for message in messages
            .iter_mut()
            .filter(|m| m.workspace_id == key.workspace_id && m.tool == key.tool)
        {
            if message.is_pending_prompt() {
                message.prompt_status = Some(PromptStatus::Answered);
                count += 1;
            }
        }
        Ok(count)
    }
}

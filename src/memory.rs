//! Conversation buffer shared by every caller of the chain.
//!
//! There is exactly one history per process. Turns are appended in the
//! order requests complete and only a restart clears them.

use std::sync::Mutex;

use crate::models::ChatTurn;

#[derive(Default)]
pub struct ConversationMemory {
    turns: Mutex<Vec<ChatTurn>>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, turn: ChatTurn) {
        self.lock().push(turn);
    }

    /// Snapshot of the history, oldest first.
    pub fn turns(&self) -> Vec<ChatTurn> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Renders the history as `\nHuman: ...\nAssistant: ...` per turn.
    pub fn render_history(&self) -> String {
        render_turns(&self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ChatTurn>> {
        // A panic while holding the lock cannot leave a half-written Vec.
        self.turns.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn render_turns(turns: &[ChatTurn]) -> String {
    turns
        .iter()
        .map(|t| format!("\nHuman: {}\nAssistant: {}", t.question, t.answer))
        .collect()
}

//! Bounded conversation transcript.

use serde::{Deserialize, Serialize};

use siteline_core::types::ChatTurn;

/// Ordered role-tagged turns, headed by the system prompt.
///
/// Never holds more than `max_turns` entries: once full, the oldest
/// non-system turn is dropped. Element 0 is always the system turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
    max_turns: usize,
}

impl Transcript {
    pub fn new(system_prompt: impl Into<String>, max_turns: usize) -> Self {
        Self {
            turns: vec![ChatTurn::system(system_prompt)],
            max_turns: max_turns.max(1),
        }
    }

    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
        self.truncate();
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(ChatTurn::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(ChatTurn::assistant(content));
    }

    fn truncate(&mut self) {
        while self.turns.len() > self.max_turns {
            self.turns.remove(1);
        }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// The most recent turn, system turn included.
    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always false: the system turn is never removed.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

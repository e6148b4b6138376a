use crate::event::ResultEnvelope;
use std::path::PathBuf;

/// How many of the most recent turns the layout pass considers.
pub const VISIBLE_TURNS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

impl Speaker {
    pub fn label(self) -> &'static str {
        match self {
            Speaker::User => "You:",
            Speaker::Bot => "Bot:",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnContent {
    Text(String),
    Image { caption: String, path: PathBuf },
}

/// One message in the conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub content: TurnContent,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn from_envelope(envelope: ResultEnvelope) -> Self {
        let content = match envelope {
            ResultEnvelope::Text(text) | ResultEnvelope::Notice(text) => TurnContent::Text(text),
            ResultEnvelope::ImageFound { caption, path } => TurnContent::Image { caption, path },
        };
        Self {
            speaker: Speaker::Bot,
            content,
        }
    }
}

/// Append-only conversation log. Turns are never mutated or removed, so
/// insertion order is chronological order.
#[derive(Debug, Default)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The last `n` turns, oldest first.
    pub fn suffix(&self, n: usize) -> &[ChatTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }
}

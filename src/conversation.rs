//! Conversation store: the ordered, append-only log of turns for one session.

use crate::chart::Figure;

/// Who a turn is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the conversation. Chart turns are always assistant turns and
/// never carry text.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    User { text: String },
    Assistant { text: String },
    Chart { figure: Figure, caption: Option<String> },
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant { text: text.into() }
    }

    #[must_use]
    pub fn chart(figure: Figure) -> Self {
        Self::Chart { figure, caption: None }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::User { .. } => Role::User,
            Self::Assistant { .. } | Self::Chart { .. } => Role::Assistant,
        }
    }

    /// Text content, or `None` for chart turns.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::User { text } | Self::Assistant { text } => Some(text),
            Self::Chart { .. } => None,
        }
    }

    #[must_use]
    pub fn is_chart(&self) -> bool {
        matches!(self, Self::Chart { .. })
    }
}

/// Turns in the order they happened. There is no way to edit or remove a
/// turn once pushed; [`Conversation::default`] starts a new one.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

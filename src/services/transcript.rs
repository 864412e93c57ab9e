//! Transcript builder: flattens the conversation into the `input` text sent
//! with each primary request.

use crate::conversation::{Conversation, Turn};

/// Line emitted for a chart turn, which has no text of its own.
pub const CHART_PLACEHOLDER: &str = "Assistant: [chart]";

/// How much history is resent with each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryWindow {
    /// Every turn, oldest first.
    #[default]
    Full,
    /// Only the most recent `n` turns.
    LastTurns(usize),
}

impl HistoryWindow {
    /// `0` means no limit.
    #[must_use]
    pub fn from_turns(turns: usize) -> Self {
        if turns == 0 { Self::Full } else { Self::LastTurns(turns) }
    }
}

/// One line per turn in conversation order, joined with `\n`.
#[must_use]
pub fn build_transcript(conversation: &Conversation, window: HistoryWindow) -> String {
    let turns = conversation.turns();
    let start = match window {
        HistoryWindow::Full => 0,
        HistoryWindow::LastTurns(n) => turns.len().saturating_sub(n),
    };
    turns[start..]
        .iter()
        .map(transcript_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn transcript_line(turn: &Turn) -> String {
    match turn {
        Turn::User { text } => format!("User: {text}"),
        Turn::Assistant { text } => format!("Assistant: {text}"),
        Turn::Chart { .. } => CHART_PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
#[path = "transcript_test.rs"]
mod tests;

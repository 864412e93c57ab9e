//! Interactive chat session: reads lines, dispatches slash commands, and runs
//! everything else through the turn orchestrator.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;
use uuid::Uuid;

use crate::conversation::{Conversation, Role, Turn};
use crate::display::DisplaySink;
use crate::services::turn::TurnOrchestrator;

const HELP: &str = "Commands:\n  /history  show the conversation so far\n  /clear    start a new conversation\n  /help     show this help\n  /quit     leave (Ctrl-D works too)";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to read input: {0}")]
    Input(#[from] std::io::Error),
}

impl crate::error::ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Input(_) => "E_SESSION_INPUT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionControl {
    Continue,
    Quit,
}

/// One user's conversation for the lifetime of the process.
pub struct ChatSession {
    orchestrator: TurnOrchestrator,
    conversation: Conversation,
    session_id: Uuid,
}

impl ChatSession {
    pub fn new(orchestrator: TurnOrchestrator) -> Self {
        Self { orchestrator, conversation: Conversation::new(), session_id: Uuid::new_v4() }
    }

    pub fn banner(&self, sink: &mut dyn DisplaySink) {
        let persona = self.orchestrator.settings().persona;
        sink.show_text(
            Role::Assistant,
            &format!("# {}\n{}\n\nType /help for commands.", persona.title(), persona.subtitle()),
        );
    }

    /// Handle one input line.
    pub async fn handle_line(&mut self, line: &str, sink: &mut dyn DisplaySink) -> SessionControl {
        let line = line.trim();
        match line {
            "" => {}
            "/quit" | "/exit" => return SessionControl::Quit,
            "/help" => sink.show_info(HELP),
            "/history" => replay(&self.conversation, sink),
            "/clear" => {
                info!(session = %self.session_id, turns = self.conversation.len(), "session: cleared");
                self.conversation = Conversation::new();
                sink.show_info("Started a new conversation.");
            }
            command if command.starts_with('/') => {
                sink.show_error(&format!("Unknown command {command}. Type /help for commands."));
            }
            input => {
                let outcome = self
                    .orchestrator
                    .process_turn(&mut self.conversation, sink, input)
                    .await;
                info!(
                    session = %self.session_id,
                    path = ?outcome.path,
                    appended = outcome.appended,
                    clean_len = outcome.clean_text.len(),
                    poem = outcome.poem.is_some(),
                    trail = ?outcome.trail,
                    "session: turn done"
                );
            }
        }
        SessionControl::Continue
    }

    /// Read lines until EOF or `/quit`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Input`] if reading from `reader` fails.
    pub async fn run<R>(&mut self, reader: R, sink: &mut dyn DisplaySink) -> Result<(), SessionError>
    where
        R: AsyncBufRead + Unpin,
    {
        info!(session = %self.session_id, "session: started");
        self.banner(sink);
        let mut lines = reader.lines();
        loop {
            sink.prompt();
            let Some(line) = lines.next_line().await? else {
                break;
            };
            if self.handle_line(&line, sink).await == SessionControl::Quit {
                break;
            }
        }
        let charts = self.conversation.turns().iter().filter(|t| t.is_chart()).count();
        info!(session = %self.session_id, turns = self.conversation.len(), charts, "session: ended");
        Ok(())
    }
}

/// Re-render every stored turn, charts included.
fn replay(conversation: &Conversation, sink: &mut dyn DisplaySink) {
    if conversation.is_empty() {
        sink.show_info("No messages yet.");
        return;
    }
    for turn in conversation.turns() {
        if let Turn::Chart { figure, caption } = turn {
            sink.replay_chart(figure, caption.as_deref());
        } else if let Some(text) = turn.text() {
            sink.show_text(turn.role(), text);
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

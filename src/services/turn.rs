//! Turn orchestrator: one user message in, a fully recorded exchange out.
//!
//! DESIGN
//! ======
//! Each turn walks a fixed sequence of states:
//!
//! ```text
//! AwaitingInput → UserTurnRecorded → PrimaryGenerated → ChartPath | TextPath
//!               → SecondaryGenerated (poet enabled, clean text non-empty) → Idle
//! ```
//!
//! The primary call carries the transcript, persona instructions and the
//! `file_search` tool. A fenced python block in the answer sends the turn down
//! the chart path; otherwise the answer is shown and stored verbatim. The poet
//! call sees only the clean text (code removed) and has no tools.
//!
//! Nothing escapes `process_turn`: LLM failures become display text and chart
//! failures become a single recorded turn.

use std::sync::Arc;

use tracing::{info, warn};

use super::extract::{extract_python_code, remove_python_blocks};
use super::prompts::{POET_INPUT_PREFIX, POET_INSTRUCTIONS, Persona};
use super::transcript::{HistoryWindow, build_transcript};
use super::visualize::{ChartStatus, visualize};
use crate::conversation::{Conversation, Role, Turn};
use crate::display::DisplaySink;
use crate::error::ErrorCode;
use crate::llm::LlmGenerate;
use crate::llm::types::{GenerationRequest, RetrievalTool};

/// Stand-in clean text when the answer was nothing but code.
pub const CHART_ONLY_TEXT: &str = "A chart was generated based on the answer.";

// =============================================================================
// TYPES
// =============================================================================

/// Per-session pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSettings {
    pub persona: Persona,
    pub model: String,
    pub knowledge_base_id: String,
    pub poet_enabled: bool,
    pub history: HistoryWindow,
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingInput,
    UserTurnRecorded,
    PrimaryGenerated,
    ChartPath,
    TextPath,
    SecondaryGenerated,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponsePath {
    Text,
    Chart(ChartStatus),
}

/// Summary of one processed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub path: ResponsePath,
    /// Text handed to the poet (explanation, stand-in, or the full answer).
    pub clean_text: String,
    pub poem: Option<String>,
    /// Turns appended to the conversation, user turn included.
    pub appended: usize,
    pub trail: Vec<TurnState>,
}

// =============================================================================
// ORCHESTRATOR
// =============================================================================

pub struct TurnOrchestrator {
    llm: Arc<dyn LlmGenerate>,
    settings: TurnSettings,
}

impl TurnOrchestrator {
    pub fn new(llm: Arc<dyn LlmGenerate>, settings: TurnSettings) -> Self {
        Self { llm, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &TurnSettings {
        &self.settings
    }

    /// Run one full turn for `user_input`.
    pub async fn process_turn(
        &self,
        conversation: &mut Conversation,
        sink: &mut dyn DisplaySink,
        user_input: &str,
    ) -> TurnOutcome {
        let before = conversation.len();
        let mut trail = vec![TurnState::AwaitingInput];
        info!(input_len = user_input.len(), history = before, "turn: user input");

        conversation.push(Turn::user(user_input));
        trail.push(TurnState::UserTurnRecorded);

        let transcript = build_transcript(conversation, self.settings.history);
        let answer = self.primary(&transcript).await;
        trail.push(TurnState::PrimaryGenerated);

        // An empty block carries nothing to run; the answer stays plain text.
        let (path, clean_text) = match extract_python_code(&answer).filter(|code| !code.is_empty()) {
            Some(code) => {
                trail.push(TurnState::ChartPath);
                let explanation = remove_python_blocks(&answer);
                let clean_text = if explanation.is_empty() {
                    CHART_ONLY_TEXT.to_string()
                } else {
                    sink.show_text(Role::Assistant, &explanation);
                    explanation
                };
                let status = visualize(&code, conversation, sink);
                (ResponsePath::Chart(status), clean_text)
            }
            None => {
                trail.push(TurnState::TextPath);
                sink.show_text(Role::Assistant, &answer);
                conversation.push(Turn::assistant(answer.clone()));
                (ResponsePath::Text, answer)
            }
        };

        let poem = if self.settings.poet_enabled && !clean_text.is_empty() {
            let haiku = self.poet(&clean_text).await;
            sink.show_text(Role::Assistant, &format!("🟣 *Poet bot*\n\n{haiku}"));
            conversation.push(Turn::assistant(format!("Poet bot:\n{haiku}")));
            trail.push(TurnState::SecondaryGenerated);
            Some(haiku)
        } else {
            None
        };
        trail.push(TurnState::Idle);

        let appended = conversation.len() - before;
        info!(path = ?path, appended, poem = poem.is_some(), "turn: complete");
        TurnOutcome { path, clean_text, poem, appended, trail }
    }

    /// Grounded answer; failures become the answer text.
    async fn primary(&self, transcript: &str) -> String {
        let request = GenerationRequest::new(&self.settings.model, transcript, self.settings.persona.instructions())
            .with_tool(RetrievalTool::file_search(&self.settings.knowledge_base_id))
            .with_max_output_tokens(self.settings.max_output_tokens);

        match self.llm.generate(&request).await {
            Ok(generation) => {
                info!(
                    model = %generation.model,
                    input_tokens = generation.input_tokens,
                    output_tokens = generation.output_tokens,
                    "turn: primary generated"
                );
                generation.text
            }
            Err(e) => {
                warn!(error_code = e.error_code(), retryable = e.retryable(), error = %e, "turn: primary failed");
                format!("Sorry, there was an error calling the API:\n\n```\n{e}\n```")
            }
        }
    }

    /// Haiku over the clean text; no tools, trimmed.
    async fn poet(&self, clean_text: &str) -> String {
        let request = GenerationRequest::new(
            &self.settings.model,
            format!("{POET_INPUT_PREFIX}{clean_text}"),
            POET_INSTRUCTIONS,
        )
        .with_max_output_tokens(self.settings.max_output_tokens);

        match self.llm.generate(&request).await {
            Ok(generation) => {
                info!(output_tokens = generation.output_tokens, "turn: poet generated");
                generation.text.trim().to_string()
            }
            Err(e) => {
                warn!(error_code = e.error_code(), error = %e, "turn: poet failed");
                format!("_Haiku generation error:_ `{e}`")
            }
        }
    }
}

#[cfg(test)]
#[path = "turn_test.rs"]
mod tests;

//! Test doubles shared by unit tests: a scripted LLM and a recording sink.

use std::collections::VecDeque;

use tokio::sync::Mutex;

use crate::chart::Figure;
use crate::conversation::Role;
use crate::display::DisplaySink;
use crate::llm::LlmGenerate;
use crate::llm::types::{Generation, GenerationRequest, LlmError};

// =============================================================================
// MockLlm
// =============================================================================

/// Replays scripted results in order and records every request.
pub struct MockLlm {
    responses: Mutex<VecDeque<Result<Generation, LlmError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockLlm {
    pub fn new(responses: Vec<Result<Generation, LlmError>>) -> Self {
        Self { responses: Mutex::new(responses.into()), requests: Mutex::new(Vec::new()) }
    }

    /// Every call succeeds with the next text.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(generation(t))).collect())
    }

    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }
}

pub fn generation(text: &str) -> Generation {
    Generation { text: text.into(), model: "mock".into(), input_tokens: 10, output_tokens: 5 }
}

#[async_trait::async_trait]
impl LlmGenerate for MockLlm {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        self.requests.lock().await.push(request.clone());
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::ApiRequest("no scripted response".into())))
    }
}

// =============================================================================
// RecordingSink
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Text(Role, String),
    Chart(Figure, Option<String>),
    Info(String),
    Error(String),
    Prompt,
}

/// Captures display calls for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text events attributed to the assistant, in order.
    pub fn assistant_texts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Text(Role::Assistant, text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn charts(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SinkEvent::Chart(..)))
            .count()
    }
}

impl DisplaySink for RecordingSink {
    fn show_text(&mut self, role: Role, text: &str) {
        self.events.push(SinkEvent::Text(role, text.to_string()));
    }

    fn show_chart(&mut self, figure: &Figure, caption: Option<&str>) {
        self.events
            .push(SinkEvent::Chart(figure.clone(), caption.map(str::to_string)));
    }

    fn show_info(&mut self, text: &str) {
        self.events.push(SinkEvent::Info(text.to_string()));
    }

    fn show_error(&mut self, text: &str) {
        self.events.push(SinkEvent::Error(text.to_string()));
    }

    fn prompt(&mut self) {
        self.events.push(SinkEvent::Prompt);
    }
}

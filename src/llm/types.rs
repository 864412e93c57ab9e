//! LLM types: generation requests, responses, and errors.
//!
//! Provider-neutral shapes shared by the Responses API client and the turn
//! pipeline. A [`GenerationRequest`] is built once per call and never mutated.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The knowledge-base (vector store) identifier is not set.
    #[error("missing knowledge base: env var {var} not set (required for file_search)")]
    MissingKnowledgeBase { var: String },

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}: {body}")]
    ApiResponse { status: u16, body: String },

    /// The LLM provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::MissingKnowledgeBase { .. } => "E_MISSING_KNOWLEDGE_BASE",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// TOOLS
// =============================================================================

/// A hosted tool attached to a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RetrievalTool {
    /// Document search over one or more hosted vector stores.
    #[serde(rename = "file_search")]
    FileSearch { vector_store_ids: Vec<String> },
}

impl RetrievalTool {
    /// File search over a single knowledge base.
    #[must_use]
    pub fn file_search(knowledge_base_id: impl Into<String>) -> Self {
        Self::FileSearch { vector_store_ids: vec![knowledge_base_id.into()] }
    }
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// One generation call: model, linear input text, instructions, tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    model: String,
    input: String,
    instructions: String,
    tools: Vec<RetrievalTool>,
    max_output_tokens: Option<u32>,
}

impl GenerationRequest {
    #[must_use]
    pub fn new(model: impl Into<String>, input: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            instructions: instructions.into(),
            tools: Vec::new(),
            max_output_tokens: None,
        }
    }

    #[must_use]
    pub fn with_tool(mut self, tool: RetrievalTool) -> Self {
        self.tools.push(tool);
        self
    }

    #[must_use]
    pub fn with_max_output_tokens(mut self, max: Option<u32>) -> Self {
        self.max_output_tokens = max;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    #[must_use]
    pub fn tools(&self) -> &[RetrievalTool] {
        &self.tools
    }

    #[must_use]
    pub fn max_output_tokens(&self) -> Option<u32> {
        self.max_output_tokens
    }
}

/// Response from a generation call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Generation {
    /// Concatenated output text (may be empty).
    pub text: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// =============================================================================
// LLM GENERATE TRAIT
// =============================================================================

/// Provider-neutral async trait for text generation. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LlmGenerate: Send + Sync {
    /// Send one generation request and wait for the full response.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails or the response is malformed.
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

//! LLM configuration parsed from environment variables.

use super::types::LlmError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const VECTOR_STORE_VAR: &str = "OPENAI_VECTOR_STORE_ID";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub knowledge_base_id: String,
    pub base_url: String,
    pub timeouts: LlmTimeouts,
    pub max_output_tokens: Option<u32>,
}

impl LlmConfig {
    /// Build typed LLM config from environment variables.
    ///
    /// Required:
    /// - `OPENAI_API_KEY`
    /// - `OPENAI_VECTOR_STORE_ID` (knowledge base for `file_search`)
    ///
    /// Optional:
    /// - `OPENAI_MODEL`: `default_model` when absent
    /// - `OPENAI_BASE_URL`: default OpenAI API base URL
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    /// - `LLM_MAX_OUTPUT_TOKENS`: provider default when absent
    ///
    /// Blank values count as missing.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] or [`LlmError::MissingKnowledgeBase`]
    /// naming the absent variable, or [`LlmError::ConfigParse`] for a malformed
    /// numeric value.
    pub fn from_env(default_model: &str) -> Result<Self, LlmError> {
        let api_key = env_value(API_KEY_VAR).ok_or_else(|| LlmError::MissingApiKey { var: API_KEY_VAR.into() })?;
        let knowledge_base_id =
            env_value(VECTOR_STORE_VAR).ok_or_else(|| LlmError::MissingKnowledgeBase { var: VECTOR_STORE_VAR.into() })?;

        let model = env_value("OPENAI_MODEL").unwrap_or_else(|| default_model.to_string());
        let base_url = env_value("OPENAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = LlmTimeouts {
            request_secs: env_parse_u64("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
        };
        let max_output_tokens = parse_max_output_tokens(env_value("LLM_MAX_OUTPUT_TOKENS").as_deref())?;

        Ok(Self { api_key, model, knowledge_base_id, base_url, timeouts, max_output_tokens })
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    env_value(key)
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_max_output_tokens(raw: Option<&str>) -> Result<Option<u32>, LlmError> {
    match raw {
        None => Ok(None),
        Some(v) => v
            .parse::<u32>()
            .map(Some)
            .map_err(|e| LlmError::ConfigParse(format!("LLM_MAX_OUTPUT_TOKENS '{v}': {e}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

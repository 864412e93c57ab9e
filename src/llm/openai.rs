//! OpenAI Responses API client.
//!
//! Sends a single linear `input` string with `instructions` and optional
//! hosted tools to `/v1/responses`, and folds the returned output items back
//! into one text answer.

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::config::LlmTimeouts;
use super::types::{Generation, GenerationRequest, LlmError, RetrievalTool};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// Build a client with explicit timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::HttpClientBuild`] if the TLS backend fails to initialize.
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url: base_url.trim_end_matches('/').to_string() })
    }

    /// `POST {base_url}/responses`.
    ///
    /// # Errors
    ///
    /// Transport failures, non-200 statuses, and unparseable bodies.
    pub async fn responses(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        let body = RespRequest::from(request);
        let text = self.send_json("/responses", &body).await?;
        parse_responses_response(&text)
    }

    async fn send_json(&self, path: &str, body: &impl Serialize) -> Result<String, LlmError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }
        Ok(text)
    }
}

// =============================================================================
// RESPONSES WIRE TYPES
// =============================================================================

#[derive(Serialize)]
pub(crate) struct RespRequest<'a> {
    model: &'a str,
    input: &'a str,
    instructions: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [RetrievalTool]>,
}

impl<'a> From<&'a GenerationRequest> for RespRequest<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            model: request.model(),
            input: request.input(),
            instructions: request.instructions(),
            max_output_tokens: request.max_output_tokens(),
            tools: Some(request.tools()).filter(|t| !t.is_empty()),
        }
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

/// Collapse a Responses API body into a [`Generation`].
///
/// Text parts of every `message` output item are concatenated in order, the
/// same way the SDK's `output_text` convenience does. Tool-call items such as
/// `file_search_call` carry no answer text and are skipped. When `output` is
/// absent the top-level `output_text` field is used.
pub(crate) fn parse_responses_response(json_text: &str) -> Result<Generation, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    if let Some(message) = root
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
    {
        return Err(LlmError::ApiParse(format!("responses: {message}")));
    }

    let model = root
        .get("model")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default();
    let input_tokens = root
        .get("usage")
        .and_then(|u| u.get("input_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let output_tokens = root
        .get("usage")
        .and_then(|u| u.get("output_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let mut text = String::new();
    if let Some(items) = root.get("output").and_then(Value::as_array) {
        for item in items {
            if item.get("type").and_then(Value::as_str) != Some("message") {
                continue;
            }
            let Some(parts) = item.get("content").and_then(Value::as_array) else {
                continue;
            };
            for part in parts {
                let kind = part.get("type").and_then(Value::as_str);
                if !matches!(kind, Some("output_text" | "text")) {
                    continue;
                }
                if let Some(t) = part.get("text").and_then(Value::as_str) {
                    text.push_str(t);
                }
            }
        }
    } else if let Some(output_text) = root.get("output_text").and_then(Value::as_str) {
        text.push_str(output_text);
    }

    Ok(Generation { text, model, input_tokens, output_tokens })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;

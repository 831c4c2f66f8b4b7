//! OpenAI-compatible chat completion client (Groq, OpenAI, vLLM, Ollama).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::services::llm::{ChatMessage, CompletionRequest, LlmError, LlmProvider};

pub struct OpenAiCompatibleProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::InvalidRequest(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

impl<'a> WireRequest<'a> {
    fn from_request(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request
                .json_mode
                .then_some(ResponseFormat { kind: "json_object" }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: Option<WireMessage>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: Option<String>,
}

/// Pull the first choice's text out of a completion response.
fn first_choice_text(response: WireResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|content| !content.is_empty())
        .ok_or_else(|| LlmError::InvalidResponse("No content in LLM response".to_string()))
}

fn status_error(status: StatusCode, text: String) -> LlmError {
    match status.as_u16() {
        401 | 403 => LlmError::Authentication(text),
        429 => LlmError::RateLimited(text),
        408 => LlmError::Timeout,
        s if s >= 500 => LlmError::ServiceUnavailable(format!("API error {status}: {text}")),
        _ => LlmError::InvalidRequest(format!("API error {status}: {text}")),
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = WireRequest::from_request(request);
        tracing::debug!(model = %request.model, url = %self.chat_url(), "Sending chat completion request");

        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            tracing::warn!(status = %status, "LLM provider returned error status");
            return Err(status_error(status, text));
        }

        let parsed: WireResponse = response.json().await?;
        first_choice_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(json_mode: bool) -> CompletionRequest {
        CompletionRequest {
            model: "llama-3.3-70b-versatile".to_string(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("usr")],
            temperature: 0.0,
            max_tokens: 512,
            json_mode,
        }
    }

    #[test]
    fn wire_request_requests_json_object() {
        let req = request(true);
        let json = serde_json::to_value(WireRequest::from_request(&req)).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["max_tokens"], 512);
        assert_eq!(json["response_format"], json!({ "type": "json_object" }));
        assert_eq!(json["messages"][0], json!({ "role": "system", "content": "sys" }));
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn wire_request_omits_format_without_json_mode() {
        let req = request(false);
        let json = serde_json::to_value(WireRequest::from_request(&req)).unwrap();
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn first_choice_extracted() {
        let response: WireResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "{\"a\":1}" } },
                { "index": 1, "message": { "role": "assistant", "content": "ignored" } }
            ]
        }))
        .unwrap();
        assert_eq!(first_choice_text(response).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn empty_choices_is_invalid_response() {
        let response: WireResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert!(matches!(
            first_choice_text(response),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "bad key".into()),
            LlmError::Authentication(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "quota".into()),
            LlmError::RateLimited(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "upstream".into()),
            LlmError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "bad model".into()),
            LlmError::InvalidRequest(_)
        ));
    }

    #[test]
    fn chat_url_appends_path() {
        let config = LlmConfig {
            api_key: "k".to_string(),
            base_url: "http://localhost:11434/v1".to_string(),
            model: "m".to_string(),
            max_tokens: 16,
            timeout_secs: 5,
            max_retries: 0,
            initial_backoff_ms: 1,
            max_backoff_ms: 1,
        };
        let provider = OpenAiCompatibleProvider::new(&config).unwrap();
        assert_eq!(provider.chat_url(), "http://localhost:11434/v1/chat/completions");
    }
}

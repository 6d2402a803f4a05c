//! Google Gemini implementation of [`Assistant`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wmforge_common::config::AssistantConfig;

use crate::provider::{Assistant, AssistantError};

const SYSTEM_INSTRUCTION: &str = "You are an FFmpeg expert helping a user build a \
command that overlays a watermark on videos, optionally trimming, retiming, cropping \
and rescaling them, either for one file or as a batch script. Answer concisely and \
show command-line snippets where useful.";

/// Gemini `generateContent` client.
pub struct GeminiAssistant {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiAssistant {
    pub fn new(config: &AssistantConfig, api_key: impl Into<String>) -> Result<Self, AssistantError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AssistantError::MissingApiKey(config.api_key_env.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| AssistantError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client,
        })
    }

    /// Build a client with the key read from `config.api_key_env`.
    pub fn from_env(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let key = std::env::var(&config.api_key_env)
            .map_err(|_| AssistantError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, key)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl Assistant for GeminiAssistant {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn ask(&self, context: &str, question: &str) -> Result<String, AssistantError> {
        let request = build_request(context, question);

        tracing::debug!(model = %self.model, "Sending assistant request");

        // Key goes in a header so it never appears in logged URLs.
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::Request(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        parse_answer(&body)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn build_request(context: &str, question: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: format!("Context: {context}\n\nQuestion: {question}"),
            }],
        }],
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: SYSTEM_INSTRUCTION.to_string(),
            }],
        },
    }
}

fn api_error(status: u16, body: &str) -> AssistantError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.to_string());
    AssistantError::Api { status, message }
}

fn parse_answer(body: &str) -> Result<String, AssistantError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| AssistantError::Malformed(e.to_string()))?;

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AssistantError::Blocked(reason));
    }

    let text = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(AssistantError::EmptyAnswer);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = build_request("[Single Mode] ...", "How do I rotate?");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        let text = json["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("Context: [Single Mode] ..."));
        assert!(text.ends_with("Question: How do I rotate?"));
        assert!(json["systemInstruction"].get("role").is_none());
        assert!(json["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("FFmpeg"));
    }

    #[test]
    fn test_parse_answer_joins_parts() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Use "},{"text":"rotate=PI/4"}]}}]}"#;
        assert_eq!(parse_answer(body).unwrap(), "Use rotate=PI/4");
    }

    #[test]
    fn test_parse_answer_reports_block() {
        let body = r#"{"candidates":[],"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert_eq!(
            parse_answer(body).unwrap_err(),
            AssistantError::Blocked("SAFETY".to_string())
        );
    }

    #[test]
    fn test_parse_answer_empty_and_malformed() {
        assert_eq!(
            parse_answer(r#"{"candidates":[]}"#).unwrap_err(),
            AssistantError::EmptyAnswer
        );
        assert!(matches!(
            parse_answer("<html>").unwrap_err(),
            AssistantError::Malformed(_)
        ));
    }

    #[test]
    fn test_api_error_prefers_structured_message() {
        let err = api_error(403, r#"{"error":{"code":403,"message":"API key invalid"}}"#);
        assert_eq!(
            err,
            AssistantError::Api {
                status: 403,
                message: "API key invalid".to_string()
            }
        );
        let raw = api_error(502, "Bad gateway");
        assert_eq!(raw.to_string(), "API error (502): Bad gateway");
    }

    #[test]
    fn test_new_rejects_blank_key() {
        let config = AssistantConfig::default();
        let err = GeminiAssistant::new(&config, "  ").err().unwrap();
        assert_eq!(err, AssistantError::MissingApiKey("GEMINI_API_KEY".to_string()));
    }

    #[test]
    fn test_endpoint_uses_configured_model() {
        let config = AssistantConfig {
            base_url: "http://localhost:8080/v1beta/".to_string(),
            model: "test-model".to_string(),
            ..AssistantConfig::default()
        };
        let assistant = GeminiAssistant::new(&config, "key").unwrap();
        assert_eq!(
            assistant.endpoint(),
            "http://localhost:8080/v1beta/models/test-model:generateContent"
        );
    }
}

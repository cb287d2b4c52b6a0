use crate::error::{RecommenderError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Message in chat-completion format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Stateless text completion: messages in, one completion string out
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint (Ollama, vLLM, OpenAI)
#[derive(Clone)]
pub struct LlmClient {
    api_key: Option<String>,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, model: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatCompletion for LlmClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
        });

        debug!(model = %self.model, messages = messages.len(), "Calling LLM");

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| RecommenderError::Llm(format!("LLM API call failed: {}", e)))?;

        // Check HTTP status
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RecommenderError::Llm(format!(
                "LLM API error ({}): {}",
                status, error_text
            )));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RecommenderError::Llm(format!("Failed to parse LLM response: {}", e)))?;

        extract_content(&response_json)
    }
}

/// Pull the first choice's message content out of a completion response
fn extract_content(response_json: &serde_json::Value) -> Result<String> {
    if let Some(error) = response_json.get("error") {
        return Err(RecommenderError::Llm(format!("LLM API error: {}", error)));
    }

    let choices = response_json
        .get("choices")
        .and_then(|c| c.as_array())
        .ok_or_else(|| {
            RecommenderError::Llm(format!(
                "No choices array in LLM response. Response: {}",
                response_json
            ))
        })?;

    let first = choices.first().ok_or_else(|| {
        RecommenderError::Llm("Empty choices array in LLM response".to_string())
    })?;

    if let Some(finish_reason) = first.get("finish_reason").and_then(|r| r.as_str()) {
        if finish_reason == "length" {
            warn!("LLM response was truncated due to length limit");
        } else if finish_reason == "content_filter" {
            return Err(RecommenderError::Llm(
                "LLM response was filtered by content policy".to_string(),
            ));
        }
    }

    let content = first["message"]["content"].as_str().ok_or_else(|| {
        RecommenderError::Llm(format!(
            "No content in LLM response. Response structure: {}",
            response_json
        ))
    })?;

    Ok(content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messages_serialize_with_lowercase_roles() {
        let messages = vec![
            ChatMessage::system("You answer questions directly."),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ];
        let value = serde_json::to_value(&messages).unwrap();
        assert_eq!(
            value,
            json!([
                {"role": "system", "content": "You answer questions directly."},
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"}
            ])
        );
    }

    #[test]
    fn test_extract_content_trims() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "  Paris.\n"}, "finish_reason": "stop"}]
        });
        assert_eq!(extract_content(&response).unwrap(), "Paris.");
    }

    #[test]
    fn test_extract_content_errors() {
        assert!(extract_content(&json!({"error": {"message": "model not found"}})).is_err());
        assert!(extract_content(&json!({"choices": []})).is_err());
        assert!(extract_content(&json!({"choices": [{"message": {}}]})).is_err());
        assert!(extract_content(&json!({
            "choices": [{"message": {"content": "x"}, "finish_reason": "content_filter"}]
        }))
        .is_err());
    }

    #[test]
    fn test_base_url_normalized() {
        let client = LlmClient::new(None, "llama3.1:latest".to_string(), "http://127.0.0.1:11434/v1/".to_string());
        assert_eq!(client.base_url(), "http://127.0.0.1:11434/v1");
        assert_eq!(client.model(), "llama3.1:latest");
    }
}

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::LlmConfig;

/// One role-tagged message in a chat-completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a message list and return the generated text.
    async fn complete(&self, messages: Vec<ChatMessage>) -> anyhow::Result<String>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// OpenAI-style `/chat/completions` client, shared by every assistant
/// operation.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, config: &LlmConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> anyhow::Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = CompletionRequest {
            model: &self.model,
            messages: &messages,
        };

        debug!(url = %url, model = %self.model, messages = messages.len(), "calling chat completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("send chat completion request")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            error!(status = %status, body = %error_body, "chat completion returned error status");
            return Err(anyhow!("chat completion returned status {}", status));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .context("decode chat completion response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("chat completion response contains no choices"))?;

        if content.is_empty() {
            return Err(anyhow!("chat completion response text is empty"));
        }

        debug!(response_len = content.len(), "chat completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serial_test::serial;

    fn client_for(base_url: &str) -> OpenAiClient {
        OpenAiClient::new(
            reqwest::Client::new(),
            &LlmConfig {
                api_key: "test-key".into(),
                base_url: base_url.into(),
                model: "gpt-4".into(),
                timeout_secs: 5,
            },
        )
    }

    #[tokio::test]
    #[serial]
    async fn complete_returns_first_choice_content() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(
                r#"{
                    "choices": [
                        {"message": {"role": "assistant", "content": "Hello there"}},
                        {"message": {"role": "assistant", "content": "ignored"}}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let result = client_for(&server.url())
            .complete(vec![ChatMessage::user("hi")])
            .await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), "Hello there");
    }

    #[tokio::test]
    #[serial]
    async fn complete_surfaces_error_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": "rate limited"}"#)
            .create_async()
            .await;

        let result = client_for(&server.url())
            .complete(vec![ChatMessage::user("hi")])
            .await;

        mock.assert_async().await;
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("429"), "unexpected error: {}", msg);
    }

    #[tokio::test]
    #[serial]
    async fn complete_rejects_empty_choices() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let result = client_for(&server.url())
            .complete(vec![ChatMessage::user("hi")])
            .await;

        mock.assert_async().await;
        assert!(result.unwrap_err().to_string().contains("no choices"));
    }

    #[tokio::test]
    #[serial]
    async fn complete_rejects_undecodable_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("this is not JSON")
            .create_async()
            .await;

        let result = client_for(&server.url())
            .complete(vec![ChatMessage::user("hi")])
            .await;

        mock.assert_async().await;
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("decode chat completion response"));
    }
}

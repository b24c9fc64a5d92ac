//! Outbound client for the chat-completions provider behind `/api/insights`.
//!
//! One request per insight: a fixed system turn plus a user turn carrying
//! the mood and notes. The completion text comes back untouched. A transient
//! transport failure (connect error or timeout) is retried once; status
//! errors and malformed bodies are not.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::InsightConfig;

pub const SYSTEM_PROMPT: &str = "You are an empathetic Jungian therapist with a high-level understanding of \
neurology and cognitive functioning. You are a good listener. Offer advice in a non-direct manner, \
such as \"I wonder if exploring...\" or \"Studies have shown that those who...\". This indirectly \
implies this is not medical advice while assisting the person with pathways toward increased health.";

/// Stand-in for absent or empty notes.
pub const NOTES_PLACEHOLDER: &str = "None provided";

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("insight provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("insight provider returned {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("insight provider sent a malformed response: {0}")]
    Malformed(reqwest::Error),

    #[error("insight provider returned no completion")]
    EmptyCompletion,
}

impl InsightError {
    /// The provider's own error message, when it sent one.
    pub fn upstream_message(&self) -> Option<String> {
        match self {
            InsightError::Status { message, .. } => message.clone(),
            _ => None,
        }
    }

    fn is_transient(&self) -> bool {
        matches!(self, InsightError::Transport(e) if e.is_connect() || e.is_timeout())
    }
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

pub fn build_messages(mood: &str, notes: Option<&str>) -> [ChatMessage; 2] {
    let notes = notes.filter(|n| !n.is_empty()).unwrap_or(NOTES_PLACEHOLDER);
    [
        ChatMessage {
            role: "system",
            content: SYSTEM_PROMPT.to_string(),
        },
        ChatMessage {
            role: "user",
            content: format!(
                "User's mood: {mood}. Notes: {notes}. Provide empathetic insights."
            ),
        },
    ]
}

/// Pulls `error.message` (or a bare string `error`) out of a provider error body.
fn error_message(body: &serde_json::Value) -> Option<String> {
    let error = body.get("error")?;
    error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())
        .map(String::from)
}

#[derive(Debug, Clone, Default)]
pub struct InsightClient {
    http: reqwest::Client,
}

impl InsightClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub async fn generate(
        &self,
        config: &InsightConfig,
        mood: &str,
        notes: Option<&str>,
    ) -> Result<String, InsightError> {
        let messages = build_messages(mood, notes);
        let request = ChatRequest {
            model: &config.model,
            messages: &messages,
        };

        match self.send(config, &request).await {
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, "Insight provider transport failure, retrying once");
                self.send(config, &request).await
            }
            other => other,
        }
    }

    async fn send(
        &self,
        config: &InsightConfig,
        request: &ChatRequest<'_>,
    ) -> Result<String, InsightError> {
        let response = self
            .http
            .post(&config.api_url)
            .bearer_auth(&config.api_key)
            .timeout(Duration::from_secs(config.timeout_secs))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .as_ref()
                .and_then(error_message);
            return Err(InsightError::Status { status, message });
        }

        let completion: ChatResponse = response.json().await.map_err(InsightError::Malformed)?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(InsightError::EmptyCompletion)
    }
}

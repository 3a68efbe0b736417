use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::state::ChatMessage;

/// Reply used when the endpoint answers without `choices[0].message.content`.
pub const FALLBACK_REPLY: &str =
    "I apologize, but I did not receive a proper response. Please try again.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

/// Why a chat request did not produce a reply.
///
/// The display text is the "reason" shown to the user.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The endpoint answered with a non-2xx status.
    #[error("Server error: {status}")]
    Server { status: StatusCode },
    /// The request never completed or the body could not be read.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// The task running the request stopped before producing a result.
    #[error("Request interrupted: {0}")]
    Interrupted(String),
}

impl ChatError {
    /// Full message for the error region.
    pub fn user_message(&self) -> String {
        format!(
            "Unable to send message: {}. Please check your connection and try again.",
            self
        )
    }
}

/// Client for the chat endpoint: one JSON POST per turn.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send the full history and return the assistant reply text.
    pub async fn send(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        tracing::debug!(endpoint = %self.endpoint, messages = messages.len(), "sending chat request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&ChatRequest { messages })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Server { status });
        }

        let body: Value = response.json().await?;
        Ok(extract_reply(&body))
    }
}

/// Pull `choices[0].message.content` out of a response body, falling back to
/// [`FALLBACK_REPLY`] when the path is missing, not a string, or empty.
pub fn extract_reply(body: &Value) -> String {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
        .unwrap_or(FALLBACK_REPLY)
        .to_string()
}

//! LLM provider abstraction and implementations.
//!
//! The analysis and chat contracts only need one operation from a backend:
//! turn an ordered message list (plus an optional system instruction and
//! response schema) into text. [`LlmProvider`] is that seam; Gemini is the
//! production implementation.

pub mod gemini;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::AiError;

/// Environment variables holding the API key, in lookup order.
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    /// The person using the application.
    User,
    /// The AI assistant.
    Assistant,
}

/// A message sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message.
    pub role: ChatRole,
    /// Plain-text content.
    pub text: String,
}

impl Message {
    /// Creates a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

/// A single generation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    /// Conversation so far, oldest first. The last message is the prompt.
    pub messages: Vec<Message>,
    /// Fixed instruction constraining the model's persona and topic.
    pub system_instruction: Option<String>,
    /// JSON schema the response must follow. When set, the provider asks
    /// for `application/json` output.
    pub response_schema: Option<serde_json::Value>,
}

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generates a response and returns its text (possibly empty).
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails or the provider rejects it.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError>;
}

/// Creates the Gemini provider from environment variables.
///
/// Reads `GEMINI_API_KEY` (falling back to `API_KEY`), `AI_MODEL` and
/// `AI_BASE_URL`. Never fails: a missing key is reported as
/// [`AiError::MissingApiKey`] when the provider is first used, so the
/// application can still start and show a configuration error.
#[must_use]
pub fn create_provider_from_env() -> Box<dyn LlmProvider> {
    let api_key = API_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|key| !key.trim().is_empty());

    if api_key.is_none() {
        log::warn!(
            "No AI credentials detected. Set GEMINI_API_KEY (or API_KEY) to enable analysis and chat."
        );
    }

    let model = std::env::var("AI_MODEL").unwrap_or_else(|_| gemini::DEFAULT_MODEL.to_string());
    let base_url =
        std::env::var("AI_BASE_URL").unwrap_or_else(|_| gemini::DEFAULT_BASE_URL.to_string());

    log::info!("Using Gemini model {model} at {base_url}");

    Box::new(gemini::GeminiProvider::new(api_key, model).with_base_url(base_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_labels_match_wire_names() {
        assert_eq!(ChatRole::Assistant.to_string(), "assistant");
        assert_eq!(
            serde_json::to_string(&Message::user("Hi")).unwrap(),
            r#"{"role":"user","text":"Hi"}"#
        );
    }
}

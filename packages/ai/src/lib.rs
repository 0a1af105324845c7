#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! AI client adapter for Urbis.
//!
//! Two contracts sit on top of a pluggable [`providers::LlmProvider`]:
//!
//! * [`analysis::request_analysis`] asks for a structured JSON analysis of a
//!   location and returns a validated [`urbis_analysis_models::AnalysisResult`].
//! * [`chat::send_chat_message`] forwards a follow-up question with the
//!   prior conversation to the "Urbo" assistant.
//!
//! Provider errors ([`AiError`]) are mapped to user-facing categories
//! ([`analysis::AnalysisError`], [`chat::ChatError`]) at this boundary so
//! callers never show raw backend messages.

pub mod analysis;
pub mod chat;
pub mod providers;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

use std::sync::Arc;

use thiserror::Error;
use urbis_analysis_models::AnalysisResult;

use crate::analysis::AnalysisError;
use crate::chat::{ChatError, ConversationTurn};
use crate::providers::LlmProvider;

/// Errors that can occur talking to an LLM provider.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No API key is configured.
    #[error("API key is not configured")]
    MissingApiKey,

    /// The provider rejected the API key.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Provider's error message.
        message: String,
    },

    /// The provider refused to answer the prompt.
    #[error("Prompt blocked: {reason}")]
    Blocked {
        /// Provider's block reason.
        reason: String,
    },

    /// Provider-specific error.
    #[error("Provider error ({status}): {message}")]
    Provider {
        /// HTTP status code.
        status: u16,
        /// Description of what went wrong.
        message: String,
    },
}

impl AiError {
    /// Whether the error is due to missing or invalid credentials.
    #[must_use]
    pub const fn is_credential_error(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::Unauthorized { .. })
    }
}

/// Shared handle to the AI backend.
///
/// Cheap to clone; all clones share one provider.
#[derive(Clone)]
pub struct UrbisAi {
    provider: Arc<dyn LlmProvider>,
}

impl UrbisAi {
    /// Wraps an existing provider.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Builds the Gemini provider from environment configuration.
    ///
    /// See [`providers::create_provider_from_env`].
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            provider: Arc::from(providers::create_provider_from_env()),
        }
    }

    /// Requests a full analysis for `location`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if the analysis cannot be produced.
    pub async fn request_analysis(&self, location: &str) -> Result<AnalysisResult, AnalysisError> {
        analysis::request_analysis(self.provider.as_ref(), location).await
    }

    /// Asks the assistant a follow-up question.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError`] if no reply can be produced.
    pub async fn send_chat_message(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<String, ChatError> {
        chat::send_chat_message(self.provider.as_ref(), question, history).await
    }
}

//! Conversational follow-up assistant ("Urbo").

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::{ChatRole, GenerateRequest, LlmProvider, Message};

/// Persona and topic constraint for every chat request.
pub const SYSTEM_INSTRUCTION: &str = "You are Urbo, a helpful AI assistant powered by Google Gemini. You specialize in the Greater Toronto Area's population growth, infrastructure, and urban planning, based on data presented in this application. Answer the user's questions concisely and stay strictly on the topic of GTA growth. If a question is off-topic, politely decline to answer and guide the user back to the relevant subject.";

/// One turn of the conversation shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who said it.
    pub role: ChatRole,
    /// What was said.
    pub text: String,
}

impl ConversationTurn {
    /// Creates a user turn.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    /// Creates an assistant turn.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

impl From<&ConversationTurn> for Message {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            role: turn.role,
            text: turn.text.clone(),
        }
    }
}

/// The assistant could not answer. The message is user-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Sorry, I couldn't get a response from the AI. Please try again.")]
pub struct ChatError;

/// Asks the assistant `question` in the context of `history`.
///
/// `history` holds the prior turns only; the question is appended here as
/// the final user message.
///
/// # Errors
///
/// Returns [`ChatError`] if the question is blank, the backend fails, or
/// the reply is blank. The cause is logged.
pub async fn send_chat_message(
    provider: &dyn LlmProvider,
    question: &str,
    history: &[ConversationTurn],
) -> Result<String, ChatError> {
    if question.trim().is_empty() {
        log::warn!("Ignoring blank chat question");
        return Err(ChatError);
    }

    let mut messages: Vec<Message> = history.iter().map(Message::from).collect();
    messages.push(Message::user(question));

    let request = GenerateRequest {
        messages,
        system_instruction: Some(SYSTEM_INSTRUCTION.to_string()),
        response_schema: None,
    };

    let reply = provider.generate(&request).await.map_err(|e| {
        log::error!("Chat request failed: {e}");
        ChatError
    })?;

    if reply.trim().is_empty() {
        log::error!("Chat reply was empty");
        return Err(ChatError);
    }

    Ok(reply)
}

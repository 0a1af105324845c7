//! Conversation state for the follow-up assistant.
//!
//! Turns are append-only and only one question may be in flight. A submit
//! while a question is pending is dropped, never queued.

use urbis_ai::UrbisAi;
use urbis_ai::chat::{ChatError, ConversationTurn};

/// A question accepted for sending, with the history that preceded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChat {
    question: String,
    history: Vec<ConversationTurn>,
}

impl PendingChat {
    /// The trimmed question.
    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Turns before the question.
    #[must_use]
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }
}

/// Ordered chat history plus the in-flight flag.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
    pending: bool,
}

impl Conversation {
    /// Creates an empty conversation.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            turns: Vec::new(),
            pending: false,
        }
    }

    /// All turns, oldest first.
    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Number of turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turns have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Whether a question is awaiting its reply.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Accepts `text` as the next question.
    ///
    /// Returns `None` (and changes nothing) when `text` is blank or another
    /// question is still pending. Otherwise appends the user turn, marks the
    /// conversation pending, and returns what must be sent.
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingChat> {
        let question = text.trim();
        if question.is_empty() {
            return None;
        }
        if self.pending {
            log::debug!("Dropping chat submit while a reply is pending");
            return None;
        }

        let history = self.turns.clone();
        self.turns.push(ConversationTurn::user(question));
        self.pending = true;

        Some(PendingChat {
            question: question.to_string(),
            history,
        })
    }

    /// Records the outcome of the pending question.
    ///
    /// A failure becomes an assistant turn describing the error so the
    /// conversation can continue.
    pub fn finish(&mut self, result: Result<String, ChatError>) {
        if !self.pending {
            log::warn!("Chat reply arrived with no pending question; recording it anyway");
        }

        let turn = match result {
            Ok(reply) => ConversationTurn::assistant(reply),
            Err(e) => ConversationTurn::assistant(error_turn_text(&e)),
        };
        self.turns.push(turn);
        self.pending = false;
    }

    /// Submits `text` and waits for the reply.
    ///
    /// Returns `false` if the submit was rejected (blank or pending).
    pub async fn submit(&mut self, ai: &UrbisAi, text: &str) -> bool {
        let Some(pending) = self.begin_submit(text) else {
            return false;
        };

        let result = ai
            .send_chat_message(pending.question(), pending.history())
            .await;
        self.finish(result);
        true
    }
}

/// Text of the assistant turn recorded for a failed question.
#[must_use]
pub fn error_turn_text(err: &ChatError) -> String {
    format!("Sorry, something went wrong: {err}")
}

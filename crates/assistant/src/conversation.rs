//! Message log for the assistant panel.
//!
//! An exchange is split in three steps so the caller never holds the log
//! across an await point: [`Conversation::begin`] records the question and
//! snapshots the context, [`PendingExchange::run`] talks to the provider,
//! and [`Conversation::finish`] appends the answer. Settings may change
//! freely while a request is in flight.
//!
//! Answers are never dropped. An answer that arrives after the settings have
//! moved on is appended with `stale_context` set, so the UI can mark it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wmforge_edit_model::EditSettings;

use crate::context::summarize_context;
use crate::provider::{Assistant, AssistantError};

pub const GREETING: &str = "Hi! I can help you customize your FFmpeg command. Ask me \
anything like \"How do I make the watermark rotate?\" or \"How to crop the video?\".";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,

    /// RFC 3339 timestamp.
    pub sent_at: String,

    /// Answer was produced for settings that have since changed.
    #[serde(default)]
    pub stale_context: bool,

    /// Text is an error notice rather than a model answer.
    #[serde(default)]
    pub is_error: bool,
}

impl ChatMessage {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            sent_at: chrono::Utc::now().to_rfc3339(),
            stale_context: false,
            is_error: false,
        }
    }
}

/// Counter bumped on every settings change; clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct ContextGeneration(Arc<AtomicU64>);

impl ContextGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Record a settings change and return the new generation.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// A question that has been recorded but not yet answered.
#[derive(Debug, Clone)]
pub struct PendingExchange {
    pub question: String,
    pub context: String,
    pub generation: u64,
}

/// Result of running a [`PendingExchange`].
#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    pub generation: u64,
    pub result: Result<String, AssistantError>,
}

impl PendingExchange {
    pub async fn run(self, assistant: &dyn Assistant) -> ExchangeOutcome {
        let result = assistant.ask(&self.context, &self.question).await;
        if let Err(e) = &result {
            tracing::warn!(provider = assistant.name(), error = %e, "Assistant request failed");
        }
        ExchangeOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// The chat log shown next to the command.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    in_flight: usize,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::new(Role::Model, GREETING)],
            in_flight: 0,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether at least one question is still awaiting its answer.
    pub fn is_waiting(&self) -> bool {
        self.in_flight > 0
    }

    /// Record a question and snapshot the settings it refers to.
    pub fn begin(
        &mut self,
        question: &str,
        settings: &EditSettings,
        generation: u64,
    ) -> Result<PendingExchange, AssistantError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }

        self.messages.push(ChatMessage::new(Role::User, question));
        self.in_flight += 1;

        Ok(PendingExchange {
            question: question.to_string(),
            context: summarize_context(settings),
            generation,
        })
    }

    /// Append the answer (or a visible error notice) for a finished exchange.
    pub fn finish(&mut self, outcome: ExchangeOutcome, current_generation: u64) -> &ChatMessage {
        self.in_flight = self.in_flight.saturating_sub(1);

        let stale = outcome.generation != current_generation;
        if stale {
            tracing::debug!(
                asked_at = outcome.generation,
                current = current_generation,
                "Assistant answer refers to earlier settings"
            );
        }

        let mut message = match outcome.result {
            Ok(answer) => ChatMessage::new(Role::Model, answer),
            Err(e) => {
                let mut notice =
                    ChatMessage::new(Role::Model, format!("Sorry, I couldn't get an answer: {e}"));
                notice.is_error = true;
                notice
            }
        };
        message.stale_context = stale;

        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }
}

//! # Conversation Orchestration
//!
//! Ties retrieval, history, prompt assembly and generation together for each
//! inbound message, and enforces the outbound reply-length limit. The engine
//! is constructed once at startup and shared by all concurrent requests; the
//! only mutable state it touches is the history store, which serializes its
//! own writes.

use crate::{
    generate::{generate_answer, GenerationError},
    history::HistoryStore,
    index::VectorIndex,
    prompts::{build_prompt, join_context, Persona},
    providers::ai::{AiProvider, Embedder},
    search::{retrieve, SearchError},
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// The longest reply the transport will deliver, in characters.
pub const REPLY_CHAR_LIMIT: usize = 1900;

/// Appended to replies cut down to [`REPLY_CHAR_LIMIT`].
pub const TRUNCATION_MARKER: &str = "\n\u{2026} (truncated)";

/// Reply to a message with no text in it.
pub const EMPTY_MESSAGE_REPLY: &str = "(empty message)";

/// Generic reply when retrieval or generation failed for one message. The
/// failure stays local: the user gets an answer, the service keeps running.
pub const FAILURE_REPLY: &str =
    "Sorry, something went wrong while answering your question. Please try again later.";

/// One inbound message, delivered by the transport after it has verified
/// authenticity.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub user_id: String,
    pub message_id: Option<String>,
    pub text: String,
}

/// Tunables and display values for the engine.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// How many chunks to retrieve per question.
    pub retrieval_k: u32,
    /// How many prior turns to feed back into the prompt.
    pub max_history_turns: usize,
    /// Bounded wait on the chat model.
    pub generation_timeout: Duration,
    /// The indexed document's name, shown by `/source`.
    pub source_name: String,
    /// The embedding model id, shown by `/source`.
    pub embedding_model: String,
}

/// Errors raised on the answer path. `handle_message` converts them into the
/// fixed apology reply; they never escape the engine.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// The per-message pipeline: history → retrieval → prompt → generation →
/// truncation → history write-back.
pub struct ChatEngine {
    index: VectorIndex,
    embedder: Arc<dyn Embedder>,
    ai_provider: Arc<dyn AiProvider>,
    history: Arc<HistoryStore>,
    persona: Persona,
    config: ChatConfig,
}

impl ChatEngine {
    pub fn new(
        index: VectorIndex,
        embedder: Arc<dyn Embedder>,
        ai_provider: Arc<dyn AiProvider>,
        history: Arc<HistoryStore>,
        persona: Persona,
        config: ChatConfig,
    ) -> Self {
        Self {
            index,
            embedder,
            ai_provider,
            history,
            persona,
            config,
        }
    }

    /// Produces the reply for one inbound message. Never fails: command and
    /// empty messages short-circuit, and pipeline errors become the fixed
    /// apology text.
    pub async fn handle_message(&self, msg: &InboundMessage) -> String {
        let text = msg.text.trim();
        if text.is_empty() {
            return EMPTY_MESSAGE_REPLY.to_string();
        }

        // Commands bypass retrieval and generation entirely.
        match text.to_lowercase().as_str() {
            "/help" | "help" => return self.help_text(),
            "/source" => {
                return format!(
                    "Indexed PDF: {}\nEmbeddings: {}\nTop-k: {}",
                    self.config.source_name, self.config.embedding_model, self.config.retrieval_k
                )
            }
            "/id" => {
                return format!(
                    "msg id: {}",
                    msg.message_id.as_deref().unwrap_or("unknown")
                )
            }
            _ => {}
        }

        match self.answer_question(&msg.user_id, text).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Failed to answer message from {}: {e}", msg.user_id);
                FAILURE_REPLY.to_string()
            }
        }
    }

    async fn answer_question(&self, user_id: &str, question: &str) -> Result<String, ChatError> {
        let history = self
            .history
            .load(user_id, self.config.max_history_turns)
            .await;

        let chunks = retrieve(
            &self.index,
            self.embedder.as_ref(),
            question,
            self.config.retrieval_k,
        )
        .await?;
        info!("Retrieved {} chunks for user {user_id}.", chunks.len());

        let context = join_context(&chunks);
        let prompt = build_prompt(&history, &context, question, &self.persona);
        let answer = generate_answer(
            self.ai_provider.as_ref(),
            &prompt,
            self.config.generation_timeout,
        )
        .await?;

        let answer = truncate_reply(answer);

        // The reply is already decided; losing one audit record is not worth
        // failing the message over.
        if let Err(e) = self.history.append(user_id, question, &answer).await {
            warn!("Failed to append chat history for {user_id}: {e}");
        }

        Ok(answer)
    }

    fn help_text(&self) -> String {
        "Hi! Send me a question about the PDF and I'll answer using RAG.\n\n\
         Commands:\n\
         - /source : show PDF + embedding info\n\
         - /id : echo message id\n"
            .to_string()
    }
}

/// Cuts replies down to [`REPLY_CHAR_LIMIT`] characters (character
/// boundaries, not bytes) and appends the truncation marker.
fn truncate_reply(answer: String) -> String {
    if answer.chars().count() <= REPLY_CHAR_LIMIT {
        return answer;
    }
    let mut truncated: String = answer.chars().take(REPLY_CHAR_LIMIT).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_replies_pass_through_untouched() {
        assert_eq!(truncate_reply("hello".to_string()), "hello");
    }

    #[test]
    fn long_replies_are_cut_at_the_character_limit() {
        let reply = truncate_reply("x".repeat(2000));
        assert_eq!(
            reply.chars().count(),
            REPLY_CHAR_LIMIT + TRUNCATION_MARKER.chars().count()
        );
        assert!(reply.ends_with("\u{2026} (truncated)"));
    }

    #[test]
    fn truncation_respects_character_boundaries() {
        // Multi-byte characters must not be split mid-codepoint.
        let reply = truncate_reply("\u{0E2A}".repeat(1901));
        assert!(reply.starts_with('\u{0E2A}'));
        assert_eq!(
            reply.chars().count(),
            REPLY_CHAR_LIMIT + TRUNCATION_MARKER.chars().count()
        );
    }
}

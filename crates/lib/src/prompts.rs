//! # Prompt Assembly
//!
//! Builds the single grounded prompt sent to the chat model: recent
//! conversation, retrieved context, the bot's persona, the question, and a
//! trailing `Answer:` cue for the model to complete from.

use crate::history::HistoryTurn;
use crate::types::RetrievedChunk;

/// Separator between retrieved chunks inside the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Placeholder used when retrieval returned no chunks at all.
pub const NO_DOCUMENT_PLACEHOLDER: &str = "[No document found]";

/// The bot's persona and answer-style instructions.
///
/// This is configuration, not behavior: the rendered block must be
/// reproducible verbatim, which is what the golden prompt tests pin down.
#[derive(Debug, Clone)]
pub struct Persona {
    /// The role line, e.g. "You are an engineer.".
    pub role: String,
    /// The task bullet list rendered under "Task:".
    pub task_rules: Vec<String>,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            role: "You are an engineer.".to_string(),
            task_rules: vec![
                "Use a warm and friendly tone".to_string(),
                "Answer in Thai language".to_string(),
                "Summarize the information clearly and concisely".to_string(),
                "Make it easy to understand, even for beginners".to_string(),
                "Include relevant emojis such as \u{1F50B}\u{2600}\u{FE0F}\u{1F50C} when appropriate".to_string(),
            ],
        }
    }
}

/// Joins retrieved chunk texts into the context block, or the
/// `[No document found]` placeholder when nothing was retrieved.
pub fn join_context(chunks: &[RetrievedChunk]) -> String {
    if chunks.is_empty() {
        return NO_DOCUMENT_PLACEHOLDER.to_string();
    }
    chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Renders the full prompt. Pure and deterministic: identical inputs always
/// produce the identical string.
pub fn build_prompt(
    history: &[HistoryTurn],
    context: &str,
    question: &str,
    persona: &Persona,
) -> String {
    let history_lines = history
        .iter()
        .map(|turn| format!("User: {}\nBot: {}", turn.user, turn.bot))
        .collect::<Vec<_>>()
        .join("\n");

    let task_lines = persona
        .task_rules
        .iter()
        .map(|rule| format!("- {rule}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Previous Conversation:\n{history_lines}\n\nContext:\n{context}\n\nRole: {role}\nTask:\n{task_lines}\n\nQuestion: {question}\nAnswer:",
        role = persona.role,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(user: &str, bot: &str) -> HistoryTurn {
        HistoryTurn {
            user: user.to_string(),
            bot: bot.to_string(),
        }
    }

    /// Pins the exact layout the chat model sees.
    #[test]
    fn golden_prompt_layout() {
        let history = vec![turn("Q1", "A1")];
        let prompt = build_prompt(&history, "CTX", "Q2", &Persona::default());

        let user_pos = prompt.find("User: Q1").expect("history user line missing");
        let bot_pos = prompt.find("Bot: A1").expect("history bot line missing");
        let ctx_pos = prompt.find("CTX").expect("context missing");
        let q_pos = prompt.find("Question: Q2").expect("question missing");

        assert!(user_pos < bot_pos && bot_pos < ctx_pos && ctx_pos < q_pos);
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn empty_history_renders_an_empty_conversation_block() {
        let prompt = build_prompt(&[], "CTX", "Q", &Persona::default());
        assert!(prompt.starts_with("Previous Conversation:\n\nContext:\nCTX"));
    }

    #[test]
    fn persona_block_is_reproduced_verbatim() {
        let prompt = build_prompt(&[], "CTX", "Q", &Persona::default());
        assert!(prompt.contains("Role: You are an engineer.\nTask:\n- Use a warm and friendly tone\n- Answer in Thai language"));
    }

    #[test]
    fn empty_retrieval_uses_the_placeholder() {
        assert_eq!(join_context(&[]), NO_DOCUMENT_PLACEHOLDER);
    }

    #[test]
    fn chunks_are_joined_with_the_separator() {
        let chunks = vec![
            RetrievedChunk {
                source: "doc.pdf".into(),
                sequence: 0,
                content: "first".into(),
                score: 0.9,
            },
            RetrievedChunk {
                source: "doc.pdf".into(),
                sequence: 1,
                content: "second".into(),
                score: 0.8,
            },
        ];
        assert_eq!(join_context(&chunks), "first\n\n---\n\nsecond");
    }
}

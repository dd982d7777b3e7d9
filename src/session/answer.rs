//! Picking the user-facing answer out of a finished transcript.

use crate::types::{AgentName, Message, SUMMARY_COMPLETE};

/// How many trailing messages are searched.
pub const ANSWER_WINDOW: usize = 5;

pub const NO_ANSWER: &str = "Completed, but no specific answer was found.";

/// The answer for one exchange.
///
/// Walks the last [`ANSWER_WINDOW`] messages newest first. A summarizer
/// message carrying `SUMMARY_COMPLETE` wins; when the summarizer was
/// skipped, the most recent tool result is the answer.
pub fn extract_answer(history: &[Message]) -> String {
    let window = &history[history.len().saturating_sub(ANSWER_WINDOW)..];

    let summary = window.iter().rev().find_map(|msg| {
        if !msg.is_from(AgentName::Summarizer) || !msg.content.contains(SUMMARY_COMPLETE) {
            return None;
        }
        let text = msg.text_without(SUMMARY_COMPLETE);
        (!text.is_empty()).then_some(text)
    });
    if let Some(summary) = summary {
        return summary;
    }

    window
        .iter()
        .rev()
        .find(|msg| msg.is_function_result() && !msg.is_blank())
        .map(|msg| msg.content.trim().to_string())
        .unwrap_or_else(|| NO_ANSWER.to_string())
}

//! Canned replies used when an agent cannot produce a turn.

use crate::types::{AgentName, Message, APPROVED, SUMMARY_COMPLETE};
use crate::util::text::ellipsize;

use super::filter::{LEGACY_RESPONSE_MARKER, RESULT_PREFIX};

/// How far back the summarizer fallback looks for a tool result.
const RESULT_LOOKBACK: usize = 5;
const MAX_RESULT_CHARS: usize = 800;

pub const GENERIC_FALLBACK: &str = "Processing complete.";

/// Replacement for a failed turn by `agent`.
///
/// The reviewer approves so the round can close; the summarizer relays the
/// most recent tool result if there is one.
pub fn fallback_reply(agent: AgentName, history: &[Message]) -> Message {
    match agent {
        AgentName::Reviewer => Message::assistant(
            agent,
            format!("The request was processed and the result stands. {APPROVED}"),
        ),
        AgentName::Summarizer => {
            let text = match latest_tool_output(history) {
                Some(result) => format!("Query complete: {}", ellipsize(&result, MAX_RESULT_CHARS)),
                None => "The query has finished; see the execution result above.".to_string(),
            };
            Message::assistant(agent, format!("{text}\n\n{SUMMARY_COMPLETE}"))
        }
        _ => Message::assistant(agent, GENERIC_FALLBACK),
    }
}

/// Reply for an agent whose filtered view came out empty.
pub fn empty_view_reply(agent: AgentName) -> Message {
    match agent {
        AgentName::Reviewer => Message::assistant(
            agent,
            format!("Execution result received; everything ran normally. {APPROVED}"),
        ),
        _ => Message::assistant(agent, "Message processing complete."),
    }
}

/// Text of the newest tool result among the last few messages.
pub fn latest_tool_output(history: &[Message]) -> Option<String> {
    let start = history.len().saturating_sub(RESULT_LOOKBACK);
    history[start..].iter().rev().find_map(|msg| {
        let text = if msg.is_function_result() {
            msg.content.trim()
        } else if let Some(rest) = msg.content.strip_prefix(RESULT_PREFIX) {
            rest.trim()
        } else if msg.content.contains(LEGACY_RESPONSE_MARKER) {
            msg.content
                .lines()
                .skip_while(|l| !l.contains(LEGACY_RESPONSE_MARKER))
                .nth(1)
                .map(str::trim)
                .unwrap_or_default()
        } else {
            return None;
        };
        (!text.is_empty()).then(|| text.to_string())
    })
}

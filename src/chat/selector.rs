//! Next-speaker selection.
//!
//! The pipeline is linear: user proxy, planner, executor, then either the
//! summarizer and reviewer or, when the executor's turn already produced a
//! tool result, the reviewer directly. The reviewer always ends the round.

use crate::types::{AgentName, Message};

/// How many trailing messages are checked for a finished tool exchange.
pub const TOOL_PAIR_WINDOW: usize = 3;

/// Pick the agent that speaks after `last`, or `None` to end the round.
///
/// `None` for `last` means nobody has spoken yet and starts at the planner.
pub fn select_next_speaker(last: Option<AgentName>, history: &[Message]) -> Option<AgentName> {
    match last {
        Some(AgentName::UserProxy) | None => Some(AgentName::Planner),
        Some(AgentName::Planner) => Some(AgentName::Executor),
        Some(AgentName::Executor) => {
            if has_completed_tool_exchange(history) {
                Some(AgentName::Reviewer)
            } else {
                Some(AgentName::Summarizer)
            }
        }
        Some(AgentName::Summarizer) => Some(AgentName::Reviewer),
        Some(AgentName::Reviewer) => None,
    }
}

/// Like [`select_next_speaker`], for a speaker known only by name.
///
/// Unrecognized names restart the pipeline at the planner.
pub fn select_next_speaker_by_name(last: &str, history: &[Message]) -> Option<AgentName> {
    select_next_speaker(AgentName::parse_lenient(last), history)
}

/// Whether the trailing window holds a call followed by that call's result.
pub fn has_completed_tool_exchange(history: &[Message]) -> bool {
    let start = history.len().saturating_sub(TOOL_PAIR_WINDOW);
    let window = &history[start..];
    window.iter().enumerate().any(|(i, msg)| {
        msg.function_call.as_ref().is_some_and(|call| {
            window[i + 1..]
                .iter()
                .any(|later| later.function_result_of.as_deref() == Some(call.name.as_str()))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FunctionCall;
    use serde_json::json;

    fn tool_pair(name: &str) -> [Message; 2] {
        [
            Message::function_call(AgentName::Executor, "", FunctionCall::new(name, json!({}))),
            Message::function_result(name, "28°C"),
        ]
    }

    #[test]
    fn follows_linear_pipeline() {
        let h = [Message::user(AgentName::UserProxy, "hi")];
        assert_eq!(select_next_speaker(None, &h), Some(AgentName::Planner));
        assert_eq!(select_next_speaker(Some(AgentName::UserProxy), &h), Some(AgentName::Planner));
        assert_eq!(select_next_speaker(Some(AgentName::Planner), &h), Some(AgentName::Executor));
        assert_eq!(select_next_speaker(Some(AgentName::Executor), &h), Some(AgentName::Summarizer));
        assert_eq!(select_next_speaker(Some(AgentName::Summarizer), &h), Some(AgentName::Reviewer));
        assert_eq!(select_next_speaker(Some(AgentName::Reviewer), &h), None);
    }

    #[test]
    fn completed_tool_exchange_skips_summarizer() {
        let mut h = vec![Message::user(AgentName::UserProxy, "weather?")];
        h.extend(tool_pair("get_weather"));
        assert_eq!(select_next_speaker(Some(AgentName::Executor), &h), Some(AgentName::Reviewer));
    }

    #[test]
    fn call_without_result_goes_to_summarizer() {
        let h = [tool_pair("get_weather")[0].clone()];
        assert_eq!(select_next_speaker(Some(AgentName::Executor), &h), Some(AgentName::Summarizer));
    }

    #[test]
    fn result_for_a_different_tool_does_not_count() {
        let [call, _] = tool_pair("get_weather");
        let h = [call, Message::function_result("search_web", "links")];
        assert!(!has_completed_tool_exchange(&h));
    }

    #[test]
    fn stale_tool_exchange_outside_window_is_ignored() {
        let mut h: Vec<Message> = tool_pair("search_web").into();
        h.push(Message::assistant(AgentName::Executor, "more"));
        h.push(Message::assistant(AgentName::Executor, "EXECUTION_COMPLETE"));
        assert_eq!(select_next_speaker(Some(AgentName::Executor), &h), Some(AgentName::Summarizer));
    }

    #[test]
    fn textual_markers_are_not_sniffed() {
        let h = [Message::assistant(
            AgentName::Executor,
            "***** Response from calling function get_weather *****",
        )];
        assert_eq!(select_next_speaker(Some(AgentName::Executor), &h), Some(AgentName::Summarizer));
    }

    #[test]
    fn unknown_speaker_restarts_at_planner() {
        assert_eq!(select_next_speaker_by_name("critic", &[]), Some(AgentName::Planner));
        assert_eq!(select_next_speaker_by_name("reviewer", &[]), None);
    }
}

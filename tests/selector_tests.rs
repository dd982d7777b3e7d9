//! Speaker selection properties.

use proptest::prelude::*;
use serde_json::json;

use quintet::chat::selector::{select_next_speaker, select_next_speaker_by_name};
use quintet::types::{AgentName, FunctionCall, Message};

fn agent_strategy() -> impl Strategy<Value = AgentName> {
    prop::sample::select(AgentName::ALL.to_vec())
}

fn message_strategy() -> impl Strategy<Value = Message> {
    prop_oneof![
        (agent_strategy(), ".{0,30}").prop_map(|(a, t)| Message::assistant(a, t)),
        (agent_strategy(), ".{0,30}").prop_map(|(a, t)| Message::user(a, t)),
        ".{0,30}".prop_map(Message::system),
        "[a-z_]{1,12}".prop_map(|name| Message::function_result(name, "result")),
        "[a-z_]{1,12}".prop_map(|name| Message::function_call(
            AgentName::Executor,
            "",
            FunctionCall::new(name, json!({}))
        )),
    ]
}

fn history_strategy() -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec(message_strategy(), 0..12)
}

fn completed_pair(name: &str) -> Vec<Message> {
    vec![
        Message::function_call(AgentName::Executor, "", FunctionCall::new(name, json!({"location": "Guangzhou"}))),
        Message::function_result(name, "Sunny, 28°C"),
    ]
}

proptest! {
    #[test]
    fn reviewer_always_ends_the_round(history in history_strategy()) {
        prop_assert_eq!(select_next_speaker(Some(AgentName::Reviewer), &history), None);
    }

    #[test]
    fn fixed_transitions_ignore_history(history in history_strategy()) {
        prop_assert_eq!(select_next_speaker(Some(AgentName::UserProxy), &history), Some(AgentName::Planner));
        prop_assert_eq!(select_next_speaker(Some(AgentName::Planner), &history), Some(AgentName::Executor));
        prop_assert_eq!(select_next_speaker(Some(AgentName::Summarizer), &history), Some(AgentName::Reviewer));
        prop_assert_eq!(select_next_speaker(None, &history), Some(AgentName::Planner));
    }

    #[test]
    fn trailing_tool_pair_routes_executor_to_reviewer(
        history in history_strategy(),
        tool in "[a-z_]{1,12}",
    ) {
        let mut history = history;
        history.extend(completed_pair(&tool));
        prop_assert_eq!(select_next_speaker(Some(AgentName::Executor), &history), Some(AgentName::Reviewer));
    }

    #[test]
    fn executor_only_goes_to_summarizer_or_reviewer(history in history_strategy()) {
        let next = select_next_speaker(Some(AgentName::Executor), &history);
        prop_assert!(matches!(next, Some(AgentName::Summarizer) | Some(AgentName::Reviewer)));
    }

    #[test]
    fn unknown_names_restart_at_the_planner(name in "[A-Z]{3,8}[0-9]", history in history_strategy()) {
        prop_assert_eq!(select_next_speaker_by_name(&name, &history), Some(AgentName::Planner));
    }
}

#[test]
fn pair_older_than_the_window_is_ignored() {
    let mut history = completed_pair("get_weather");
    history.push(Message::assistant(AgentName::Executor, "Here is more context."));
    history.push(Message::assistant(AgentName::Executor, "EXECUTION_COMPLETE"));
    assert_eq!(
        select_next_speaker(Some(AgentName::Executor), &history),
        Some(AgentName::Summarizer)
    );
}

#[test]
fn call_without_matching_result_goes_to_summarizer() {
    let history = vec![
        Message::function_call(AgentName::Executor, "", FunctionCall::new("get_weather", json!({}))),
        Message::function_result("search_web", "unrelated"),
    ];
    assert_eq!(
        select_next_speaker(Some(AgentName::Executor), &history),
        Some(AgentName::Summarizer)
    );
}

#[test]
fn dashed_names_are_recognized() {
    assert_eq!(select_next_speaker_by_name("user-proxy", &[]), Some(AgentName::Planner));
    assert_eq!(select_next_speaker_by_name("Reviewer", &[]), None);
}

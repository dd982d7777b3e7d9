//! Default role prompts.

use crate::tools::ToolName;
use crate::types::{AgentName, APPROVED, EXECUTION_COMPLETE, NEEDS_REVISION, PLAN_COMPLETE, SUMMARY_COMPLETE};

/// Role prompt for `agent`, listing `tools` where the role can use them.
pub fn default_prompt(agent: AgentName, tools: &[ToolName]) -> String {
    match agent {
        AgentName::Planner => format!(
            "You are a strategic planner. Reply in the user's language.\n\n\
             1. Understand the user's question and what they need.\n\
             2. Write a short, concrete plan for the executor.\n\
             3. Say which tool the executor should use, if any.\n\n\
             When the plan is complete, say \"{PLAN_COMPLETE}\"."
        ),
        AgentName::Executor => {
            let listed = if tools.is_empty() {
                "No tools are available; answer from your own knowledge.".to_string()
            } else {
                let names: Vec<_> = tools.iter().map(|t| format!("- {}", tool_usage(*t))).collect();
                format!("Available tools:\n{}", names.join("\n"))
            };
            let weather = if tools.contains(&ToolName::GetWeather) {
                "When the user asks about weather you must call get_weather for live data. "
            } else {
                ""
            };
            format!(
                "You are an execution expert with web access. Reply in the user's language.\n\n\
                 Carry out the planner's plan and report detailed results.\n\n\
                 {listed}\n\n\
                 {weather}Call at most one tool per turn.\n\n\
                 When execution is complete, say \"{EXECUTION_COMPLETE}\"."
            )
        }
        AgentName::Summarizer => format!(
            "You are an answer summarizer. Reply in the user's language.\n\n\
             Turn the executor's output into a clear, complete answer for the user. \
             Keep the facts; drop the process.\n\n\
             When the summary is complete, say \"{SUMMARY_COMPLETE}\"."
        ),
        AgentName::Reviewer => format!(
            "You are a quality reviewer. Reply in the user's language.\n\n\
             Check whether the answer is correct and meets the user's request.\n\n\
             If it does, say \"{APPROVED}\". \
             If it does not, say \"{NEEDS_REVISION}: \" followed by the reason."
        ),
        AgentName::UserProxy => "You relay the user's request and run requested tools.".to_string(),
    }
}

fn tool_usage(tool: ToolName) -> &'static str {
    match tool {
        ToolName::SearchWeb => "search_web(query): web search",
        ToolName::SearchNews => "search_news(query): latest news headlines",
        ToolName::GetWeather => "get_weather(location): live weather",
        ToolName::GetExchangeRate => "get_exchange_rate(base_currency, target_currency): currency rates",
        ToolName::OpenWebPage => "open_web_page(url, action): read a web page",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_carry_completion_markers() {
        for agent in [AgentName::Planner, AgentName::Executor, AgentName::Summarizer, AgentName::Reviewer] {
            let marker = agent.completion_marker().unwrap();
            assert!(default_prompt(agent, &[]).contains(marker), "{agent} prompt lacks {marker}");
        }
        assert!(default_prompt(AgentName::Reviewer, &[]).contains(NEEDS_REVISION));
    }

    #[test]
    fn executor_prompt_lists_declared_tools() {
        let prompt = default_prompt(AgentName::Executor, &[ToolName::GetWeather]);
        assert!(prompt.contains("get_weather(location)"));
        assert!(!prompt.contains("search_web"));
    }
}

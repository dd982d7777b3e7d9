//! Shared test helpers: scripted agents and a scripted model provider.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use quintet::agent::{Agent, AgentRoster, Turn};
use quintet::error::{QuintetError, Result};
use quintet::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use quintet::types::*;

/// What a scripted agent does on every turn.
#[derive(Debug, Clone)]
pub enum Behavior {
    Reply(String),
    ToolCall { call: FunctionCall, result: String },
    Fail(String),
}

/// An agent that repeats one behavior and records every view it was given.
pub struct ScriptedAgent {
    name: AgentName,
    behavior: Behavior,
    calls: AtomicUsize,
    views: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedAgent {
    pub fn new(name: AgentName, behavior: Behavior) -> Self {
        Self {
            name,
            behavior,
            calls: AtomicUsize::new(0),
            views: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(name: AgentName, text: &str) -> Self {
        Self::new(name, Behavior::Reply(text.to_string()))
    }

    pub fn failing(name: AgentName) -> Self {
        Self::new(name, Behavior::Fail(format!("{name} timed out")))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn views(&self) -> Vec<Vec<Message>> {
        self.views.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn name(&self) -> AgentName {
        self.name
    }

    async fn generate_reply(&self, view: &[Message]) -> Result<Turn> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.views.lock().unwrap().push(view.to_vec());
        match &self.behavior {
            Behavior::Reply(text) => Ok(Turn::reply(Message::assistant(self.name, text.clone()))),
            Behavior::ToolCall { call, result } => Ok(Turn::reply(Message::function_call(
                self.name,
                "",
                call.clone(),
            ))
            .with_tool_result(Message::function_result(&call.name, result.clone()))),
            Behavior::Fail(reason) => Err(QuintetError::InvalidState(reason.clone())),
        }
    }
}

pub const PLAN: &str = "1. Answer the question directly.\nPLAN_COMPLETE";
pub const EXECUTION: &str =
    "Quantum entanglement is a correlation between particles such that measuring one fixes the state of the other, however far apart they are. EXECUTION_COMPLETE";
pub const SUMMARY: &str =
    "Entangled particles share one quantum state, so measuring one instantly tells you about the other.\n\nSUMMARY_COMPLETE";
pub const APPROVAL: &str = "The answer is accurate. APPROVED";

/// Agents for the no-tool path.
pub fn default_agents() -> HashMap<AgentName, Arc<ScriptedAgent>> {
    [
        ScriptedAgent::replying(AgentName::UserProxy, "No pending tool calls. Continue."),
        ScriptedAgent::replying(AgentName::Planner, PLAN),
        ScriptedAgent::replying(AgentName::Executor, EXECUTION),
        ScriptedAgent::replying(AgentName::Summarizer, SUMMARY),
        ScriptedAgent::replying(AgentName::Reviewer, APPROVAL),
    ]
    .into_iter()
    .map(|a| (a.name, Arc::new(a)))
    .collect()
}

/// Default agents with some replaced.
pub fn agents_with(overrides: Vec<ScriptedAgent>) -> HashMap<AgentName, Arc<ScriptedAgent>> {
    let mut agents = default_agents();
    for agent in overrides {
        agents.insert(agent.name, Arc::new(agent));
    }
    agents
}

pub fn roster_of(agents: &HashMap<AgentName, Arc<ScriptedAgent>>) -> AgentRoster {
    AgentRoster::new(agents.values().map(|a| a.clone() as Arc<dyn Agent>)).unwrap()
}

pub fn weather_call(location: &str) -> FunctionCall {
    FunctionCall::new("get_weather", serde_json::json!({ "location": location }))
}

/// Authors of `messages`, in order; system messages show as `None`.
pub fn authors(messages: &[Message]) -> Vec<Option<AgentName>> {
    messages.iter().map(|m| m.author).collect()
}

/// A provider that plays back queued responses and records requests.
pub struct ScriptedProvider {
    model_id: String,
    responses: Mutex<VecDeque<Result<ProviderResponse>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            model_id: "scripted".to_string(),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn text(self, text: &str) -> Self {
        self.responses.lock().unwrap().push_back(Ok(ProviderResponse {
            text: text.to_string(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
            },
            tool_calls: vec![],
            finish_reason: Some(FinishReason::Stop),
        }));
        self
    }

    pub fn tool_call(self, call: FunctionCall) -> Self {
        self.responses.lock().unwrap().push_back(Ok(ProviderResponse {
            text: String::new(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
                total_tokens: 15,
            },
            tool_calls: vec![call],
            finish_reason: Some(FinishReason::ToolCalls),
        }));
        self
    }

    pub fn error(self, err: QuintetError) -> Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(QuintetError::InvalidState("no scripted response left".into())))
    }
}

//! The user's stand-in: runs pending tool calls, never asks a human.

use async_trait::async_trait;
use tracing::debug;

use super::{Agent, Turn};
use crate::error::Result;
use crate::tools::ToolRunner;
use crate::types::{AgentName, FunctionCall, Message};

const IDLE_NOTICE: &str = "No pending tool calls. Continue.";

/// The speaker selector never picks the user proxy, so this agent only acts
/// when a caller asks the roster for it directly. Executor turns already
/// carry their own tool results.
#[derive(Debug, Clone, Default)]
pub struct UserProxyAgent {
    tools: Option<ToolRunner>,
}

impl UserProxyAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tools(mut self, runner: ToolRunner) -> Self {
        self.tools = Some(runner);
        self
    }
}

/// The most recent function call in `view` that has no result after it.
pub fn pending_call(view: &[Message]) -> Option<&FunctionCall> {
    for (i, msg) in view.iter().enumerate().rev() {
        if let Some(call) = &msg.function_call {
            let answered = view[i + 1..]
                .iter()
                .any(|m| m.function_result_of.as_deref() == Some(call.name.as_str()));
            return (!answered).then_some(call);
        }
    }
    None
}

#[async_trait]
impl Agent for UserProxyAgent {
    fn name(&self) -> AgentName {
        AgentName::UserProxy
    }

    async fn generate_reply(&self, view: &[Message]) -> Result<Turn> {
        if let (Some(runner), Some(call)) = (&self.tools, pending_call(view)) {
            debug!(tool = %call.name, "user proxy running pending tool call");
            return Ok(Turn::reply(runner.run(call).await?));
        }
        Ok(Turn::reply(Message::user(AgentName::UserProxy, IDLE_NOTICE)))
    }
}

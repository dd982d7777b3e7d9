//! Agents: the five fixed participants of a group chat.

pub mod llm;
pub mod prompts;
pub mod roster;
pub mod user_proxy;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AgentName, Capabilities, Message, Usage};

pub use llm::LlmAgent;
pub use roster::AgentRoster;
pub use user_proxy::UserProxyAgent;

/// What one agent turn produced.
///
/// A tool-using turn yields the call request plus the tool's result; every
/// other turn yields a single reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub reply: Message,
    pub tool_result: Option<Message>,
    pub usage: Usage,
}

impl Turn {
    pub fn reply(reply: Message) -> Self {
        Self {
            reply,
            tool_result: None,
            usage: Usage::default(),
        }
    }

    pub fn with_tool_result(mut self, result: Message) -> Self {
        self.tool_result = Some(result);
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    /// Messages in append order.
    pub fn into_messages(self) -> Vec<Message> {
        std::iter::once(self.reply).chain(self.tool_result).collect()
    }
}

/// A conversational participant.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> AgentName;

    fn capabilities(&self) -> Capabilities {
        self.name().capabilities()
    }

    /// Produce the next turn from a filtered view of the history.
    async fn generate_reply(&self, view: &[Message]) -> Result<Turn>;
}

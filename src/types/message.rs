//! Conversation messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::agent::AgentName;

/// A single entry in the group chat history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    /// Emitting agent; `None` for system messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AgentName>,
    pub content: String,
    /// Set when the author asked for a tool invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    /// Set when this message carries a tool's return value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_result_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    fn new(role: Role, author: Option<AgentName>, content: impl Into<String>) -> Self {
        Self {
            role,
            author,
            content: content.into(),
            function_call: None,
            function_result_of: None,
            timestamp: Some(Utc::now()),
        }
    }

    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, None, text)
    }

    /// Create a user message.
    pub fn user(author: AgentName, text: impl Into<String>) -> Self {
        Self::new(Role::User, Some(author), text)
    }

    /// Create an assistant message.
    pub fn assistant(author: AgentName, text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, Some(author), text)
    }

    /// Create the assistant message that requests a tool call.
    pub fn function_call(author: AgentName, text: impl Into<String>, call: FunctionCall) -> Self {
        Self {
            function_call: Some(call),
            ..Self::new(Role::Assistant, Some(author), text)
        }
    }

    /// Create the message carrying a tool's textual result.
    ///
    /// Tool results are relayed by the user proxy, mirroring who executes them.
    pub fn function_result(tool_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            function_result_of: Some(tool_name.into()),
            ..Self::new(Role::User, Some(AgentName::UserProxy), text)
        }
    }

    /// Create a raw function-role record, as some backends emit them.
    pub fn function_role(tool_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            function_result_of: Some(tool_name.into()),
            ..Self::new(Role::Function, None, text)
        }
    }

    pub fn is_from(&self, agent: AgentName) -> bool {
        self.author == Some(agent)
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn is_function_call(&self) -> bool {
        self.function_call.is_some()
    }

    pub fn is_function_result(&self) -> bool {
        self.function_result_of.is_some()
    }

    /// Content with every occurrence of `marker` removed and trimmed.
    pub fn text_without(&self, marker: &str) -> String {
        self.content.replace(marker, "").trim().to_string()
    }
}

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
}

/// A tool call requested by a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

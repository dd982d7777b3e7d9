//! Fixed agent identities and their capabilities.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One of the five conversational roles.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentName {
    UserProxy,
    Planner,
    Executor,
    Summarizer,
    Reviewer,
}

/// What an agent is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_call_tools: bool,
    /// Always false: no agent ever waits on a human.
    pub is_human_gated: bool,
}

impl AgentName {
    pub const ALL: [AgentName; 5] = [
        AgentName::UserProxy,
        AgentName::Planner,
        AgentName::Executor,
        AgentName::Summarizer,
        AgentName::Reviewer,
    ];

    pub fn capabilities(self) -> Capabilities {
        Capabilities {
            can_call_tools: matches!(self, Self::Executor | Self::UserProxy),
            is_human_gated: false,
        }
    }

    /// Marker an agent appends once its part is done.
    pub fn completion_marker(self) -> Option<&'static str> {
        match self {
            Self::Planner => Some(PLAN_COMPLETE),
            Self::Executor => Some(EXECUTION_COMPLETE),
            Self::Summarizer => Some(SUMMARY_COMPLETE),
            Self::Reviewer => Some(APPROVED),
            Self::UserProxy => None,
        }
    }

    /// Parse a free-form author name, tolerating the dashed spelling.
    pub fn parse_lenient(name: &str) -> Option<Self> {
        name.trim().replace('-', "_").to_ascii_lowercase().parse().ok()
    }
}

pub const PLAN_COMPLETE: &str = "PLAN_COMPLETE";
pub const EXECUTION_COMPLETE: &str = "EXECUTION_COMPLETE";
pub const SUMMARY_COMPLETE: &str = "SUMMARY_COMPLETE";
pub const APPROVED: &str = "APPROVED";
pub const NEEDS_REVISION: &str = "NEEDS_REVISION";

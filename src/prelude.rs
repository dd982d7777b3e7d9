//! Convenience re-exports for common use.

pub use crate::agent::{Agent, AgentRoster, LlmAgent, Turn, UserProxyAgent};
pub use crate::chat::{GroupChat, ReviewVerdict, StopReason, Transcript};
pub use crate::config::QuintetConfig;
pub use crate::error::{QuintetError, Result};
pub use crate::models::LanguageModel;
pub use crate::provider::ModelProvider;
pub use crate::session::{ExchangeHandler, Orchestrator, TextSession, VoiceSession};
pub use crate::tools::{builtin_registry, Tool, ToolName, ToolRegistry, ToolRunner};
pub use crate::types::{AgentName, FunctionCall, GenerationSettings, Message, Role, Usage};

//! Tool system for function calling.

pub mod arguments;
pub mod builtin;
pub mod registry;
pub mod tool;
pub mod types;
pub mod validation;

pub use arguments::ToolArguments;
pub use builtin::{builtin_registry, ToolEndpoints};
pub use registry::{ToolName, ToolRegistry, ToolRunner};
pub use tool::{AgentTool, Tool, ToolExecutionContext};
pub use types::ToolParameters;

//! Typed tool registry and the per-agent runner built on top of it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::{debug, error, warn};

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::validation::validate_arguments;
use crate::error::{QuintetError, Result};
use crate::provider::ToolDefinition;
use crate::types::{AgentName, FunctionCall, Message};

/// The closed set of tools an agent may declare.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolName {
    SearchWeb,
    SearchNews,
    GetWeather,
    GetExchangeRate,
    OpenWebPage,
}

impl ToolName {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Maps each [`ToolName`] to its implementation.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<ToolName, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.tools.keys().map(|n| n.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `tool` under `name`. The tool must report the same name.
    pub fn register(&mut self, name: ToolName, tool: Arc<dyn Tool>) -> Result<()> {
        if tool.name() != name.as_str() {
            return Err(QuintetError::Configuration(format!(
                "tool registered as '{name}' reports name '{}'",
                tool.name()
            )));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn with(mut self, name: ToolName, tool: Arc<dyn Tool>) -> Result<Self> {
        self.register(name, tool)?;
        Ok(self)
    }

    pub fn contains(&self, name: ToolName) -> bool {
        self.tools.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Verify that `agent` may call tools and that every declared tool exists.
    pub fn check_declarations(&self, agent: AgentName, declared: &[ToolName]) -> Result<()> {
        if declared.is_empty() {
            return Ok(());
        }
        if !agent.capabilities().can_call_tools {
            return Err(QuintetError::Configuration(format!(
                "agent {agent} cannot call tools but declares {}",
                join_names(declared)
            )));
        }
        let missing: Vec<_> = declared.iter().copied().filter(|n| !self.contains(*n)).collect();
        if !missing.is_empty() {
            return Err(QuintetError::Configuration(format!(
                "agent {agent} declares unregistered tools: {}",
                join_names(&missing)
            )));
        }
        Ok(())
    }

    /// Provider-facing definitions for the declared tools.
    pub fn definitions(&self, declared: &[ToolName]) -> Vec<ToolDefinition> {
        declared
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters().schema.clone(),
            })
            .collect()
    }

    /// Resolve a model-supplied tool name against an agent's declarations.
    pub fn resolve(&self, agent: AgentName, declared: &[ToolName], name: &str) -> Result<Arc<dyn Tool>> {
        let Ok(tool_name) = name.parse::<ToolName>() else {
            error!(agent = %agent, tool = name, "model requested an unknown tool");
            return Err(QuintetError::UnknownTool(name.to_string()));
        };
        if !declared.contains(&tool_name) {
            error!(agent = %agent, tool = name, "model requested a tool the agent did not declare");
            return Err(QuintetError::UndeclaredTool {
                agent: agent.to_string(),
                tool: name.to_string(),
            });
        }
        self.tools
            .get(&tool_name)
            .cloned()
            .ok_or_else(|| QuintetError::UnknownTool(name.to_string()))
    }

    /// Run a tool call, surfacing every failure as an error.
    pub async fn invoke(
        &self,
        declared: &[ToolName],
        call: &FunctionCall,
        ctx: &ToolExecutionContext,
    ) -> Result<String> {
        let tool = self.resolve(ctx.caller, declared, &call.name)?;
        let args = match &call.arguments {
            serde_json::Value::String(text) => ToolArguments::from_json_str(text),
            other => ToolArguments::new(other.clone()),
        };

        validate_arguments(args.raw(), &tool.parameters().schema).map_err(|violation| {
            QuintetError::InvalidArgument(format!("{}: {violation}", call.name))
        })?;

        debug!(tool = %call.name, caller = %ctx.caller, "invoking tool");
        tool.execute(&args, ctx).await
    }

    /// Run a tool call and return its text.
    ///
    /// Unknown or undeclared tools stay errors. Argument problems and
    /// execution failures come back as readable text.
    pub async fn invoke_text(
        &self,
        declared: &[ToolName],
        call: &FunctionCall,
        ctx: &ToolExecutionContext,
    ) -> Result<String> {
        match self.invoke(declared, call, ctx).await {
            Ok(text) => Ok(text),
            Err(err @ (QuintetError::UnknownTool(_) | QuintetError::UndeclaredTool { .. })) => Err(err),
            Err(QuintetError::InvalidArgument(detail)) => {
                warn!(tool = %call.name, %detail, "rejected tool arguments");
                Ok(format!("Tool {} was called with invalid arguments: {detail}", call.name))
            }
            Err(err) => {
                warn!(tool = %call.name, error = %err, "tool failed");
                Ok(format!("Tool {} failed: {err}", call.name))
            }
        }
    }
}

fn join_names(names: &[ToolName]) -> String {
    names.iter().map(|n| n.as_str()).collect::<Vec<_>>().join(", ")
}

/// An agent's view of the registry: the tools it declared, checked up front.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    registry: Arc<ToolRegistry>,
    owner: AgentName,
    declared: Vec<ToolName>,
}

impl ToolRunner {
    /// Fails with a configuration error if any declaration is invalid.
    pub fn new(registry: Arc<ToolRegistry>, owner: AgentName, declared: Vec<ToolName>) -> Result<Self> {
        registry.check_declarations(owner, &declared)?;
        Ok(Self {
            registry,
            owner,
            declared,
        })
    }

    pub fn declared(&self) -> &[ToolName] {
        &self.declared
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions(&self.declared)
    }

    /// Execute `call` and wrap the text as a tool-result message.
    pub async fn run(&self, call: &FunctionCall) -> Result<Message> {
        let ctx = ToolExecutionContext { caller: self.owner };
        let text = self.registry.invoke_text(&self.declared, call, &ctx).await?;
        let text = if text.trim().is_empty() {
            format!("Tool {} returned no output.", call.name)
        } else {
            text
        };
        Ok(Message::function_result(&call.name, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tool::AgentTool;
    use crate::tools::types::ToolParameters;
    use serde_json::json;

    fn echo_weather() -> Arc<dyn Tool> {
        Arc::new(AgentTool::new(
            "get_weather",
            "Weather lookup",
            ToolParameters::object()
                .string("location", "City", true)
                .build(),
            |args, _ctx| async move { Ok(format!("Sunny in {}", args.get_str("location")?)) },
        ))
    }

    fn registry() -> Arc<ToolRegistry> {
        Arc::new(
            ToolRegistry::new()
                .with(ToolName::GetWeather, echo_weather())
                .unwrap(),
        )
    }

    #[test]
    fn tool_names_use_snake_case() {
        assert_eq!(ToolName::GetExchangeRate.as_str(), "get_exchange_rate");
        assert_eq!("open_web_page".parse::<ToolName>().unwrap(), ToolName::OpenWebPage);
    }

    #[test]
    fn register_rejects_mismatched_names() {
        let err = ToolRegistry::new()
            .with(ToolName::SearchWeb, echo_weather())
            .unwrap_err();
        assert!(matches!(err, QuintetError::Configuration(_)));
    }

    #[test]
    fn declarations_must_exist_in_registry() {
        let err = ToolRunner::new(registry(), AgentName::Executor, vec![ToolName::SearchWeb])
            .unwrap_err();
        assert!(err.to_string().contains("search_web"));
    }

    #[test]
    fn non_tool_agents_cannot_declare_tools() {
        let err = ToolRunner::new(registry(), AgentName::Planner, vec![ToolName::GetWeather])
            .unwrap_err();
        assert!(matches!(err, QuintetError::Configuration(_)));
    }

    #[tokio::test]
    async fn runner_wraps_result_as_tool_message() {
        let runner = ToolRunner::new(registry(), AgentName::Executor, vec![ToolName::GetWeather]).unwrap();
        let msg = runner
            .run(&FunctionCall::new("get_weather", json!({"location": "Guangzhou"})))
            .await
            .unwrap();
        assert_eq!(msg.content, "Sunny in Guangzhou");
        assert_eq!(msg.function_result_of.as_deref(), Some("get_weather"));
        assert!(msg.is_from(AgentName::UserProxy));
    }

    #[tokio::test]
    async fn string_encoded_arguments_are_parsed() {
        let runner = ToolRunner::new(registry(), AgentName::Executor, vec![ToolName::GetWeather]).unwrap();
        let msg = runner
            .run(&FunctionCall::new("get_weather", json!("{\"location\":\"Beijing\"}")))
            .await
            .unwrap();
        assert_eq!(msg.content, "Sunny in Beijing");
    }

    #[tokio::test]
    async fn unknown_tool_fails_loudly() {
        let runner = ToolRunner::new(registry(), AgentName::Executor, vec![ToolName::GetWeather]).unwrap();
        let err = runner
            .run(&FunctionCall::new("launch_rocket", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, QuintetError::UnknownTool(name) if name == "launch_rocket"));
    }

    #[tokio::test]
    async fn undeclared_tool_fails_loudly() {
        let reg = Arc::new(
            ToolRegistry::new()
                .with(ToolName::GetWeather, echo_weather())
                .unwrap(),
        );
        let runner = ToolRunner::new(reg, AgentName::UserProxy, vec![]).unwrap();
        let err = runner
            .run(&FunctionCall::new("get_weather", json!({"location": "Guangzhou"})))
            .await
            .unwrap_err();
        assert!(matches!(err, QuintetError::UndeclaredTool { .. }));
    }

    #[tokio::test]
    async fn invoke_reports_invalid_arguments_as_errors() {
        let reg = registry();
        let ctx = ToolExecutionContext::default();
        let err = reg
            .invoke(&[ToolName::GetWeather], &FunctionCall::new("get_weather", json!({"location": 7})), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, QuintetError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn invalid_arguments_become_text() {
        let runner = ToolRunner::new(registry(), AgentName::Executor, vec![ToolName::GetWeather]).unwrap();
        let msg = runner
            .run(&FunctionCall::new("get_weather", json!({})))
            .await
            .unwrap();
        assert!(msg.content.contains("missing required field 'location'"));
    }
}

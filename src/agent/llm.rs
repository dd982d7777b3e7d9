//! Model-backed agent.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use super::{Agent, Turn};
use crate::error::{QuintetError, Result};
use crate::provider::{ModelProvider, ProviderMessage, ProviderRequest};
use crate::tools::ToolRunner;
use crate::types::{AgentName, GenerationSettings, Message, Role};
use crate::util::timeout::with_timeout;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// An agent whose turns come from a language model.
pub struct LlmAgent {
    name: AgentName,
    prompt: String,
    provider: Arc<dyn ModelProvider>,
    settings: GenerationSettings,
    tools: Option<ToolRunner>,
    timeout: Duration,
}

impl LlmAgent {
    pub fn new(name: AgentName, prompt: impl Into<String>, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            name,
            prompt: prompt.into(),
            provider,
            settings: GenerationSettings::default(),
            tools: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Attach the tools this agent may call.
    pub fn with_tools(mut self, runner: ToolRunner) -> Self {
        self.tools = Some(runner);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The request as this agent sees the conversation: its own messages are
    /// assistant turns, everyone else speaks as a named user.
    fn build_request(&self, view: &[Message]) -> ProviderRequest {
        let mut messages = Vec::with_capacity(view.len() + 1);
        messages.push(ProviderMessage::new(Role::System, self.prompt.clone()));
        for msg in view {
            let converted = match (msg.role, msg.author) {
                (Role::System, _) => ProviderMessage::new(Role::System, msg.content.clone()),
                (_, Some(author)) if author == self.name => {
                    ProviderMessage::new(Role::Assistant, msg.content.clone())
                }
                (_, Some(author)) => {
                    ProviderMessage::new(Role::User, msg.content.clone()).named(author.to_string())
                }
                (_, None) => ProviderMessage::new(Role::User, msg.content.clone()),
            };
            messages.push(converted);
        }

        ProviderRequest {
            messages,
            settings: self.settings.clone(),
            tools: self.tools.as_ref().map(ToolRunner::definitions).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Agent for LlmAgent {
    fn name(&self) -> AgentName {
        self.name
    }

    async fn generate_reply(&self, view: &[Message]) -> Result<Turn> {
        let request = self.build_request(view);
        debug!(agent = %self.name, model = self.provider.model_id(), "generating reply");

        let response = with_timeout(self.timeout, self.provider.generate(&request)).await?;

        if let Some(call) = response.tool_calls.into_iter().next() {
            let Some(runner) = &self.tools else {
                error!(agent = %self.name, tool = %call.name, "agent without tools requested a tool call");
                return Err(QuintetError::UndeclaredTool {
                    agent: self.name.to_string(),
                    tool: call.name,
                });
            };
            let result = runner.run(&call).await?;
            let reply = Message::function_call(self.name, response.text, call);
            return Ok(Turn::reply(reply)
                .with_tool_result(result)
                .with_usage(response.usage));
        }

        if response.text.trim().is_empty() {
            return Err(QuintetError::InvalidState(format!("{} produced an empty reply", self.name)));
        }

        Ok(Turn::reply(Message::assistant(self.name, response.text)).with_usage(response.usage))
    }
}

impl std::fmt::Debug for LlmAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmAgent")
            .field("name", &self.name)
            .field("provider", &self.provider.provider_name())
            .field("model", &self.provider.model_id())
            .field("tools", &self.tools.as_ref().map(ToolRunner::declared))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::provider::ProviderResponse;
    use crate::tools::{AgentTool, ToolName, ToolParameters, ToolRegistry};
    use crate::types::FunctionCall;

    struct Canned {
        response: ProviderResponse,
        seen: Mutex<Vec<ProviderRequest>>,
        delay: Duration,
    }

    impl Canned {
        fn new(response: ProviderResponse) -> Arc<Self> {
            Arc::new(Self {
                response,
                seen: Mutex::new(Vec::new()),
                delay: Duration::ZERO,
            })
        }
    }

    #[async_trait]
    impl ModelProvider for Canned {
        fn provider_name(&self) -> &str {
            "canned"
        }

        fn model_id(&self) -> &str {
            "canned-1"
        }

        async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
            self.seen.lock().unwrap().push(request.clone());
            tokio::time::sleep(self.delay).await;
            Ok(self.response.clone())
        }
    }

    fn text(t: &str) -> ProviderResponse {
        ProviderResponse {
            text: t.into(),
            ..Default::default()
        }
    }

    fn weather_runner() -> ToolRunner {
        let registry = ToolRegistry::new()
            .with(
                ToolName::GetWeather,
                Arc::new(AgentTool::new(
                    "get_weather",
                    "Weather",
                    ToolParameters::object().string("location", "City", true).build(),
                    |_args, _ctx| async { Ok("Guangzhou 28°C".to_string()) },
                )),
            )
            .unwrap();
        ToolRunner::new(Arc::new(registry), AgentName::Executor, vec![ToolName::GetWeather]).unwrap()
    }

    #[tokio::test]
    async fn maps_history_from_own_perspective() {
        let provider = Canned::new(text("PLAN_COMPLETE"));
        let agent = LlmAgent::new(AgentName::Planner, "plan", provider.clone());
        let view = vec![
            Message::user(AgentName::UserProxy, "weather?"),
            Message::assistant(AgentName::Planner, "earlier plan"),
        ];
        agent.generate_reply(&view).await.unwrap();

        let seen = provider.seen.lock().unwrap();
        let msgs = &seen[0].messages;
        assert_eq!(msgs[0].role, Role::System);
        assert_eq!(msgs[1].role, Role::User);
        assert_eq!(msgs[1].name.as_deref(), Some("user_proxy"));
        assert_eq!(msgs[2].role, Role::Assistant);
        assert!(seen[0].tools.is_empty());
    }

    #[tokio::test]
    async fn tool_call_yields_call_and_result() {
        let provider = Canned::new(ProviderResponse {
            tool_calls: vec![FunctionCall::new("get_weather", serde_json::json!({"location": "Guangzhou"}))],
            ..Default::default()
        });
        let agent = LlmAgent::new(AgentName::Executor, "exec", provider.clone()).with_tools(weather_runner());
        let turn = agent.generate_reply(&[]).await.unwrap();

        assert!(turn.reply.is_function_call());
        assert!(turn.reply.is_from(AgentName::Executor));
        let result = turn.tool_result.unwrap();
        assert_eq!(result.content, "Guangzhou 28°C");
        assert_eq!(provider.seen.lock().unwrap()[0].tools.len(), 1);
    }

    #[tokio::test]
    async fn tool_call_without_tools_fails_loudly() {
        let provider = Canned::new(ProviderResponse {
            tool_calls: vec![FunctionCall::new("get_weather", serde_json::json!({}))],
            ..Default::default()
        });
        let agent = LlmAgent::new(AgentName::Summarizer, "sum", provider);
        let err = agent.generate_reply(&[]).await.unwrap_err();
        assert!(matches!(err, QuintetError::UndeclaredTool { .. }));
    }

    #[tokio::test]
    async fn blank_reply_is_a_failure() {
        let agent = LlmAgent::new(AgentName::Reviewer, "rev", Canned::new(text("  ")));
        assert!(agent.generate_reply(&[]).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let provider = Arc::new(Canned {
            response: text("late"),
            seen: Mutex::new(Vec::new()),
            delay: Duration::from_secs(120),
        });
        let agent = LlmAgent::new(AgentName::Planner, "plan", provider).with_timeout(Duration::from_secs(1));
        let err = agent.generate_reply(&[]).await.unwrap_err();
        assert!(matches!(err, QuintetError::Timeout(1000)));
    }
}

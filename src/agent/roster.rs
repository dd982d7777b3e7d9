//! The fixed set of five agents, built once per process.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::prompts::default_prompt;
use super::{Agent, LlmAgent, UserProxyAgent};
use crate::config::QuintetConfig;
use crate::error::{QuintetError, Result};
use crate::models::LanguageModel;
use crate::provider::{create_provider, ModelProvider};
use crate::tools::{ToolName, ToolRegistry, ToolRunner};
use crate::types::AgentName;

/// Exactly one agent per [`AgentName`].
#[derive(Clone)]
pub struct AgentRoster {
    agents: HashMap<AgentName, Arc<dyn Agent>>,
}

impl AgentRoster {
    /// Fails unless every name appears exactly once.
    pub fn new(agents: impl IntoIterator<Item = Arc<dyn Agent>>) -> Result<Self> {
        let mut map = HashMap::new();
        for agent in agents {
            let name = agent.name();
            if map.insert(name, agent).is_some() {
                return Err(QuintetError::Configuration(format!("agent {name} defined twice")));
            }
        }
        if let Some(missing) = AgentName::ALL.iter().find(|n| !map.contains_key(n)) {
            return Err(QuintetError::Configuration(format!("agent {missing} is missing")));
        }
        Ok(Self { agents: map })
    }

    /// Build the default roster from configuration using real providers.
    pub fn from_config(config: &QuintetConfig, registry: Arc<ToolRegistry>) -> Result<Self> {
        Self::from_config_with(config, registry, |model| {
            create_provider(model, config, config.retry_policy())
        })
    }

    /// Build the default roster, obtaining providers from `make_provider`.
    pub fn from_config_with<F>(
        config: &QuintetConfig,
        registry: Arc<ToolRegistry>,
        mut make_provider: F,
    ) -> Result<Self>
    where
        F: FnMut(&LanguageModel) -> Result<Arc<dyn ModelProvider>>,
    {
        let tools = config.tools.enabled_tools()?;
        let mut agents: Vec<Arc<dyn Agent>> = Vec::with_capacity(AgentName::ALL.len());

        for name in [
            AgentName::Planner,
            AgentName::Executor,
            AgentName::Summarizer,
            AgentName::Reviewer,
        ] {
            let model = config.model_for(name);
            let declared: &[ToolName] = if name == AgentName::Executor { tools.as_slice() } else { &[] };
            let prompt = config
                .prompt_for(name)
                .unwrap_or_else(|| default_prompt(name, declared));

            let mut agent = LlmAgent::new(name, prompt, make_provider(&model)?)
                .with_settings(config.settings_for(name))
                .with_timeout(config.timeout_for(name));
            if !declared.is_empty() {
                agent = agent.with_tools(ToolRunner::new(registry.clone(), name, declared.to_vec())?);
            }
            info!(agent = %name, %model, "agent ready");
            agents.push(Arc::new(agent));
        }

        let proxy_runner = ToolRunner::new(registry, AgentName::UserProxy, tools)?;
        agents.push(Arc::new(UserProxyAgent::new().with_tools(proxy_runner)));

        Self::new(agents)
    }

    pub fn get(&self, name: AgentName) -> Arc<dyn Agent> {
        // Construction guarantees every name is present.
        self.agents[&name].clone()
    }
}

impl std::fmt::Debug for AgentRoster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.agents.keys().map(ToString::to_string).collect();
        names.sort();
        f.debug_struct("AgentRoster").field("agents", &names).finish()
    }
}

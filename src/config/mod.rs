//! Layered configuration: defaults < TOML file < environment.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::audio::CommandLine;
use crate::chat::DEFAULT_MAX_ROUND;
use crate::error::{QuintetError, Result};
use crate::models::{LanguageModel, ProviderKey};
use crate::tools::{ToolEndpoints, ToolName};
use crate::types::{AgentName, GenerationSettings};
use crate::util::retry::RetryPolicy;

pub const MAX_ROUND_ENV: &str = "QUINTET_MAX_ROUND";
pub const MODEL_ENV: &str = "QUINTET_MODEL";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Credentials and endpoint for one provider.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Per-agent overrides under `[agents.<name>]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub model: Option<LanguageModel>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    /// Replaces the built-in role prompt.
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Tool names given to the executor and the user proxy.
    pub enabled: Vec<String>,
    pub endpoints: ToolEndpoints,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled: [
                ToolName::SearchWeb,
                ToolName::SearchNews,
                ToolName::GetWeather,
                ToolName::GetExchangeRate,
                ToolName::OpenWebPage,
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            endpoints: ToolEndpoints::default(),
        }
    }
}

impl ToolsConfig {
    pub fn enabled_tools(&self) -> Result<Vec<ToolName>> {
        self.enabled
            .iter()
            .map(|raw| {
                raw.trim()
                    .parse::<ToolName>()
                    .map_err(|_| QuintetError::Configuration(format!("unknown tool '{raw}' in [tools].enabled")))
            })
            .collect()
    }
}

/// How replies are spoken in voice mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SpeakerKind {
    #[default]
    System,
    Openai,
    Mock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub transcription_model: String,
    pub tts_model: String,
    pub voice: String,
    /// Language hint for transcription, e.g. `zh`.
    pub language: Option<String>,
    pub record_seconds: u64,
    pub recorder: Option<CommandLine>,
    pub player: Option<CommandLine>,
    pub speaker: SpeakerKind,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            transcription_model: "whisper-1".to_string(),
            tts_model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            language: None,
            record_seconds: 5,
            recorder: None,
            player: None,
            speaker: SpeakerKind::default(),
        }
    }
}

impl VoiceConfig {
    pub fn record_duration(&self) -> Duration {
        Duration::from_secs(self.record_seconds)
    }
}

/// Everything needed to build the roster, the tools, and the sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuintetConfig {
    pub max_round: u32,
    /// Model for agents without their own `model`.
    pub model: LanguageModel,
    pub max_retries: u32,
    pub agents: HashMap<String, AgentConfig>,
    pub providers: HashMap<String, ProviderConfig>,
    pub tools: ToolsConfig,
    pub voice: VoiceConfig,
}

impl Default for QuintetConfig {
    fn default() -> Self {
        Self {
            max_round: DEFAULT_MAX_ROUND,
            model: LanguageModel::default(),
            max_retries: 3,
            agents: HashMap::new(),
            providers: HashMap::new(),
            tools: ToolsConfig::default(),
            voice: VoiceConfig::default(),
        }
    }
}

impl QuintetConfig {
    /// Load `.env`, the TOML file, then the process environment.
    ///
    /// With no explicit `path`, the per-user config file is read if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            QuintetError::Configuration(format!("cannot read config file {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Overlay values from `lookup` (normally the process environment).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        for key in ProviderKey::ALL {
            let api_key = key.api_key_env().iter().find_map(|var| lookup(*var));
            let base_url = key.base_url_env().iter().find_map(|var| lookup(*var));
            if api_key.is_none() && base_url.is_none() {
                continue;
            }
            let entry = self.provider_mut(key);
            if api_key.is_some() {
                entry.api_key = api_key;
            }
            if base_url.is_some() {
                entry.base_url = base_url;
            }
        }

        if let Some(raw) = lookup(MAX_ROUND_ENV) {
            self.max_round = raw.trim().parse().map_err(|_| {
                QuintetError::Configuration(format!("{MAX_ROUND_ENV} must be a positive integer, got '{raw}'"))
            })?;
        }
        if let Some(raw) = lookup(MODEL_ENV) {
            self.model = raw.parse()?;
        }
        Ok(())
    }

    /// Check everything that would otherwise fail mid-conversation.
    pub fn validate(&self) -> Result<()> {
        if self.max_round == 0 {
            return Err(QuintetError::Configuration("max_round must be at least 1".to_string()));
        }
        if self.voice.record_seconds == 0 {
            return Err(QuintetError::Configuration(
                "voice.record_seconds must be at least 1".to_string(),
            ));
        }
        for name in self.agents.keys() {
            if AgentName::parse_lenient(name).is_none() {
                return Err(QuintetError::Configuration(format!("unknown agent '{name}' in [agents]")));
            }
        }
        for name in self.providers.keys() {
            if ProviderKey::parse(name).is_none() {
                return Err(QuintetError::Configuration(format!("unknown provider '{name}' in [providers]")));
            }
        }
        self.tools.enabled_tools()?;

        for agent in AgentName::ALL {
            if agent == AgentName::UserProxy {
                continue;
            }
            let model = self.model_for(agent);
            let key = model.provider();
            if key.requires_api_key() && self.api_key(key).is_none() {
                return Err(QuintetError::Configuration(format!(
                    "agent {agent} uses {model} but no API key is set; set {}",
                    key.api_key_env().join(" or ")
                )));
            }
            if key.requires_base_url() && self.base_url(key).is_none() {
                return Err(QuintetError::Configuration(format!(
                    "agent {agent} uses {model} but no base URL is set; set {}",
                    key.base_url_env().join(" or ")
                )));
            }
        }
        Ok(())
    }

    fn provider(&self, key: ProviderKey) -> Option<&ProviderConfig> {
        self.providers
            .iter()
            .find(|(name, _)| ProviderKey::parse(name) == Some(key))
            .map(|(_, cfg)| cfg)
    }

    fn provider_mut(&mut self, key: ProviderKey) -> &mut ProviderConfig {
        let name = self
            .providers
            .keys()
            .find(|name| ProviderKey::parse(name) == Some(key))
            .cloned()
            .unwrap_or_else(|| key.as_str().to_string());
        self.providers.entry(name).or_default()
    }

    pub fn api_key(&self, key: ProviderKey) -> Option<String> {
        self.provider(key)
            .and_then(|p| p.api_key.clone())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn base_url(&self, key: ProviderKey) -> Option<String> {
        self.provider(key)
            .and_then(|p| p.base_url.clone())
            .filter(|u| !u.trim().is_empty())
    }

    pub fn set_api_key(&mut self, key: ProviderKey, api_key: impl Into<String>) {
        self.provider_mut(key).api_key = Some(api_key.into());
    }

    pub fn set_base_url(&mut self, key: ProviderKey, base_url: impl Into<String>) {
        self.provider_mut(key).base_url = Some(base_url.into());
    }

    fn agent(&self, name: AgentName) -> Option<&AgentConfig> {
        self.agents
            .iter()
            .find(|(raw, _)| AgentName::parse_lenient(raw) == Some(name))
            .map(|(_, cfg)| cfg)
    }

    pub fn model_for(&self, name: AgentName) -> LanguageModel {
        self.agent(name)
            .and_then(|a| a.model.clone())
            .unwrap_or_else(|| self.model.clone())
    }

    pub fn prompt_for(&self, name: AgentName) -> Option<String> {
        self.agent(name).and_then(|a| a.prompt.clone())
    }

    pub fn settings_for(&self, name: AgentName) -> GenerationSettings {
        let agent = self.agent(name);
        GenerationSettings {
            temperature: agent.and_then(|a| a.temperature),
            max_tokens: agent.and_then(|a| a.max_tokens),
            ..GenerationSettings::default()
        }
    }

    pub fn timeout_for(&self, name: AgentName) -> Duration {
        Duration::from_secs(
            self.agent(name)
                .and_then(|a| a.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries.max(1),
            ..RetryPolicy::default()
        }
    }
}

/// `<config dir>/quintet/config.toml` for the current user.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "quintet").map(|dirs| dirs.config_dir().join("config.toml"))
}

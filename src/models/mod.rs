//! Model identifiers.

pub mod provider_key;

pub use provider_key::ProviderKey;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::QuintetError;

/// A model on a specific provider, written `provider:model_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageModel {
    provider: ProviderKey,
    model_id: String,
}

impl LanguageModel {
    pub fn new(provider: ProviderKey, model_id: impl Into<String>) -> Self {
        Self {
            provider,
            model_id: model_id.into(),
        }
    }

    pub fn openai(model_id: impl Into<String>) -> Self {
        Self::new(ProviderKey::OpenAi, model_id)
    }

    /// Get the model's API identifier string.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn provider(&self) -> ProviderKey {
        self.provider
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.as_str()
    }
}

impl Default for LanguageModel {
    fn default() -> Self {
        Self::openai("gpt-4o")
    }
}

impl FromStr for LanguageModel {
    type Err = QuintetError;

    /// Parse "provider:model_id", e.g. `openai:gpt-4o` or `ollama:llama3.3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, model_id) = s.split_once(':').ok_or_else(|| {
            QuintetError::InvalidArgument(format!(
                "Invalid model selector '{s}': expected 'provider:model_id'"
            ))
        })?;
        let provider = ProviderKey::parse(provider).ok_or_else(|| {
            QuintetError::InvalidArgument(format!("Unknown provider '{provider}' in '{s}'"))
        })?;
        let model_id = model_id.trim();
        if model_id.is_empty() {
            return Err(QuintetError::InvalidArgument(format!(
                "Invalid model selector '{s}': empty model id"
            )));
        }
        Ok(Self::new(provider, model_id))
    }
}

impl fmt::Display for LanguageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider_name(), self.model_id())
    }
}

impl Serialize for LanguageModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LanguageModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

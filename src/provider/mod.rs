//! Model provider trait and the OpenAI-style implementation.

pub mod http;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::QuintetConfig;
use crate::error::{QuintetError, Result};
use crate::models::LanguageModel;
use crate::types::{FinishReason, FunctionCall, GenerationSettings, Role, Usage};
use crate::util::retry::RetryPolicy;

pub use openai::OpenAiProvider;

/// One message as the provider sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMessage {
    pub role: Role,
    /// Speaker name for multi-party conversations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub content: String,
}

impl ProviderMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            name: None,
            content: content.into(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A request sent to a model provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderRequest {
    pub messages: Vec<ProviderMessage>,
    pub settings: GenerationSettings,
    pub tools: Vec<ToolDefinition>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub tool_calls: Vec<FunctionCall>,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by model backends.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai", "ollama").
    fn provider_name(&self) -> &str;
    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate one completion (non-streaming).
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse>;
}

/// Create a provider for `model`, taking credentials and endpoints from `config`.
pub fn create_provider(
    model: &LanguageModel,
    config: &QuintetConfig,
    retry: RetryPolicy,
) -> Result<Arc<dyn ModelProvider>> {
    let key = model.provider();
    let api_key = config.api_key(key);
    if key.requires_api_key() && api_key.is_none() {
        return Err(QuintetError::Configuration(format!(
            "missing API key for {model}; set {}",
            key.api_key_env().join(" or ")
        )));
    }
    let base_url = config
        .base_url(key)
        .or_else(|| key.default_base_url().map(str::to_string))
        .ok_or_else(|| {
            QuintetError::Configuration(format!(
                "missing base URL for {model}; set {}",
                key.base_url_env().join(" or ")
            ))
        })?;

    Ok(Arc::new(
        OpenAiProvider::new(model.clone(), api_key, base_url).with_retry(retry),
    ))
}

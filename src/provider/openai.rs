//! OpenAI Chat Completions provider.
//!
//! Also serves OpenAI-compatible endpoints and Ollama's `/v1` surface.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{QuintetError, Result};
use crate::models::LanguageModel;
use crate::types::{FinishReason, FunctionCall, Role, Usage};
use crate::util::retry::RetryPolicy;

use super::http::{bearer_headers, shared_client, status_to_error};
use super::{ModelProvider, ProviderMessage, ProviderRequest, ProviderResponse};

pub struct OpenAiProvider {
    model: LanguageModel,
    api_key: Option<String>,
    base_url: String,
    retry: RetryPolicy,
}

impl OpenAiProvider {
    pub fn new(model: LanguageModel, api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            model,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn build_request_body(&self, request: &ProviderRequest) -> serde_json::Value {
        let messages: Vec<_> = request.messages.iter().map(message_to_openai).collect();

        let mut body = serde_json::Map::new();
        body.insert("model".into(), self.model.model_id().into());
        body.insert("messages".into(), messages.into());

        if let Some(max) = request.settings.max_tokens {
            body.insert("max_tokens".into(), max.into());
        }
        if let Some(temp) = request.settings.temperature {
            body.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = request.settings.top_p {
            body.insert("top_p".into(), top_p.into());
        }
        if let Some(seed) = request.settings.seed {
            body.insert("seed".into(), seed.into());
        }

        if !request.tools.is_empty() {
            let tool_defs: Vec<serde_json::Value> = request
                .tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            body.insert("tools".into(), tool_defs.into());
        }

        serde_json::Value::Object(body)
    }

    async fn send_once(&self, body: &serde_json::Value) -> Result<ProviderResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let headers = match &self.api_key {
            Some(key) => bearer_headers(key),
            None => Default::default(),
        };

        let resp = shared_client()
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: OpenAiChatResponse = resp.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| QuintetError::api(200, "No choices in OpenAI response"))?;

        // Agents act on a single call per turn.
        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .take(1)
            .map(|tc| {
                let arguments = serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::String(tc.function.arguments));
                FunctionCall::new(tc.function.name, arguments)
            })
            .collect();

        Ok(ProviderResponse {
            text: choice.message.content.unwrap_or_default(),
            usage: data
                .usage
                .map(|u| Usage {
                    input_tokens: u.prompt_tokens,
                    output_tokens: u.completion_tokens,
                    total_tokens: u.total_tokens,
                })
                .unwrap_or_default(),
            tool_calls,
            finish_reason: choice.finish_reason.as_deref().and_then(parse_finish_reason),
        })
    }
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        self.model.provider_name()
    }

    fn model_id(&self) -> &str {
        self.model.model_id()
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        let body = self.build_request_body(request);
        debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "chat completion"
        );
        self.retry.execute(|| self.send_once(&body)).await
    }
}

fn parse_finish_reason(s: &str) -> Option<FinishReason> {
    match s {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "tool_calls" | "function_call" => Some(FinishReason::ToolCalls),
        "content_filter" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

fn message_to_openai(msg: &ProviderMessage) -> serde_json::Value {
    let role = match msg.role {
        Role::System => "system",
        Role::Assistant => "assistant",
        // Relayed tool output has no tool_call_id; send it as plain user text.
        Role::User | Role::Function => "user",
    };
    let mut value = serde_json::json!({ "role": role, "content": msg.content });
    if let Some(name) = &msg.name {
        value["name"] = name.clone().into();
    }
    value
}

// OpenAI API response types (internal)

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Deserialize)]
struct OpenAiToolCall {
    function: OpenAiFunction,
}

#[derive(Deserialize)]
struct OpenAiFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

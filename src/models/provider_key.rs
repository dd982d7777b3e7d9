//! Typed provider identifiers and alias handling.

use serde::{Deserialize, Serialize};

/// Backends an agent's model can be served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKey {
    OpenAi,
    OpenAiCompatible,
    Ollama,
}

impl ProviderKey {
    pub const ALL: [ProviderKey; 3] = [Self::OpenAi, Self::OpenAiCompatible, Self::Ollama];

    /// Canonical provider key string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::OpenAiCompatible => "openai-compatible",
            Self::Ollama => "ollama",
        }
    }

    /// Parse user-facing provider aliases into a typed provider key.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "openai-compatible" | "openai_compatible" | "compatible" => Some(Self::OpenAiCompatible),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Whether calls need an API key.
    pub const fn requires_api_key(self) -> bool {
        matches!(self, Self::OpenAi)
    }

    /// Whether calls need an explicit base URL.
    pub const fn requires_base_url(self) -> bool {
        matches!(self, Self::OpenAiCompatible)
    }

    /// Environment variables consulted for credentials, in order.
    pub const fn api_key_env(self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["OPENAI_API_KEY"],
            Self::OpenAiCompatible => &["OPENAI_COMPATIBLE_API_KEY", "OPENAI_API_KEY"],
            Self::Ollama => &[],
        }
    }

    pub const fn base_url_env(self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["OPENAI_BASE_URL"],
            Self::OpenAiCompatible => &["OPENAI_COMPATIBLE_BASE_URL"],
            Self::Ollama => &["OLLAMA_BASE_URL"],
        }
    }

    pub const fn default_base_url(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::OpenAiCompatible => None,
            Self::Ollama => Some("http://localhost:11434/v1"),
        }
    }
}

impl std::fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

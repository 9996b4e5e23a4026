use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ANTHROPIC_API_KEY_URL, ANTHROPIC_DEFAULT_ENDPOINT, GEMINI_API_KEY_URL,
    GEMINI_DEFAULT_ENDPOINT, OPENAI_API_KEY_URL, OPENAI_DEFAULT_ENDPOINT,
};

/// AI backend a profile talks to. Persisted explicitly in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "google")]
    Google,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "openai-compatible")]
    OpenAiCompatible,
}

/// Model name prefixes used to suggest a provider when `--provider` is not given
const MODEL_PREFIXES: &[(&str, ProviderKind)] = &[
    ("gpt-", ProviderKind::OpenAi),
    ("chatgpt-", ProviderKind::OpenAi),
    ("o1", ProviderKind::OpenAi),
    ("o3", ProviderKind::OpenAi),
    ("o4", ProviderKind::OpenAi),
    ("gemini-", ProviderKind::Google),
    ("claude-", ProviderKind::Anthropic),
];

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::OpenAi,
        ProviderKind::Google,
        ProviderKind::Anthropic,
        ProviderKind::OpenAiCompatible,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Google => "google",
            Self::Anthropic => "anthropic",
            Self::OpenAiCompatible => "openai-compatible",
        }
    }

    /// Suggest a provider from well-known model name prefixes.
    /// Only consulted once, when a model is configured.
    pub fn infer_from_model(model_name: &str) -> Option<Self> {
        let lower = model_name.to_lowercase();
        MODEL_PREFIXES
            .iter()
            .find(|(prefix, _)| lower.starts_with(prefix))
            .map(|(_, kind)| *kind)
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::OpenAi | Self::OpenAiCompatible => OPENAI_DEFAULT_ENDPOINT,
            Self::Google => GEMINI_DEFAULT_ENDPOINT,
            Self::Anthropic => ANTHROPIC_DEFAULT_ENDPOINT,
        }
    }

    pub fn api_key_url(&self) -> &'static str {
        match self {
            Self::OpenAi | Self::OpenAiCompatible => OPENAI_API_KEY_URL,
            Self::Google => GEMINI_API_KEY_URL,
            Self::Anthropic => ANTHROPIC_API_KEY_URL,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "google" | "gemini" => Ok(Self::Google),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai-compatible" | "compatible" | "other" => Ok(Self::OpenAiCompatible),
            other => {
                let expected: Vec<&str> = Self::ALL.iter().map(|kind| kind.as_str()).collect();
                Err(format!(
                    "unknown provider '{other}' (expected one of: {})",
                    expected.join(", ")
                ))
            }
        }
    }
}

/// One configured model
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub api_key: String,
    pub provider: ProviderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(rename = "default", default)]
    pub is_default: bool,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        api_key: impl Into<String>,
        provider: ProviderKind,
        endpoint: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            api_key: api_key.into(),
            provider,
            endpoint,
            is_default: false,
        }
    }

    /// Endpoint override, or the provider default when none is configured
    pub fn effective_endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
    }
}

// The API key never reaches logs, even through `{:?}`.
impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("api_key", &"<redacted>")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("is_default", &self.is_default)
            .finish()
    }
}

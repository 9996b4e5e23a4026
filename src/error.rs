//! Typed failures shared by the store, registry, adapters and dispatcher.

use std::path::PathBuf;

use thiserror::Error;

use crate::profile::ProviderKind;

pub const EXIT_USAGE: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_PROFILE: u8 = 3;
pub const EXIT_EMPTY_PROMPT: u8 = 4;
pub const EXIT_PROVIDER: u8 = 5;

#[derive(Error, Debug)]
pub enum ClippyError {
    #[error("configuration file {} is corrupt: {reason}", path.display())]
    ConfigCorrupt { path: PathBuf, reason: String },

    #[error("could not access configuration file {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model '{name}' not found")]
    NotFound { name: String, available: Vec<String> },

    #[error("no models configured")]
    NoDefault,

    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("no adapter registered for provider '{0}'")]
    UnknownProvider(ProviderKind),

    #[error("{provider} rejected the API key: {detail}")]
    Auth {
        provider: ProviderKind,
        detail: String,
    },

    #[error("{provider} rate limit or quota exceeded: {detail}")]
    RateLimit {
        provider: ProviderKind,
        detail: String,
    },

    #[error("network error talking to {provider}: {detail}")]
    Network {
        provider: ProviderKind,
        detail: String,
    },

    #[error("{provider} returned no usable response: {detail}")]
    MalformedResponse {
        provider: ProviderKind,
        detail: String,
    },

    #[error("{provider} rejected the request: {detail}")]
    RequestRejected {
        provider: ProviderKind,
        detail: String,
    },

    #[error("invalid model specification '{0}', expected <model_name>:<api_key>")]
    InvalidModelSpec(String),

    #[error("cannot infer the provider for model '{0}'")]
    CannotInferProvider(String),
}

impl ClippyError {
    /// Process exit code for scripting callers
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigCorrupt { .. } | Self::ConfigIo { .. } => EXIT_CONFIG,
            Self::NotFound { .. } | Self::NoDefault => EXIT_PROFILE,
            Self::EmptyPrompt => EXIT_EMPTY_PROMPT,
            Self::UnknownProvider(_)
            | Self::Auth { .. }
            | Self::RateLimit { .. }
            | Self::Network { .. }
            | Self::MalformedResponse { .. }
            | Self::RequestRejected { .. } => EXIT_PROVIDER,
            Self::InvalidModelSpec(_) | Self::CannotInferProvider(_) => EXIT_USAGE,
        }
    }

    /// Corrective guidance printed under the error message
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::ConfigCorrupt { path, .. } => Some(format!(
                "Fix or delete {} and configure your models again with `clippy set_model`.",
                path.display()
            )),
            Self::ConfigIo { .. } => {
                Some("Check the permissions of the clippy configuration directory.".to_string())
            }
            Self::NotFound { available, .. } if available.is_empty() => Some(
                "No models configured. Run `clippy set_model <model_name>:<api_key>` first."
                    .to_string(),
            ),
            Self::NotFound { available, .. } => {
                Some(format!("Available models: {}", available.join(", ")))
            }
            Self::NoDefault => Some(
                "Run `clippy set_model <model_name>:<api_key>` first.".to_string(),
            ),
            Self::EmptyPrompt => Some(
                "Provide prompt text as arguments or pipe content via stdin.".to_string(),
            ),
            Self::UnknownProvider(provider) => Some(format!(
                "This build cannot talk to '{provider}'. Reconfigure the model with --provider."
            )),
            Self::Auth { provider, .. } => Some(format!(
                "Check your API key. New keys: {}",
                provider.api_key_url()
            )),
            Self::RateLimit { .. } => {
                Some("Wait a moment and try again, or check your plan's quota.".to_string())
            }
            Self::Network { .. } => Some(
                "Check your connection and the model's endpoint (CLIPPY_TIMEOUT raises the timeout)."
                    .to_string(),
            ),
            Self::MalformedResponse { .. } => {
                Some("The provider answered without any text. Try again or rephrase.".to_string())
            }
            Self::RequestRejected { .. } => Some(
                "Check that the model name and endpoint are valid for this provider.".to_string(),
            ),
            Self::InvalidModelSpec(_) => Some(
                "Example: clippy set_model gpt-4o:sk-... (both parts are required)".to_string(),
            ),
            Self::CannotInferProvider(_) => Some(
                "Pass --provider openai|google|anthropic|openai-compatible.".to_string(),
            ),
        }
    }
}

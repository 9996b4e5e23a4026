use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use genai::adapter::AdapterKind;

use crate::error::ClippyError;
use crate::logging::{log_info, log_warn};
use crate::profile::{Profile, ProviderKind};
use crate::provider::{GenaiChat, ProviderAdapter};

/// API key validation constants
const GOOGLE_API_KEY_LENGTH: usize = 39;
const GOOGLE_API_KEY_PREFIX: &str = "AIza";

/// Google Gemini `generateContent`
#[derive(Debug)]
pub struct GeminiAdapter {
    chat: GenaiChat,
}

impl GeminiAdapter {
    pub fn new(timeout: Duration, system_prompt: String) -> Result<Self> {
        log_info("Initializing Gemini adapter");
        Ok(Self {
            chat: GenaiChat::new(
                AdapterKind::Gemini,
                ProviderKind::Google,
                timeout,
                system_prompt,
            )?,
        })
    }
}

/// Google API keys typically start with "AIza" and are 39 characters long.
/// Returns what looks wrong with `api_key`, if anything. A mismatch is only
/// worth a warning; proxies may use other key formats.
pub fn api_key_format_problem(api_key: &str) -> Option<&'static str> {
    if api_key.len() != GOOGLE_API_KEY_LENGTH {
        return Some("is not 39 characters long");
    }

    if !api_key.starts_with(GOOGLE_API_KEY_PREFIX) {
        return Some("does not start with 'AIza'");
    }

    if !api_key
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Some("contains invalid characters");
    }

    None
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    async fn complete(&self, profile: &Profile, prompt: &str) -> Result<String, ClippyError> {
        if profile.endpoint.is_none()
            && let Some(problem) = api_key_format_problem(&profile.api_key)
        {
            log_warn(&format!(
                "API key for '{}' {problem} (expected for Google API keys)",
                profile.name
            ));
        }
        self.chat.complete(profile, prompt).await
    }

    fn provider_name(&self) -> &str {
        "Gemini"
    }
}

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use genai::adapter::AdapterKind;

use crate::error::ClippyError;
use crate::logging::log_info;
use crate::profile::{Profile, ProviderKind};
use crate::provider::{GenaiChat, ProviderAdapter};

/// Anthropic Messages API
#[derive(Debug)]
pub struct AnthropicAdapter {
    chat: GenaiChat,
}

impl AnthropicAdapter {
    pub fn new(timeout: Duration, system_prompt: String) -> Result<Self> {
        log_info("Initializing Anthropic adapter");
        Ok(Self {
            chat: GenaiChat::new(
                AdapterKind::Anthropic,
                ProviderKind::Anthropic,
                timeout,
                system_prompt,
            )?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    async fn complete(&self, profile: &Profile, prompt: &str) -> Result<String, ClippyError> {
        self.chat.complete(profile, prompt).await
    }

    fn provider_name(&self) -> &str {
        "Anthropic"
    }
}

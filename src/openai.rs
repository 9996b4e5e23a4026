use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use genai::adapter::AdapterKind;

use crate::error::ClippyError;
use crate::logging::log_info;
use crate::profile::{Profile, ProviderKind};
use crate::provider::{GenaiChat, ProviderAdapter};

/// OpenAI chat completions, also used for any server speaking the same
/// protocol (`openai-compatible` profiles with their own endpoint)
#[derive(Debug)]
pub struct OpenAiAdapter {
    chat: GenaiChat,
    name: &'static str,
}

impl OpenAiAdapter {
    pub fn new(timeout: Duration, system_prompt: String) -> Result<Self> {
        log_info("Initializing OpenAI adapter");
        Ok(Self {
            chat: GenaiChat::new(
                AdapterKind::OpenAI,
                ProviderKind::OpenAi,
                timeout,
                system_prompt,
            )?,
            name: "OpenAI",
        })
    }

    pub fn compatible(timeout: Duration, system_prompt: String) -> Result<Self> {
        log_info("Initializing OpenAI-compatible adapter");
        Ok(Self {
            chat: GenaiChat::new(
                AdapterKind::OpenAI,
                ProviderKind::OpenAiCompatible,
                timeout,
                system_prompt,
            )?,
            name: "OpenAI-compatible",
        })
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    async fn complete(&self, profile: &Profile, prompt: &str) -> Result<String, ClippyError> {
        self.chat.complete(profile, prompt).await
    }

    fn provider_name(&self) -> &str {
        self.name
    }
}

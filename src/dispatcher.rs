//! Resolves the profile for an invocation and hands the prompt to its adapter.
//!
//! Each `run` is an independent transaction: the registry is read fresh from
//! the store, nothing is cached, and no retry or cross-provider fallback
//! happens here.

use crate::error::ClippyError;
use crate::logging::{log_debug, log_info};
use crate::profile::ProviderKind;
use crate::provider::AdapterSet;
use crate::store::ProfileStore;

/// Successful completion plus the profile that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub profile_name: String,
    pub provider: ProviderKind,
}

#[derive(Debug)]
pub struct Dispatcher {
    store: ProfileStore,
    adapters: AdapterSet,
}

impl Dispatcher {
    pub fn new(store: ProfileStore, adapters: AdapterSet) -> Self {
        Self { store, adapters }
    }

    pub async fn run(
        &self,
        explicit_profile_name: Option<&str>,
        prompt: &str,
    ) -> Result<Completion, ClippyError> {
        let config = self.store.load()?;

        let profile = match explicit_profile_name {
            Some(name) => config.registry.get(name)?,
            None => config.registry.get_default()?,
        };
        log_debug(&format!(
            "Resolved model '{}' ({})",
            profile.name, profile.provider
        ));

        if prompt.trim().is_empty() {
            return Err(ClippyError::EmptyPrompt);
        }

        let adapter = self
            .adapters
            .get(profile.provider)
            .ok_or(ClippyError::UnknownProvider(profile.provider))?;

        log_info(&format!(
            "Dispatching {} character prompt to {} via {}",
            prompt.len(),
            profile.name,
            adapter.provider_name()
        ));

        let text = adapter.complete(profile, prompt).await?;

        Ok(Completion {
            text,
            profile_name: profile.name.clone(),
            provider: profile.provider,
        })
    }
}

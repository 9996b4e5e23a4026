//! In-memory set of configured profiles and the default-selection policy.
//!
//! Profiles keep insertion order. Whenever the registry is non-empty exactly
//! one profile carries the default flag.

use std::collections::HashSet;

use crate::error::ClippyError;
use crate::logging::log_warn;
use crate::profile::{Profile, ProviderKind};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileRegistry {
    profiles: Vec<Profile>,
}

/// Outcome of [`ProfileRegistry::remove`]
#[derive(Debug)]
pub struct Removed {
    pub profile: Profile,
    /// Set when the removed profile was the default and another one took over
    pub new_default: Option<String>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from stored profiles.
    ///
    /// Duplicate names and multiple defaults are rejected with the reason as
    /// the error; a non-empty list without a default gets its first profile
    /// promoted.
    pub fn from_profiles(profiles: Vec<Profile>) -> Result<Self, String> {
        let mut seen = HashSet::new();
        for profile in &profiles {
            if !seen.insert(profile.name.as_str()) {
                return Err(format!("model '{}' is listed more than once", profile.name));
            }
        }

        let defaults = profiles.iter().filter(|p| p.is_default).count();
        if defaults > 1 {
            return Err(format!("{defaults} models are marked as default"));
        }

        let mut registry = Self { profiles };
        if defaults == 0
            && let Some(first) = registry.profiles.first_mut()
        {
            log_warn(&format!(
                "No default model marked, promoting '{}'",
                first.name
            ));
            first.is_default = true;
        }
        Ok(registry)
    }

    pub fn into_profiles(self) -> Vec<Profile> {
        self.profiles
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.profiles.iter().map(|p| p.name.clone()).collect()
    }

    /// Insert or replace the profile called `name`.
    ///
    /// Existing names are replaced in place, new names are appended. The
    /// profile becomes the default if `make_default` is set or it is the first
    /// one. Returns whether it is the default afterwards.
    pub fn upsert(
        &mut self,
        name: &str,
        api_key: &str,
        provider: ProviderKind,
        endpoint: Option<String>,
        make_default: bool,
    ) -> bool {
        let becomes_default = make_default || self.profiles.is_empty();
        let mut profile = Profile::new(name, api_key, provider, endpoint);

        match self.position(name) {
            Some(index) => {
                profile.is_default = self.profiles[index].is_default;
                self.profiles[index] = profile;
            }
            None => self.profiles.push(profile),
        }

        if becomes_default {
            self.mark_default(name);
        }
        self.profiles
            .iter()
            .any(|p| p.name == name && p.is_default)
    }

    /// Delete `name`. If it was the default, the earliest remaining profile
    /// takes over.
    pub fn remove(&mut self, name: &str) -> Result<Removed, ClippyError> {
        let index = self.position(name).ok_or_else(|| self.not_found(name))?;
        let profile = self.profiles.remove(index);

        let new_default = if profile.is_default {
            self.profiles.first_mut().map(|next| {
                next.is_default = true;
                next.name.clone()
            })
        } else {
            None
        };

        Ok(Removed {
            profile,
            new_default,
        })
    }

    pub fn get(&self, name: &str) -> Result<&Profile, ClippyError> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| self.not_found(name))
    }

    pub fn get_default(&self) -> Result<&Profile, ClippyError> {
        self.profiles
            .iter()
            .find(|p| p.is_default)
            .or_else(|| self.profiles.first())
            .ok_or(ClippyError::NoDefault)
    }

    /// Make an existing profile the default
    pub fn set_default(&mut self, name: &str) -> Result<(), ClippyError> {
        if self.position(name).is_none() {
            return Err(self.not_found(name));
        }
        self.mark_default(name);
        Ok(())
    }

    /// Profiles in insertion order; `is_default` marks the default one
    pub fn list(&self) -> &[Profile] {
        &self.profiles
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.profiles.iter().position(|p| p.name == name)
    }

    fn mark_default(&mut self, name: &str) {
        for profile in &mut self.profiles {
            profile.is_default = profile.name == name;
        }
    }

    fn not_found(&self, name: &str) -> ClippyError {
        ClippyError::NotFound {
            name: name.to_string(),
            available: self.names(),
        }
    }
}

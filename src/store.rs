//! On-disk configuration: `~/.clippy/config.json`.
//!
//! Pure data access. Writes go through a temporary file in the same directory
//! that is renamed over the target, so readers never see a partial document.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::constants::get_config_file;
use crate::error::ClippyError;
use crate::logging::{log_debug, log_info, log_warn};
use crate::profile::Profile;
use crate::registry::ProfileRegistry;

/// Everything persisted in the configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub registry: ProfileRegistry,
    pub log_enabled: bool,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            registry: ProfileRegistry::new(),
            log_enabled: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    models: Vec<Profile>,
    #[serde(default = "default_log_enabled")]
    log_enabled: bool,
}

fn default_log_enabled() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    /// Store at the standard location (`$CLIPPY_HOME/config.json` or `~/.clippy/config.json`)
    pub fn open_default() -> Result<Self> {
        Ok(Self::at(get_config_file()?))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the configuration. A missing file is an empty configuration.
    pub fn load(&self) -> Result<ConfigFile, ClippyError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log_debug(&format!(
                    "No configuration at {}, starting empty",
                    self.path.display()
                ));
                return Ok(ConfigFile::default());
            }
            Err(source) => {
                return Err(ClippyError::ConfigIo {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let document: ConfigDocument =
            serde_json::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;
        let registry =
            ProfileRegistry::from_profiles(document.models).map_err(|reason| self.corrupt(reason))?;

        log_debug(&format!(
            "Loaded {} model(s) from {}",
            registry.len(),
            self.path.display()
        ));

        Ok(ConfigFile {
            registry,
            log_enabled: document.log_enabled,
        })
    }

    /// Atomically replace the configuration file with `config`
    pub fn save(&self, config: &ConfigFile) -> Result<(), ClippyError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|source| self.io(source))?;

        let document = ConfigDocument {
            models: config.registry.clone().into_profiles(),
            log_enabled: config.log_enabled,
        };
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| self.corrupt(format!("failed to serialize: {e}")))?;

        // NamedTempFile is created with 0600 on Unix
        let mut temp = NamedTempFile::new_in(&dir).map_err(|source| self.io(source))?;
        temp.write_all(json.as_bytes())
            .map_err(|source| self.io(source))?;
        temp.write_all(b"\n").map_err(|source| self.io(source))?;
        temp.as_file().sync_all().map_err(|source| self.io(source))?;
        temp.persist(&self.path)
            .map_err(|e| self.io(e.error))?;

        restrict_permissions(&self.path);

        log_info(&format!(
            "Saved {} model(s) to {}",
            document.models.len(),
            self.path.display()
        ));
        Ok(())
    }

    fn corrupt(&self, reason: String) -> ClippyError {
        ClippyError::ConfigCorrupt {
            path: self.path.clone(),
            reason,
        }
    }

    fn io(&self, source: std::io::Error) -> ClippyError {
        ClippyError::ConfigIo {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        log_warn(&format!(
            "Failed to restrict permissions on {}: {e}",
            path.display()
        ));
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

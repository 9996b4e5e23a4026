//! Interaction history: one JSON file per successful completion under
//! `~/.clippy/history/`, named by creation time in milliseconds.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::logging::{log_info, log_warn};

const HISTORY_EXTENSION: &str = "log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unix seconds
    pub timestamp: i64,
    pub prompt: String,
    pub model_name: String,
    pub provider_type: String,
    pub response: String,
}

impl HistoryEntry {
    pub fn new(prompt: &str, model_name: &str, provider_type: &str, response: &str) -> Self {
        Self {
            timestamp: Utc::now().timestamp(),
            prompt: prompt.to_string(),
            model_name: model_name.to_string(),
            provider_type: provider_type.to_string(),
            response: response.to_string(),
        }
    }

    /// e.g. "Wed Apr 09 - 18:00:58 2025"
    pub fn format_time(&self) -> String {
        format_timestamp(self.timestamp)
    }
}

pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%a %b %d - %H:%M:%S %Y")
                .to_string()
        })
        .unwrap_or_else(|| format!("@{timestamp}"))
}

/// What `clear` removed
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ClearOutcome {
    pub deleted: usize,
    pub failed: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone)]
pub struct History {
    dir: PathBuf,
}

impl History {
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_entry(&self, entry: &HistoryEntry) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create history directory {}", self.dir.display())
        })?;

        // Millisecond names keep ordering; bump on collision within the same ms
        let mut stamp = Utc::now().timestamp_millis();
        let mut path = self.file_for(stamp);
        while path.exists() {
            stamp += 1;
            path = self.file_for(stamp);
        }

        let json = serde_json::to_string_pretty(entry).context("Failed to serialize history entry")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write history entry {}", path.display()))?;

        log_info(&format!("Saved history entry {}", path.display()));
        Ok(path)
    }

    /// History files, oldest first
    pub fn list_files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut stamped = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read history directory {}", self.dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(HISTORY_EXTENSION) {
                continue;
            }
            match path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<i64>().ok())
            {
                Some(stamp) => stamped.push((stamp, path)),
                None => log_warn(&format!(
                    "Skipping history file with non-numeric name: {}",
                    path.display()
                )),
            }
        }

        stamped.sort_by_key(|(stamp, _)| *stamp);
        Ok(stamped.into_iter().map(|(_, path)| path).collect())
    }

    /// Up to `count` most recent files, newest first
    pub fn latest(&self, count: usize) -> Result<Vec<PathBuf>> {
        let mut files = self.list_files()?;
        files.reverse();
        files.truncate(count);
        Ok(files)
    }

    pub fn read_entry(path: &Path) -> Result<HistoryEntry> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read history entry {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid history entry {}", path.display()))
    }

    /// `count > 0` deletes the `count` oldest entries, `count < 0` keeps the
    /// `|count|` latest.
    pub fn clear(&self, count: i64) -> Result<ClearOutcome> {
        if count == 0 {
            anyhow::bail!(
                "Clear count cannot be zero. Use positive N to clear oldest, negative N to keep latest."
            );
        }

        let files = self.list_files()?;
        let total = files.len();
        let to_delete = if count > 0 {
            (count as usize).min(total)
        } else {
            total.saturating_sub(count.unsigned_abs() as usize)
        };

        let mut outcome = ClearOutcome::default();
        for path in files.iter().take(to_delete) {
            match fs::remove_file(path) {
                Ok(()) => outcome.deleted += 1,
                Err(e) => {
                    log_warn(&format!(
                        "Failed to delete history file {}: {e}",
                        path.display()
                    ));
                    outcome.failed += 1;
                }
            }
        }
        outcome.remaining = total - outcome.deleted;
        Ok(outcome)
    }

    fn file_for(&self, stamp: i64) -> PathBuf {
        self.dir.join(format!("{stamp}.{HISTORY_EXTENSION}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded(dir: &TempDir, stamps: &[i64]) -> History {
        let history = History::at(dir.path().join("history"));
        fs::create_dir_all(history.dir()).unwrap();
        for stamp in stamps {
            let entry = HistoryEntry {
                timestamp: stamp / 1000,
                prompt: format!("prompt {stamp}"),
                model_name: "gpt-4o".to_string(),
                provider_type: "openai".to_string(),
                response: format!("response {stamp}"),
            };
            fs::write(
                history.dir().join(format!("{stamp}.log")),
                serde_json::to_string(&entry).unwrap(),
            )
            .unwrap();
        }
        history
    }

    fn stems(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_stem().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let history = History::at(dir.path().join("nope"));
        assert!(history.list_files().unwrap().is_empty());
        assert_eq!(history.clear(-10).unwrap(), ClearOutcome::default());
    }

    #[test]
    fn test_save_and_read_entry() {
        let dir = TempDir::new().unwrap();
        let history = History::at(dir.path().join("history"));
        let entry = HistoryEntry::new("why?", "gemini-x", "google", "because");

        let first = history.save_entry(&entry).unwrap();
        let second = history.save_entry(&entry).unwrap();
        assert_ne!(first, second);

        assert_eq!(History::read_entry(&first).unwrap(), entry);
        assert_eq!(history.list_files().unwrap(), vec![first, second]);
    }

    #[test]
    fn test_list_sorts_numerically_and_skips_foreign_files() {
        let dir = TempDir::new().unwrap();
        let history = seeded(&dir, &[1000, 900, 20000]);
        fs::write(history.dir().join("notes.log"), "{}").unwrap();
        fs::write(history.dir().join("1500.txt"), "{}").unwrap();

        assert_eq!(
            stems(&history.list_files().unwrap()),
            vec!["900", "1000", "20000"]
        );
        assert_eq!(stems(&history.latest(2).unwrap()), vec!["20000", "1000"]);
    }

    #[test]
    fn test_clear_oldest() {
        let dir = TempDir::new().unwrap();
        let history = seeded(&dir, &[1, 2, 3, 4]);

        let outcome = history.clear(3).unwrap();
        assert_eq!(outcome.deleted, 3);
        assert_eq!(outcome.remaining, 1);
        assert_eq!(stems(&history.list_files().unwrap()), vec!["4"]);
    }

    #[test]
    fn test_clear_keeps_latest() {
        let dir = TempDir::new().unwrap();
        let history = seeded(&dir, &[1, 2, 3, 4]);

        let outcome = history.clear(-3).unwrap();
        assert_eq!(outcome.deleted, 1);
        assert_eq!(stems(&history.list_files().unwrap()), vec!["2", "3", "4"]);

        // Keeping more than exist deletes nothing
        assert_eq!(history.clear(-10).unwrap().deleted, 0);
    }

    #[test]
    fn test_clear_zero_is_rejected() {
        let dir = TempDir::new().unwrap();
        let history = seeded(&dir, &[1]);
        assert!(history.clear(0).is_err());
        assert_eq!(history.list_files().unwrap().len(), 1);
    }

    #[test]
    fn test_format_timestamp_shape() {
        let formatted = format_timestamp(1_744_214_458);
        assert!(formatted.contains(" - "));
        assert!(formatted.ends_with("2025"));
    }
}

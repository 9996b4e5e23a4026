use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

/// Name of the directory under the home directory holding all state
pub const CONFIG_DIR_NAME: &str = ".clippy";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const HISTORY_DIR_NAME: &str = "history";
pub const LOG_FILE_NAME: &str = "clippy.log";

/// Environment overrides
pub const HOME_ENV: &str = "CLIPPY_HOME";
pub const TIMEOUT_ENV: &str = "CLIPPY_TIMEOUT";
pub const LOG_TO_FILE_ENV: &str = "CLIPPY_LOG_TO_FILE";

/// Request timeout constants
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Get request timeout from environment variable or default
pub fn get_request_timeout() -> Duration {
    let secs = std::env::var(TIMEOUT_ENV)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

/// Sampling temperature sent with every completion request
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Terminal width used when pretty-printing responses
pub const OUTPUT_WRAP_WIDTH: usize = 100;

/// `log clear` keeps this many of the latest sessions when no count is given
pub const DEFAULT_HISTORY_CLEAR: i64 = -10;

/// Provider default endpoints (shown by `ls`; genai carries the same ones)
pub const OPENAI_DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/";
pub const GEMINI_DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/";
pub const ANTHROPIC_DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/";

/// URLs for user guidance
pub const OPENAI_API_KEY_URL: &str = "https://platform.openai.com/api-keys";
pub const GEMINI_API_KEY_URL: &str = "https://aistudio.google.com/app/apikey";
pub const ANTHROPIC_API_KEY_URL: &str = "https://console.anthropic.com/settings/keys";

/// Root state directory: `$CLIPPY_HOME` if set, otherwise `~/.clippy`
pub fn get_config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(HOME_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    let home_dir =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
    Ok(home_dir.join(CONFIG_DIR_NAME))
}

pub fn get_config_file() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

pub fn get_history_dir() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(HISTORY_DIR_NAME))
}

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::constants::{LOG_FILE_NAME, LOG_TO_FILE_ENV, get_config_dir};

static LOG_FILE: Mutex<Option<std::fs::File>> = Mutex::new(None);

/// Initialize logging system
/// - Console logging is ONLY enabled when RUST_LOG is set (to stderr, so
///   completions on stdout stay clean)
/// - File logging to ~/.clippy/clippy.log is enabled when CLIPPY_LOG_TO_FILE is set
pub fn init_logging() {
    let rust_log_present = env::var("RUST_LOG").is_ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if rust_log_present {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr);

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .try_init();
    } else {
        let _ = tracing_subscriber::registry().with(env_filter).try_init();
    }

    if let Err(e) = setup_file_logging() {
        eprintln!("Warning: Failed to set up file logging: {e}");
    }
}

fn setup_file_logging() -> anyhow::Result<()> {
    if env::var(LOG_TO_FILE_ENV).is_err() {
        return Ok(());
    }

    let config_dir = get_config_dir()?;
    std::fs::create_dir_all(&config_dir)?;
    let log_file_path = config_dir.join(LOG_FILE_NAME);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = Some(file);
    }

    log_info(&format!(
        "File logging enabled: {}",
        log_file_path.display()
    ));
    Ok(())
}

fn write_to_file(level: &str, msg: &str) {
    if let Ok(mut guard) = LOG_FILE.lock()
        && let Some(ref mut file) = *guard
    {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(file, "[{}] [{}] [clippy] {}", timestamp, level, msg);
        let _ = file.flush();
    }
}

pub fn log_error(msg: &str) {
    error!("{msg}");
    write_to_file("ERROR", msg);
}

pub fn log_warn(msg: &str) {
    warn!("{msg}");
    write_to_file("WARN", msg);
}

pub fn log_info(msg: &str) {
    info!("{msg}");
    write_to_file("INFO", msg);
}

pub fn log_debug(msg: &str) {
    debug!("{msg}");
    write_to_file("DEBUG", msg);
}

pub fn log_trace(msg: &str) {
    trace!("{msg}");
    write_to_file("TRACE", msg);
}

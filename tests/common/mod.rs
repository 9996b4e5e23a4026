//! Common utilities for clippy CLI integration tests

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use tempfile::TempDir;

/// Test configuration for integration tests
pub struct TestConfig {
    pub temp_dir: TempDir,
    pub clippy_binary: PathBuf,
}

impl TestConfig {
    /// Create a new test configuration with an isolated config home
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let clippy_binary = PathBuf::from(env!("CARGO_BIN_EXE_clippy"));

        Self {
            temp_dir,
            clippy_binary,
        }
    }

    /// Directory used as CLIPPY_HOME
    pub fn home(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_file(&self) -> PathBuf {
        self.home().join("config.json")
    }

    pub fn history_dir(&self) -> PathBuf {
        self.home().join("history")
    }

    /// Write raw content as the config file
    pub fn write_config(&self, content: &str) {
        fs::write(self.config_file(), content).expect("Failed to write config file");
    }

    pub fn read_config(&self) -> serde_json::Value {
        let content = fs::read_to_string(self.config_file()).expect("Failed to read config file");
        serde_json::from_str(&content).expect("Config file is not valid JSON")
    }

    /// Create a command to run clippy against the temporary home
    pub fn clippy_command(&self) -> Command {
        let mut command = Command::new(&self.clippy_binary);
        command
            .env("CLIPPY_HOME", self.home())
            .env("CLIPPY_TIMEOUT", "5")
            .env_remove("CLIPPY_LOG_TO_FILE")
            .env_remove("RUST_LOG")
            .stdin(Stdio::null());
        // Local stub servers must be reached directly
        for proxy in [
            "HTTP_PROXY",
            "HTTPS_PROXY",
            "ALL_PROXY",
            "http_proxy",
            "https_proxy",
            "all_proxy",
        ] {
            command.env_remove(proxy);
        }
        command
    }

    /// Run clippy with the given arguments
    pub fn run(&self, args: &[&str]) -> Output {
        self.clippy_command()
            .args(args)
            .output()
            .expect("Failed to execute clippy")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Minimal HTTP server answering every request with the same JSON response
pub struct StubServer {
    pub port: u16,
}

impl StubServer {
    /// `status` is the full status line text, e.g. "404 Not Found"
    pub fn start(status: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind stub server");
        let port = listener.local_addr().unwrap().port();
        let status = status.to_string();
        let body = body.to_string();

        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let _ = respond(stream, &status, &body);
            }
        });

        Self { port }
    }

    /// OpenAI-style base URL served by the stub
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}/v1", self.port)
    }
}

fn respond(mut stream: TcpStream, status: &str, body: &str) -> std::io::Result<()> {
    // Consume the whole request before answering
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line == "\r\n" {
            break;
        }
        if let Some((name, value)) = line.split_once(':')
            && name.trim().eq_ignore_ascii_case("content-length")
        {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }
    let mut request_body = vec![0; content_length];
    reader.read_exact(&mut request_body)?;

    write!(
        stream,
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )?;
    stream.flush()
}

/// Body of a successful OpenAI chat completion
pub fn chat_completion_body(text: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-stub",
        "object": "chat.completion",
        "created": 0,
        "model": "stub-model",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 5, "completion_tokens": 3, "total_tokens": 8 }
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::new();
        assert!(config.home().exists());
        assert!(config.clippy_binary.file_name().is_some());
        assert!(!config.config_file().exists());
    }
}

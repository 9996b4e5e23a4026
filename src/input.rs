use anyhow::{Context, Result};
use std::io::{self, Read};

use crate::logging::{log_debug, log_info};

pub fn read_stdin() -> Result<String> {
    log_debug("Reading from stdin");
    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read from stdin")?;

    let text = String::from_utf8_lossy(&buffer).to_string();
    log_info(&format!("Read {} characters from stdin", text.len()));
    Ok(text)
}

/// Piped stdin content, or `None` when stdin is an interactive terminal
pub fn read_piped_stdin() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        log_debug("No stdin data available (terminal input)");
        return Ok(None);
    }
    read_stdin().map(Some)
}

/// Build the prompt from command-line words and piped content.
///
/// The command-line text is the instruction and comes first; piped content
/// follows after a blank line as context.
pub fn assemble_prompt(prompt_args: &[String], piped: Option<&str>) -> String {
    let instruction = prompt_args.join(" ");
    let instruction = instruction.trim();
    let context = piped.map(str::trim).unwrap_or_default();

    let prompt = match (instruction.is_empty(), context.is_empty()) {
        (false, false) => format!("{instruction}\n\n{context}"),
        (false, true) => instruction.to_string(),
        (true, false) => context.to_string(),
        (true, true) => String::new(),
    };

    log_debug(&format!(
        "Assembled prompt: {} instruction + {} piped characters",
        instruction.len(),
        context.len()
    ));
    prompt
}

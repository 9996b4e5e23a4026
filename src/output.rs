use anyhow::{Context, Result};
use std::io::Write;

use crate::constants::OUTPUT_WRAP_WIDTH;
use crate::logging::log_debug;

fn wrap_text(text: &str, width: usize) -> String {
    let mut result = Vec::new();
    let mut prev_indent: Option<usize> = None;
    let mut prev_was_empty = false;
    let mut in_code_block = false;

    for line in text.lines() {
        // Code blocks are printed as-is
        if line.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
            result.push(line.to_string());
            prev_indent = None;
            continue;
        }
        if in_code_block {
            result.push(line.to_string());
            continue;
        }

        let is_empty = line.trim().is_empty();
        let curr_indent = line.chars().position(|c| c.is_alphanumeric()).unwrap_or(0);

        // Add newline if indentation decreased and previous line wasn't empty
        if let Some(prev) = prev_indent
            && !prev_was_empty
            && !is_empty
            && curr_indent < prev
        {
            result.push(String::new());
        }

        let indent = " ".repeat(curr_indent);
        let options = textwrap::Options::new(width).subsequent_indent(&indent);
        result.push(textwrap::fill(line, &options));

        prev_indent = Some(curr_indent);
        prev_was_empty = is_empty;
    }

    result.join("\n")
}

/// Print a completion on stdout.
///
/// Raw mode, or stdout that is not a terminal, prints the text exactly as the
/// provider returned it. Otherwise it gets a header and is wrapped.
pub fn print_completion(text: &str, raw: bool) -> Result<()> {
    let pretty = !raw && atty::is(atty::Stream::Stdout);
    log_debug(&format!("Printing completion (pretty: {pretty})"));

    let rendered = render_completion(text, pretty);
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .context("Failed to write response")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn render_completion(text: &str, pretty: bool) -> String {
    if pretty {
        format!(
            "\nAI Response:\n\n{}\n",
            wrap_text(text.trim(), OUTPUT_WRAP_WIDTH)
        )
    } else if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

/// Status lines go to stderr and only when a person is watching
pub fn print_status(message: &str) {
    if atty::is(atty::Stream::Stderr) {
        eprintln!("{message}");
    }
}

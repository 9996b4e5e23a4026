use anyhow::{Context, Result};

use crate::cli::{AskArgs, CliCommand, LogAction, SetModelArgs, print_completions};
use crate::constants::{get_history_dir, get_request_timeout};
use crate::dispatcher::Dispatcher;
use crate::error::ClippyError;
use crate::history::{History, HistoryEntry, format_timestamp};
use crate::input::{assemble_prompt, read_piped_stdin};
use crate::logging::{log_info, log_warn};
use crate::output::{print_completion, print_status};
use crate::profile::ProviderKind;
use crate::prompt::default_system_prompt;
use crate::provider::{AdapterSet, normalize_endpoint};
use crate::store::ProfileStore;

pub async fn run_app(command: CliCommand) -> Result<()> {
    match command {
        CliCommand::Completions(shell) => {
            print_completions(shell);
            Ok(())
        }
        CliCommand::Ask(args) => {
            let store = ProfileStore::open_default()?;
            let history = History::at(get_history_dir()?);
            handle_ask(store, &history, args).await
        }
        CliCommand::SetModel(args) => handle_set_model(&ProfileStore::open_default()?, &args),
        CliCommand::List => handle_list(&ProfileStore::open_default()?),
        CliCommand::SetDefault(name) => handle_set_default(&ProfileStore::open_default()?, &name),
        CliCommand::RemoveModel(name) => {
            handle_remove_model(&ProfileStore::open_default()?, &name)
        }
        CliCommand::Log(action) => {
            let store = ProfileStore::open_default()?;
            let history = History::at(get_history_dir()?);
            handle_log(&store, &history, action)
        }
    }
}

/// Split `<model_name>:<api_key>` on the first colon
pub fn parse_model_spec(spec: &str) -> Result<(String, String), ClippyError> {
    let (name, api_key) = spec
        .split_once(':')
        .ok_or_else(|| ClippyError::InvalidModelSpec(spec.to_string()))?;
    let (name, api_key) = (name.trim(), api_key.trim());
    if name.is_empty() || api_key.is_empty() {
        return Err(ClippyError::InvalidModelSpec(redact_spec(spec)));
    }
    Ok((name.to_string(), api_key.to_string()))
}

/// Keep the model part of a spec, hide the key part
fn redact_spec(spec: &str) -> String {
    match spec.split_once(':') {
        Some((name, key)) if !key.trim().is_empty() => format!("{name}:<redacted>"),
        _ => spec.to_string(),
    }
}

/// Explicit `--provider` wins; otherwise well-known prefixes, then
/// `openai-compatible` for models with a custom endpoint.
pub fn resolve_provider(
    name: &str,
    explicit: Option<ProviderKind>,
    endpoint: Option<&str>,
) -> Result<ProviderKind, ClippyError> {
    if let Some(kind) = explicit {
        return Ok(kind);
    }
    if let Some(kind) = ProviderKind::infer_from_model(name) {
        return Ok(kind);
    }
    if endpoint.is_some() {
        return Ok(ProviderKind::OpenAiCompatible);
    }
    Err(ClippyError::CannotInferProvider(name.to_string()))
}

fn handle_set_model(store: &ProfileStore, args: &SetModelArgs) -> Result<()> {
    let (name, api_key) = parse_model_spec(&args.model_api)?;
    let endpoint = args
        .endpoint
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(normalize_endpoint);
    let provider = resolve_provider(&name, args.provider, endpoint.as_deref())?;

    let mut config = store.load()?;
    let is_default = config
        .registry
        .upsert(&name, &api_key, provider, endpoint, args.make_default);
    store.save(&config)?;

    log_info(&format!("Configured model '{name}' ({provider})"));
    println!("Model '{name}' (type: {provider}) configured.");
    if is_default {
        println!("Model '{name}' is the default.");
    }
    Ok(())
}

fn handle_list(store: &ProfileStore) -> Result<()> {
    let config = store.load()?;
    if config.registry.is_empty() {
        println!("No models configured. Use 'clippy set_model <model_name>:<api_key>' to add one.");
        return Ok(());
    }

    log_info(&format!("Listing {} configured model(s)", config.registry.len()));
    println!("Configured Models:");
    for profile in config.registry.list() {
        let marker = if profile.is_default { "* " } else { "  " };
        match &profile.endpoint {
            Some(endpoint) => println!(
                "{marker}{} ({}, {endpoint})",
                profile.name, profile.provider
            ),
            None => println!("{marker}{} ({})", profile.name, profile.provider),
        }
    }
    println!();
    println!("(* indicates the default model)");
    Ok(())
}

fn handle_set_default(store: &ProfileStore, name: &str) -> Result<()> {
    let mut config = store.load()?;
    config.registry.set_default(name)?;
    store.save(&config)?;

    println!("Default model set to '{name}'.");
    Ok(())
}

fn handle_remove_model(store: &ProfileStore, name: &str) -> Result<()> {
    let mut config = store.load()?;
    let removed = config.registry.remove(name)?;
    store.save(&config)?;

    println!("Removed model '{}'.", removed.profile.name);
    if let Some(new_default) = removed.new_default {
        println!("Model '{new_default}' is now the default.");
    } else if removed.profile.is_default {
        println!("No models remain. Add one with 'clippy set_model <model_name>:<api_key>'.");
    }
    Ok(())
}

async fn handle_ask(store: ProfileStore, history: &History, args: AskArgs) -> Result<()> {
    let piped = read_piped_stdin()?;
    let prompt = assemble_prompt(&args.prompt, piped.as_deref());

    // Read once for the history preference; the dispatcher loads its own copy
    let log_enabled = store.load()?.log_enabled;

    let adapters = AdapterSet::standard(get_request_timeout(), default_system_prompt())
        .context("Failed to initialize AI providers")?;
    let dispatcher = Dispatcher::new(store, adapters);

    let completion = dispatcher.run(args.model.as_deref(), &prompt).await?;
    if !args.raw {
        print_status(&format!(
            "Answer from '{}' ({})",
            completion.profile_name, completion.provider
        ));
    }

    if log_enabled {
        let entry = HistoryEntry::new(
            &prompt,
            &completion.profile_name,
            completion.provider.as_str(),
            &completion.text,
        );
        if let Err(e) = history.save_entry(&entry) {
            log_warn(&format!("Failed to save history entry: {e:#}"));
        }
    }

    print_completion(&completion.text, args.raw)?;
    log_info("Successfully completed request");
    Ok(())
}

fn handle_log(store: &ProfileStore, history: &History, action: LogAction) -> Result<()> {
    match action {
        LogAction::Status => log_status(store, history),
        LogAction::On => set_logging(store, true),
        LogAction::Off => set_logging(store, false),
        LogAction::Show(count) => log_show(history, count),
        LogAction::Clear(count) => log_clear(history, count),
    }
}

fn set_logging(store: &ProfileStore, enabled: bool) -> Result<()> {
    let mut config = store.load()?;
    config.log_enabled = enabled;
    store.save(&config)?;

    if enabled {
        println!("Logging is enabled.");
    } else {
        println!("Logging is disabled.");
    }
    Ok(())
}

fn log_status(store: &ProfileStore, history: &History) -> Result<()> {
    let config = store.load()?;

    println!("Configuration file: {}", store.path().display());
    println!("Interaction logs are stored in: {}", history.dir().display());
    println!();
    println!("Sub-commands:");
    println!("  on         Enable logging (default)");
    println!("  off        Disable logging");
    println!("  show [N]   Show the latest N log sessions (default N=1)");
    println!("  clear [N]  Clear the oldest N logs, or keep the latest N if N is negative");
    println!();
    println!(
        "Current status: Logging is {}.",
        if config.log_enabled { "enabled" } else { "disabled" }
    );

    let files = history.list_files()?;
    if files.is_empty() {
        println!("History: No log sessions found.");
        return Ok(());
    }

    println!("History: Contains {} log session(s).", files.len());
    println!();
    println!("Latest log session timestamp(s):");
    for path in history.latest(3)? {
        let stamp = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or_default();
        println!("  - {}", format_timestamp(stamp / 1000));
    }
    Ok(())
}

fn log_show(history: &History, count: usize) -> Result<()> {
    if count == 0 {
        anyhow::bail!("Number of logs to show must be positive.");
    }

    let files = history.latest(count)?;
    if files.is_empty() {
        println!("No log history found.");
        return Ok(());
    }

    println!("Showing the latest {} log session(s):", files.len());
    let total = files.len();
    let mut shown = 0;
    for (index, path) in files.iter().enumerate() {
        let entry = match History::read_entry(path) {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!("Error: {e:#}");
                continue;
            }
        };

        println!();
        println!(
            "==== Session {} of {} ({}) ====",
            index + 1,
            total,
            entry.format_time()
        );
        println!("Model: '{}' ({})", entry.model_name, entry.provider_type);
        println!("Prompt:\n{}", textwrap::indent(&entry.prompt, "  "));
        println!("Response:\n{}", textwrap::indent(entry.response.trim(), "  "));
        shown += 1;
    }

    if shown == 0 {
        anyhow::bail!("None of the selected log sessions could be read.");
    }
    Ok(())
}

fn log_clear(history: &History, count: i64) -> Result<()> {
    let outcome = history.clear(count)?;
    if outcome.deleted == 0 && outcome.failed == 0 {
        println!("Nothing to clear. {} log file(s) remain.", outcome.remaining);
        return Ok(());
    }

    if outcome.failed == 0 {
        println!("Cleared {} log file(s).", outcome.deleted);
    } else {
        eprintln!(
            "Warning: Cleared {} log file(s), but failed to delete {}.",
            outcome.deleted, outcome.failed
        );
    }
    println!("{} log file(s) remain.", outcome.remaining);

    if outcome.failed > 0 {
        anyhow::bail!("Failed to delete {} log file(s).", outcome.failed);
    }
    Ok(())
}

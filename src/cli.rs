use clap::{Arg, ArgAction, ArgMatches, Command};
use clap_complete::{Shell, generate};

use crate::profile::ProviderKind;

/// Subcommand names recognised before falling back to `ask`
pub const KNOWN_COMMANDS: &[&str] = &[
    "set_model",
    "ask",
    "list",
    "ls",
    "set_default",
    "remove_model",
    "rm",
    "log",
    "completions",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetModelArgs {
    /// Raw `<model_name>:<api_key>` argument
    pub model_api: String,
    pub make_default: bool,
    pub provider: Option<ProviderKind>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskArgs {
    pub prompt: Vec<String>,
    pub model: Option<String>,
    pub raw: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogAction {
    Status,
    On,
    Off,
    Show(usize),
    Clear(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    SetModel(SetModelArgs),
    Ask(AskArgs),
    List,
    SetDefault(String),
    RemoveModel(String),
    Log(LogAction),
    Completions(Shell),
}

impl CliCommand {
    pub fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let matches = match build_cli().try_get_matches_from(default_to_ask(args)) {
            Ok(matches) => matches,
            Err(e) => {
                // Help and version go to stdout with success; usage errors exit 1
                let code = if e.use_stderr() {
                    i32::from(crate::error::EXIT_USAGE)
                } else {
                    0
                };
                let _ = e.print();
                std::process::exit(code);
            }
        };
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        match matches.subcommand() {
            Some(("set_model", sub)) => Self::SetModel(SetModelArgs {
                model_api: sub
                    .get_one::<String>("model_api")
                    .cloned()
                    .unwrap_or_default(),
                make_default: sub.get_flag("default"),
                provider: sub.get_one::<ProviderKind>("provider").copied(),
                endpoint: sub.get_one::<String>("endpoint").cloned(),
            }),
            Some(("list", _)) => Self::List,
            Some(("set_default", sub)) => Self::SetDefault(model_arg(sub)),
            Some(("remove_model", sub)) => Self::RemoveModel(model_arg(sub)),
            Some(("log", sub)) => Self::Log(match sub.subcommand() {
                Some(("on", _)) => LogAction::On,
                Some(("off", _)) => LogAction::Off,
                Some(("show", show)) => {
                    LogAction::Show(show.get_one::<usize>("count").copied().unwrap_or(1))
                }
                Some(("clear", clear)) => LogAction::Clear(
                    clear
                        .get_one::<i64>("count")
                        .copied()
                        .unwrap_or(crate::constants::DEFAULT_HISTORY_CLEAR),
                ),
                _ => LogAction::Status,
            }),
            Some(("completions", sub)) => Self::Completions(
                sub.get_one::<Shell>("shell")
                    .copied()
                    .unwrap_or(Shell::Bash),
            ),
            Some(("ask", sub)) => Self::Ask(ask_args(sub)),
            _ => Self::Ask(AskArgs {
                prompt: Vec::new(),
                model: None,
                raw: false,
            }),
        }
    }
}

fn model_arg(matches: &ArgMatches) -> String {
    matches
        .get_one::<String>("model")
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn ask_args(matches: &ArgMatches) -> AskArgs {
    AskArgs {
        prompt: matches
            .get_many::<String>("prompt")
            .unwrap_or_default()
            .cloned()
            .collect(),
        model: matches.get_one::<String>("model").cloned(),
        raw: matches.get_flag("raw"),
    }
}

/// Insert `ask` when the first token is not a subcommand, so bare text is a
/// prompt. Help and version flags stay top-level.
pub fn default_to_ask(mut args: Vec<String>) -> Vec<String> {
    let first = args.get(1).map(String::as_str);
    let needs_ask = match first {
        None => true,
        Some("-h" | "--help" | "-V" | "--version") => false,
        Some(token) => !KNOWN_COMMANDS.contains(&token),
    };
    if needs_ask {
        let at = args.len().min(1);
        args.insert(at, "ask".to_string());
    }
    args
}

pub fn build_cli() -> Command {
    Command::new("clippy")
        .version(env!("CLIPPY_VERSION"))
        .about("Clippy: your AI command-line assistant (OpenAI, Google Gemini, Anthropic and OpenAI-compatible APIs)")
        .after_help("Config: ~/.clippy/config.json (override the directory with CLIPPY_HOME)\nLogs:   ~/.clippy/history")
        .subcommand_required(false)
        .disable_help_subcommand(true)
        .subcommand(
            Command::new("set_model")
                .about("Configure an AI model (<model_name>:<api_key>)")
                .arg(
                    Arg::new("model_api")
                        .help("Model name and API key, e.g. \"gpt-4o:sk-...\", \"gemini-2.5-pro:AIza...\"")
                        .value_name("MODEL:API_KEY")
                        .required(true),
                )
                .arg(
                    Arg::new("default")
                        .short('d')
                        .long("default")
                        .help("Set this model as default")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("provider")
                        .short('p')
                        .long("provider")
                        .help("Provider serving the model (inferred from gpt-/gemini-/claude- names when omitted)")
                        .value_name("PROVIDER")
                        .value_parser(|s: &str| s.parse::<ProviderKind>())
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("endpoint")
                        .short('e')
                        .long("endpoint")
                        .help("Base URL override, e.g. http://localhost:11434/v1/")
                        .value_name("URL")
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("ask")
                .about("Ask the AI (default command)")
                .arg(
                    Arg::new("prompt")
                        .help("Prompt text. Piped stdin is appended as context")
                        .num_args(0..),
                )
                .arg(
                    Arg::new("model")
                        .short('m')
                        .long("model")
                        .help("Configured model to use (overrides the default)")
                        .value_name("MODEL")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("raw")
                        .long("raw")
                        .help("Print the response exactly as received")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("list")
                .visible_alias("ls")
                .about("List configured models"),
        )
        .subcommand(
            Command::new("set_default")
                .about("Set the default model")
                .arg(Arg::new("model").help("Name of a configured model").required(true)),
        )
        .subcommand(
            Command::new("remove_model")
                .visible_alias("rm")
                .about("Remove a configured model")
                .arg(Arg::new("model").help("Name of the model to remove").required(true)),
        )
        .subcommand(
            Command::new("log")
                .about("Manage interaction logs")
                .subcommand(Command::new("on").about("Enable logging (default)"))
                .subcommand(Command::new("off").about("Disable logging"))
                .subcommand(
                    Command::new("show")
                        .about("Show latest N log sessions")
                        .arg(
                            Arg::new("count")
                                .help("Number of latest sessions to show (default: 1)")
                                .value_parser(clap::value_parser!(usize))
                                .default_value("1"),
                        ),
                )
                .subcommand(
                    Command::new("clear")
                        .about("Clear log sessions")
                        .arg(
                            Arg::new("count")
                                .help("Number of OLDEST logs to clear. Negative N keeps the N latest (default: -10)")
                                .value_parser(clap::value_parser!(i64))
                                .allow_negative_numbers(true)
                                .default_value("-10"),
                        ),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion script")
                .arg(
                    Arg::new("shell")
                        .value_parser(clap::value_parser!(Shell))
                        .required(true),
                ),
        )
}

pub fn print_completions(shell: Shell) {
    let mut cmd = build_cli();
    generate(shell, &mut cmd, "clippy", &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliCommand {
        let argv: Vec<String> = std::iter::once("clippy")
            .chain(args.iter().copied())
            .map(String::from)
            .collect();
        let matches = build_cli()
            .try_get_matches_from(default_to_ask(argv))
            .unwrap();
        CliCommand::from_matches(&matches)
    }

    #[test]
    fn test_bare_text_becomes_ask() {
        assert_eq!(
            parse(&["what", "is", "rust"]),
            CliCommand::Ask(AskArgs {
                prompt: vec!["what".into(), "is".into(), "rust".into()],
                model: None,
                raw: false,
            })
        );
    }

    #[test]
    fn test_help_word_starts_a_prompt() {
        assert_eq!(
            parse(&["help", "me", "out"]),
            CliCommand::Ask(AskArgs {
                prompt: vec!["help".into(), "me".into(), "out".into()],
                model: None,
                raw: false,
            })
        );
    }

    #[test]
    fn test_no_arguments_is_empty_ask() {
        assert_eq!(
            parse(&[]),
            CliCommand::Ask(AskArgs {
                prompt: Vec::new(),
                model: None,
                raw: false,
            })
        );
    }

    #[test]
    fn test_leading_option_becomes_ask() {
        assert_eq!(
            parse(&["-m", "gemini-x", "--raw", "hi", "there"]),
            CliCommand::Ask(AskArgs {
                prompt: vec!["hi".into(), "there".into()],
                model: Some("gemini-x".into()),
                raw: true,
            })
        );
    }

    #[test]
    fn test_explicit_ask_with_model() {
        assert_eq!(
            parse(&["ask", "--model", "gpt-4o", "hello"]),
            CliCommand::Ask(AskArgs {
                prompt: vec!["hello".into()],
                model: Some("gpt-4o".into()),
                raw: false,
            })
        );
    }

    #[test]
    fn test_set_model_flags() {
        assert_eq!(
            parse(&[
                "set_model",
                "llama3:sk-local",
                "--default",
                "--provider",
                "openai-compatible",
                "--endpoint",
                "http://localhost:11434/v1",
            ]),
            CliCommand::SetModel(SetModelArgs {
                model_api: "llama3:sk-local".into(),
                make_default: true,
                provider: Some(ProviderKind::OpenAiCompatible),
                endpoint: Some("http://localhost:11434/v1".into()),
            })
        );
    }

    #[test]
    fn test_set_model_rejects_unknown_provider() {
        let argv = vec![
            "clippy".to_string(),
            "set_model".to_string(),
            "m:k".to_string(),
            "--provider".to_string(),
            "mistral".to_string(),
        ];
        assert!(build_cli().try_get_matches_from(argv).is_err());
    }

    #[test]
    fn test_list_aliases() {
        assert_eq!(parse(&["list"]), CliCommand::List);
        assert_eq!(parse(&["ls"]), CliCommand::List);
    }

    #[test]
    fn test_remove_and_set_default() {
        assert_eq!(
            parse(&["remove_model", "gpt-4o"]),
            CliCommand::RemoveModel("gpt-4o".into())
        );
        assert_eq!(
            parse(&["rm", "gpt-4o"]),
            CliCommand::RemoveModel("gpt-4o".into())
        );
        assert_eq!(
            parse(&["set_default", "gemini-x"]),
            CliCommand::SetDefault("gemini-x".into())
        );
    }

    #[test]
    fn test_log_actions() {
        assert_eq!(parse(&["log"]), CliCommand::Log(LogAction::Status));
        assert_eq!(parse(&["log", "on"]), CliCommand::Log(LogAction::On));
        assert_eq!(parse(&["log", "off"]), CliCommand::Log(LogAction::Off));
        assert_eq!(parse(&["log", "show"]), CliCommand::Log(LogAction::Show(1)));
        assert_eq!(
            parse(&["log", "show", "3"]),
            CliCommand::Log(LogAction::Show(3))
        );
        assert_eq!(
            parse(&["log", "clear"]),
            CliCommand::Log(LogAction::Clear(-10))
        );
        assert_eq!(
            parse(&["log", "clear", "-2"]),
            CliCommand::Log(LogAction::Clear(-2))
        );
        assert_eq!(
            parse(&["log", "clear", "5"]),
            CliCommand::Log(LogAction::Clear(5))
        );
    }

    #[test]
    fn test_default_to_ask_keeps_help_and_version() {
        let help = default_to_ask(vec!["clippy".into(), "--help".into()]);
        assert_eq!(help, vec!["clippy", "--help"]);

        let version = default_to_ask(vec!["clippy".into(), "-V".into()]);
        assert_eq!(version, vec!["clippy", "-V"]);
    }

    #[test]
    fn test_completions_shell() {
        assert_eq!(
            parse(&["completions", "zsh"]),
            CliCommand::Completions(Shell::Zsh)
        );
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        build_cli().debug_assert();
    }
}

mod cli;
mod dispatch;
mod output;
mod stdout_io;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use stdout_io::write_stdout_text;
use subwatch_client::ClientError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const ROOT_HELP: &str = "Subwatch - recurring payment detection for transaction histories

Usage:
  subwatch <command>

Start here:
  subwatch demo detect
  subwatch detect --help
";

const TOP_LEVEL_HELP: &str = "Subwatch - recurring payment detection for transaction histories

USAGE: subwatch <command>

Try it:
  subwatch demo detect                                    Detect subscriptions in bundled sample data
  subwatch demo upcoming                                  Preview upcoming bills from the sample

Find subscriptions in your own history:
  1. subwatch detect --help                               Read accepted formats and field names
  2. subwatch detect <path>                               List every recurring charge with stats
  3. subwatch upcoming <path>                             Bills expected in the next 7 days

Useful flags:
  --json                                                  Machine-readable output on stdout
  --today YYYY-MM-DD                                      Evaluate activity as of another date
  --sign-convention positive_is_spend                     Amounts exported as positive charges
  -v, --verbose                                           Log detection decisions to stderr

Reading from stdin:
  cat transactions.csv | subwatch detect -
";

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }
    let parsed = cli::Cli::try_parse();
    let cli = match parsed {
        Ok(value) => value,
        Err(err) => {
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                let text = if err.kind() != ErrorKind::DisplayVersion
                    && is_top_level_help_request(&raw_args)
                {
                    TOP_LEVEL_HELP.to_string()
                } else {
                    err.to_string()
                };
                if write_stdout_text(&text).is_err() {
                    return Err(ExitCode::from(2));
                }
                return Ok(ExitCode::SUCCESS);
            }
            let command_hint = if matches!(
                err.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::InvalidValue
                    | ErrorKind::ValueValidation
                    | ErrorKind::WrongNumberOfValues
                    | ErrorKind::UnknownArgument
                    | ErrorKind::ArgumentConflict
            ) {
                command_path_from_args(&raw_args)
            } else {
                None
            };
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let parse_error =
                ClientError::invalid_argument_for_command(&clean_message, command_hint.as_deref());
            let mode = infer_requested_output_mode(&raw_args);
            if output::print_failure(&parse_error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            return Err(ExitCode::from(1));
        }
    };

    init_tracing(cli.verbose);
    let mode = output::mode_for_command(&cli.command);

    let dispatched = dispatch::dispatch(&cli);
    match dispatched {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            tracing::debug!(code = %error.code, "command failed");
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

/// Priority: RUST_LOG > --verbose > warn. Logs go to stderr so stdout stays parseable.
fn init_tracing(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Strips clap's trailing Usage line and "For more information" hint.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_end().to_string()
}

/// Subcommand path ("detect", "demo upcoming", ...) for help hints.
fn command_path_from_args(raw_args: &[String]) -> Option<String> {
    let non_flags: Vec<&str> = raw_args
        .iter()
        .skip(1)
        .filter(|value| !value.starts_with('-'))
        .map(String::as_str)
        .collect();

    let hint = match non_flags.as_slice() {
        ["detect", ..] => Some("detect"),
        ["upcoming", ..] => Some("upcoming"),
        ["demo", "detect", ..] => Some("demo detect"),
        ["demo", "upcoming", ..] => Some("demo upcoming"),
        ["demo", ..] => Some("demo"),
        _ => None,
    };
    hint.map(std::string::ToString::to_string)
}

fn exit_code_for_error(error: &ClientError) -> ExitCode {
    if is_internal_error(error) {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}

fn is_internal_error(error: &ClientError) -> bool {
    error.code.starts_with("internal_")
}

#[cfg(test)]
mod tests {
    use subwatch_client::ClientError;

    use super::{command_path_from_args, is_internal_error, strip_clap_boilerplate};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn command_path_skips_flags_and_paths_after_the_command() {
        assert_eq!(
            command_path_from_args(&args(&["subwatch", "detect", "rows.json", "--json"])).as_deref(),
            Some("detect")
        );
        assert_eq!(
            command_path_from_args(&args(&["subwatch", "-v", "demo", "upcoming"])).as_deref(),
            Some("demo upcoming")
        );
        assert_eq!(command_path_from_args(&args(&["subwatch", "sync"])), None);
    }

    #[test]
    fn clap_boilerplate_is_removed() {
        let message = "error: invalid value '9x' for '--limit <LIMIT>'\n\nUsage: subwatch detect";
        assert_eq!(
            strip_clap_boilerplate(message),
            "error: invalid value '9x' for '--limit <LIMIT>'"
        );
    }

    #[test]
    fn only_internal_codes_are_internal() {
        assert!(is_internal_error(&ClientError::internal_serialization("boom")));
        assert!(!is_internal_error(&ClientError::invalid_argument("bad")));
    }
}

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDate(pub String);

impl IsoDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn parse_iso_date(value: &str) -> Result<IsoDate, String> {
    if value.len() != 10 {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return Err("date must use YYYY-MM-DD format".to_string());
        }
    }

    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err("date must use valid calendar values".to_string());
    }

    Ok(IsoDate(value.to_string()))
}

pub fn parse_sign_convention(value: &str) -> Result<String, String> {
    match value {
        "negative_is_spend" | "positive_is_spend" => Ok(value.to_string()),
        _ => Err("sign convention must be one of: negative_is_spend, positive_is_spend".to_string()),
    }
}

pub fn parse_status(value: &str) -> Result<String, String> {
    match value {
        "all" | "active" | "inactive" => Ok(value.to_string()),
        _ => Err("status must be one of: all, active, inactive".to_string()),
    }
}

pub fn parse_frequency(value: &str) -> Result<String, String> {
    match value {
        "weekly" | "monthly" | "quarterly" | "yearly" => Ok(value.to_string()),
        _ => Err("frequency must be one of: weekly, monthly, quarterly, yearly".to_string()),
    }
}

/// Extended help shown after `subwatch detect --help`.
pub const DETECT_AFTER_HELP: &str = "\
How detection works:
  Subwatch reads a transaction history and reports charges that repeat on a
  steady schedule with a steady amount. Nothing is stored; every run reads
  the input fresh.

  Accepted formats:
    JSON: one top-level array of transaction objects
    CSV:  one header row naming the fields below

  <path> is a local file path.
  To read stdin explicitly, use `-` as the path.
  Example: cat transactions.json | subwatch detect -

Transaction fields (JSON keys or CSV headers):
  id (required):        `id` or `transaction_id`
  merchant (required):  `merchant`, `merchant_name` or `name` (first non-empty wins)
  amount (required):    a number; see --sign-convention
  date (required):      `date` or `posted_at`, `YYYY-MM-DD` (timestamps are cut to the date)
  category (optional):  a string, or a list whose first entry is used

  Rows missing a required field, or with an unreadable date or amount,
  are skipped and counted in the report.

Sign convention:
  negative_is_spend (default): -12.99 is a charge, 12.99 is a refund
  positive_is_spend:           12.99 is a charge (bank aggregator exports)

Configuration:
  Defaults come from `~/.subwatch/config.toml` (or `$SUBWATCH_HOME/config.toml`,
  or the file named by `SUBWATCH_CONFIG`, or `--config`). Flags win over the file.

  [detection]
  sign_convention = \"negative_is_spend\"
  interval_tolerance_days = 5

  [detection.amount_tolerance]
  kind = \"absolute\"   # or \"relative\"
  value = 5.0
";

#[derive(Debug, Parser)]
#[command(
    name = "subwatch",
    version,
    about = "recurring payment detection for transaction histories",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Log detection decisions to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Args, Default)]
pub struct PolicyArgs {
    /// Read detection settings from this TOML file
    #[arg(long)]
    pub config: Option<String>,
    /// Which amount sign marks money leaving the account
    #[arg(long, value_parser = parse_sign_convention)]
    pub sign_convention: Option<String>,
    /// Allowed deviation from the average charge, in currency units
    #[arg(long, conflicts_with = "relative_tolerance")]
    pub absolute_tolerance: Option<f64>,
    /// Allowed deviation from the average charge, as a fraction (0.10 = 10%)
    #[arg(long)]
    pub relative_tolerance: Option<f64>,
    /// Allowed deviation from the average gap between charges, in days
    #[arg(long)]
    pub interval_tolerance_days: Option<f64>,
    /// Reference date for activity and due dates (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = parse_iso_date)]
    pub today: Option<IsoDate>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Detect subscriptions and other recurring charges in a transaction history
    #[command(after_long_help = DETECT_AFTER_HELP)]
    Detect {
        /// Path to a JSON or CSV transaction file (use `-` for stdin)
        path: Option<String>,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Only show subscriptions with this status
        #[arg(long, value_parser = parse_status)]
        status: Option<String>,
        /// Only show subscriptions with this frequency
        #[arg(long, value_parser = parse_frequency)]
        frequency: Option<String>,
        /// Only show subscriptions scoring at least this confidence (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        min_confidence: Option<u8>,
        /// Show at most this many subscriptions
        #[arg(long)]
        limit: Option<usize>,
        /// Emit structured JSON object output for machine parsing
        #[arg(long)]
        json: bool,
    },
    /// List active subscriptions expected to charge soon
    Upcoming {
        /// Path to a JSON or CSV transaction file (use `-` for stdin)
        path: Option<String>,
        #[command(flatten)]
        policy: PolicyArgs,
        /// How many days ahead to look (default 7)
        #[arg(long)]
        within_days: Option<i64>,
        /// Emit structured JSON object output for machine parsing
        #[arg(long)]
        json: bool,
    },
    /// Preview subscription detection using bundled sample data
    #[command(arg_required_else_help = true)]
    Demo {
        #[command(subcommand)]
        command: DemoCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum DemoCommand {
    /// Detect subscriptions in the sample history
    Detect {
        /// Emit structured JSON object output for machine parsing
        #[arg(long)]
        json: bool,
    },
    /// Preview upcoming bills from the sample history
    Upcoming {
        /// Emit structured JSON object output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::{Commands, DemoCommand, parse_from};

    #[test]
    fn parse_command_paths() {
        let cases: [Vec<&str>; 12] = [
            vec!["subwatch", "detect", "rows.json"],
            vec!["subwatch", "detect", "-", "--json"],
            vec!["subwatch", "detect", "rows.csv", "--status", "active"],
            vec!["subwatch", "detect", "rows.csv", "--frequency", "monthly", "--limit", "3"],
            vec!["subwatch", "detect", "rows.csv", "--min-confidence", "90"],
            vec!["subwatch", "detect", "rows.csv", "--sign-convention", "positive_is_spend"],
            vec!["subwatch", "detect", "rows.csv", "--relative-tolerance", "0.1"],
            vec!["subwatch", "-v", "detect", "rows.csv", "--today", "2026-03-01"],
            vec!["subwatch", "upcoming", "rows.json", "--within-days", "14"],
            vec!["subwatch", "upcoming", "-", "--config", "alt.toml", "--json"],
            vec!["subwatch", "demo", "detect"],
            vec!["subwatch", "demo", "upcoming", "--json", "--verbose"],
        ];

        for case in cases {
            let parsed = parse_from(case.clone());
            assert!(parsed.is_ok(), "failed to parse: {case:?}");
        }
    }

    #[test]
    fn parse_detect_flags_into_policy_args() {
        let parsed = parse_from([
            "subwatch",
            "detect",
            "rows.json",
            "--absolute-tolerance",
            "2.5",
            "--interval-tolerance-days",
            "3",
            "--json",
        ]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert!(!cli.verbose);
            match cli.command {
                Commands::Detect {
                    path, policy, json, ..
                } => {
                    assert_eq!(path.as_deref(), Some("rows.json"));
                    assert_eq!(policy.absolute_tolerance, Some(2.5));
                    assert_eq!(policy.interval_tolerance_days, Some(3.0));
                    assert!(json);
                }
                other => panic!("unexpected command: {other:?}"),
            }
        }
    }

    #[test]
    fn tolerance_flags_conflict() {
        let parsed = parse_from([
            "subwatch",
            "detect",
            "rows.json",
            "--absolute-tolerance",
            "2",
            "--relative-tolerance",
            "0.1",
        ]);
        assert!(parsed.is_err());
        if let Err(err) = parsed {
            assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        }
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_date = parse_from(["subwatch", "detect", "rows.json", "--today", "2026-02-30"]);
        assert!(bad_date.is_err());

        let bad_status = parse_from(["subwatch", "detect", "rows.json", "--status", "lapsed"]);
        assert!(bad_status.is_err());

        let bad_confidence =
            parse_from(["subwatch", "detect", "rows.json", "--min-confidence", "150"]);
        assert!(bad_confidence.is_err());

        let bad_sign = parse_from(["subwatch", "detect", "rows.json", "--sign-convention", "up"]);
        assert!(bad_sign.is_err());
    }

    #[test]
    fn demo_subcommands_parse() {
        let parsed = parse_from(["subwatch", "demo", "upcoming", "--json"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert!(matches!(
                cli.command,
                Commands::Demo {
                    command: DemoCommand::Upcoming { json: true }
                }
            ));
        }
    }

    #[test]
    fn bare_demo_shows_help() {
        let parsed = parse_from(["subwatch", "demo"]);
        assert!(parsed.is_err());
        if let Err(err) = parsed {
            assert_eq!(
                err.kind(),
                ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            );
        }
    }

    #[test]
    fn help_command_is_rejected() {
        let parsed = parse_from(["subwatch", "help"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn detect_help_uses_clap_display_help() {
        let parsed = parse_from(["subwatch", "detect", "--help"]);
        assert!(parsed.is_err());
        if let Err(err) = parsed {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}

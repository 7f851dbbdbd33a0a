use std::path::Path;

use subwatch_client::commands::common::SourceOptions;
use subwatch_client::commands::detect::DetectRunOptions;
use subwatch_client::commands::upcoming::UpcomingRunOptions;
use subwatch_client::commands;
use subwatch_client::config::PolicyOverrides;
use subwatch_client::{ClientResult, SuccessEnvelope};

use crate::cli::{Cli, Commands, DemoCommand, PolicyArgs};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Detect {
            path,
            policy,
            status,
            frequency,
            min_confidence,
            limit,
            ..
        } => commands::detect::run_with_options(DetectRunOptions {
            source: source_options(path, policy),
            status: status.clone(),
            frequency: frequency.clone(),
            min_confidence: *min_confidence,
            limit: *limit,
        }),
        Commands::Upcoming {
            path,
            policy,
            within_days,
            ..
        } => commands::upcoming::run_with_options(UpcomingRunOptions {
            source: source_options(path, policy),
            within_days: *within_days,
        }),
        Commands::Demo { command } => commands::demo::run(demo_command_to_str(command)),
    }
}

fn source_options<'a>(path: &Option<String>, policy: &'a PolicyArgs) -> SourceOptions<'a> {
    SourceOptions {
        path: path.clone(),
        stdin_override: None,
        config_path: policy.config.as_deref().map(Path::new),
        overrides: PolicyOverrides {
            sign_convention: policy.sign_convention.clone(),
            absolute_tolerance: policy.absolute_tolerance,
            relative_tolerance: policy.relative_tolerance,
            interval_tolerance_days: policy.interval_tolerance_days,
        },
        today: Some(reference_date(policy)),
    }
}

/// The library never reads the clock, so the local date is filled in here.
fn reference_date(policy: &PolicyArgs) -> String {
    match &policy.today {
        Some(date) => date.as_str().to_string(),
        None => chrono::Local::now()
            .date_naive()
            .format("%Y-%m-%d")
            .to_string(),
    }
}

fn demo_command_to_str(command: &DemoCommand) -> &'static str {
    match command {
        DemoCommand::Detect { .. } => "detect",
        DemoCommand::Upcoming { .. } => "upcoming",
    }
}

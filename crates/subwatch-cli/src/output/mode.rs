use crate::cli::{Commands, DemoCommand};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Detect { json, .. } | Commands::Upcoming { json, .. } => *json,
        Commands::Demo { command } => match command {
            DemoCommand::Detect { json } | DemoCommand::Upcoming { json } => *json,
        },
    };
    if json {
        OutputMode::Json
    } else {
        OutputMode::Text
    }
}

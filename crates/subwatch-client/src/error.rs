use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

pub(crate) const INPUT_HELP_COMMAND: &str = "subwatch detect --help";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_input_help(self) -> Self {
        self.with_input_help_data(json!({}))
    }

    pub fn with_input_help_data(self, data: Value) -> Self {
        self.with_data(merge_input_help_data(data))
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `subwatch {cmd} --help` for usage."),
            None => "Run `subwatch --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn invalid_config(field: &str, message: &str) -> Self {
        Self::new(
            "invalid_config",
            &format!("Invalid detection setting `{field}`: {message}"),
            vec![
                "Fix the value in your config file or command-line flags.".to_string(),
                "Tolerances must be finite and non-negative; relative tolerance must be at most 1.0."
                    .to_string(),
            ],
        )
        .with_data(json!({
            "field": field,
        }))
    }

    pub fn config_read_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "config_read_failed",
            &format!("Could not load config at `{location}`: {detail}"),
            vec![
                format!("Verify `{location}` exists and is valid TOML."),
                "Or unset `SUBWATCH_CONFIG` to fall back to built-in defaults.".to_string(),
            ],
        )
        .with_data(json!({
            "path": location,
        }))
    }

    pub fn invalid_input(message: &str) -> Self {
        Self::invalid_argument_with_recovery(
            message,
            vec![
                "Provide a JSON array or CSV of transactions.".to_string(),
                format!("Run `{INPUT_HELP_COMMAND}` to review the accepted fields."),
            ],
        )
        .with_input_help()
    }

    pub fn input_read_failed(source: &str, detail: &str) -> Self {
        Self::new(
            "input_read_failed",
            &format!("Could not read transactions from {source}: {detail}"),
            vec![
                "Verify the path exists and is readable.".to_string(),
                "Or pipe the transactions via stdin using `-` as the path.".to_string(),
            ],
        )
    }

    pub fn invalid_input_format(message: &str, received_format: &str) -> Self {
        Self::new(
            "invalid_input_format",
            message,
            vec![
                "Provide a supported input format (JSON array or CSV).".to_string(),
                format!("Run `{INPUT_HELP_COMMAND}` to confirm field requirements."),
            ],
        )
        .with_input_help_data(json!({
            "received_format": received_format,
            "supported_formats": ["json_array", "csv"],
        }))
    }

    pub fn input_schema_mismatch(
        required_fields: Vec<String>,
        accepted_headers: Vec<String>,
        actual_headers: Vec<String>,
    ) -> Self {
        Self::new(
            "input_schema_mismatch",
            "CSV headers do not include every required transaction field.",
            vec![
                "Include one header for each required field (any accepted alias).".to_string(),
                format!("Run `{INPUT_HELP_COMMAND}` to review accepted headers."),
            ],
        )
        .with_input_help_data(json!({
            "required_fields": required_fields,
            "accepted_headers": accepted_headers,
            "actual_headers": actual_headers,
        }))
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }
}

fn merge_input_help_data(mut data: Value) -> Value {
    if !data.is_object() {
        data = json!({});
    }

    if let Some(object) = data.as_object_mut() {
        object.insert(
            "help_command".to_string(),
            Value::String(INPUT_HELP_COMMAND.to_string()),
        );
    }

    data
}

pub type ClientResult<T> = Result<T, ClientError>;

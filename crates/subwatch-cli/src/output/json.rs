use std::io;

use serde::Serialize;
use subwatch_client::contracts::envelope::failure_from_error;
use subwatch_client::{ClientError, SuccessEnvelope};

pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    match success.command.as_str() {
        "detect" | "upcoming" | "demo" => serialize_json_pretty(success),
        _ => Err(io::Error::other(format!(
            "JSON output is not supported for command `{}`",
            success.command
        ))),
    }
}

pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    serialize_json_pretty(&failure_from_error(error))
}

fn serialize_json_pretty<T>(value: &T) -> io::Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use subwatch_client::{ClientError, SuccessEnvelope};

    use super::{render_error_json, render_success_json};

    fn success(command: &str, data: Value) -> SuccessEnvelope {
        SuccessEnvelope {
            ok: true,
            command: command.to_string(),
            version: "0.1.0".to_string(),
            data,
        }
    }

    #[test]
    fn detect_json_keeps_the_full_envelope() {
        let payload = success(
            "detect",
            json!({"today": "2026-03-20", "subscriptions": [{"merchant": "Netflix"}]}),
        );

        let rendered = render_success_json(&payload);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(value["ok"], Value::Bool(true));
                assert_eq!(value["command"], "detect");
                assert_eq!(value["version"], "0.1.0");
                assert_eq!(value["data"]["subscriptions"][0]["merchant"], "Netflix");
            }
        }
    }

    #[test]
    fn unknown_command_is_rejected() {
        let rendered = render_success_json(&success("sql", json!({})));
        assert!(rendered.is_err());
    }

    #[test]
    fn runtime_error_json_uses_universal_shape() {
        let error = ClientError::new(
            "invalid_input_format",
            "NDJSON is not supported",
            vec!["wrap rows in a JSON array".to_string()],
        );
        let rendered = render_error_json(&error);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(
                    value["error"]["code"],
                    Value::String("invalid_input_format".to_string())
                );
                assert_eq!(value["error"]["recovery_steps"][0], "wrap rows in a JSON array");
                assert!(value.get("ok").is_none());
            }
        }
    }
}

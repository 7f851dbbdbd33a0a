use serde_json::Value;
use subwatch_client::ClientError;

pub fn render_error(error: &ClientError) -> String {
    let mut lines = vec![
        "Subwatch could not finish this command.".to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
    ];

    let detail_rows = error_detail_rows(error);
    if !detail_rows.is_empty() {
        lines.extend(detail_rows);
    }

    lines.push(String::new());
    lines.push("What to do next:".to_string());
    if error.recovery_steps.is_empty() {
        lines.push("  1. Retry the command.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    lines.join("\n")
}

fn error_detail_rows(error: &ClientError) -> Vec<String> {
    let Some(data) = error.data.as_ref() else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for (key, label) in [("required_fields", "Required"), ("actual_headers", "Found")] {
        if let Some(values) = data.get(key).and_then(Value::as_array) {
            let names = values
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<&str>>();
            rows.push(format!("  {:<9} {}", format!("{label}:"), names.join(", ")));
        }
    }
    if let Some(received) = data.get("received_format").and_then(Value::as_str) {
        rows.push(format!("  Format:   {received}"));
    }
    rows
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use subwatch_client::ClientError;

    use super::render_error;

    #[test]
    fn renders_standard_error_layout() {
        let error = ClientError::invalid_argument_with_recovery(
            "limit must be positive",
            vec!["run subwatch detect --help".to_string()],
        );

        let rendered = render_error(&error);
        assert!(rendered.starts_with("Subwatch could not finish this command."));
        assert!(rendered.contains("  Error:    invalid_argument"));
        assert!(rendered.contains("  Details:  limit must be positive"));
        assert!(rendered.contains("What to do next:"));
        assert!(rendered.contains("  1. run subwatch detect --help"));
    }

    #[test]
    fn renders_schema_details_from_error_data() {
        let error = ClientError::new("input_schema_mismatch", "CSV header is incomplete", vec![])
            .with_data(json!({
                "required_fields": ["id", "merchant", "amount", "date"],
                "actual_headers": ["id", "merchant", "amount"],
                "received_format": "csv"
            }));

        let rendered = render_error(&error);
        assert!(rendered.contains("  Required: id, merchant, amount, date"));
        assert!(rendered.contains("  Found:    id, merchant, amount"));
        assert!(rendered.contains("  Format:   csv"));
        assert!(rendered.contains("  1. Retry the command."));
    }
}

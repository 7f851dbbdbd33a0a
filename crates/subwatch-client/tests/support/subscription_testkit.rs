use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use subwatch_client::commands::common::SourceOptions;
use subwatch_client::commands::detect::{self, DetectRunOptions};
use subwatch_client::commands::upcoming::{self, UpcomingRunOptions};
use subwatch_client::config::PolicyOverrides;
use tempfile::{Builder, TempDir};

pub fn temp_workspace(prefix: &str) -> std::io::Result<(TempDir, PathBuf)> {
    let dir = Builder::new().prefix(prefix).tempdir_in("/tmp")?;
    let config = dir.path().join("config.toml");
    fs::write(&config, "")?;
    Ok((dir, config))
}

pub fn transaction(id: &str, merchant: &str, amount: f64, date: &str) -> Value {
    json!({
        "id": id,
        "merchant": merchant,
        "amount": amount,
        "date": date,
    })
}

/// Same merchant and amount on each date, ids numbered in order.
pub fn series(prefix: &str, merchant: &str, amount: f64, dates: &[&str]) -> Vec<Value> {
    dates
        .iter()
        .enumerate()
        .map(|(index, date)| transaction(&format!("{prefix}_{index}"), merchant, amount, date))
        .collect()
}

pub fn write_fixture_json(base: &Path, name: &str, rows: &[Value]) -> std::io::Result<PathBuf> {
    let path = base.join(name);
    let body = serde_json::to_string_pretty(rows).map_err(std::io::Error::other)?;
    fs::write(&path, body)?;
    Ok(path)
}

pub fn envelope_value<T: serde::Serialize>(envelope: T) -> Value {
    let payload = serde_json::to_value(envelope);
    assert!(payload.is_ok());
    payload.unwrap_or(Value::Null)
}

pub fn detect_payload(rows: &[Value], today: &str, overrides: PolicyOverrides) -> Value {
    let temp = temp_workspace("subwatch-detect-scenario");
    assert!(temp.is_ok());
    if let Ok((dir, config)) = temp {
        let fixture = write_fixture_json(dir.path(), "rows.json", rows);
        assert!(fixture.is_ok());
        if let Ok(path) = fixture {
            let result = detect::run_with_options(DetectRunOptions {
                source: SourceOptions {
                    path: Some(path.display().to_string()),
                    stdin_override: Some(String::new()),
                    config_path: Some(&config),
                    overrides,
                    today: Some(today.to_string()),
                },
                ..DetectRunOptions::default()
            });
            assert!(result.is_ok());
            if let Ok(success) = result {
                return envelope_value(success);
            }
        }
    }
    Value::Null
}

pub fn upcoming_payload(rows: &[Value], today: &str, within_days: Option<i64>) -> Value {
    let temp = temp_workspace("subwatch-upcoming-scenario");
    assert!(temp.is_ok());
    if let Ok((_dir, config)) = temp {
        let body = serde_json::to_string(rows).unwrap_or_default();
        let result = upcoming::run_with_options(UpcomingRunOptions {
            source: SourceOptions {
                path: Some("-".to_string()),
                stdin_override: Some(body),
                config_path: Some(&config),
                overrides: PolicyOverrides::default(),
                today: Some(today.to_string()),
            },
            within_days,
        });
        assert!(result.is_ok());
        if let Ok(success) = result {
            return envelope_value(success);
        }
    }
    Value::Null
}

pub fn run_scenario(rows: &[Value], today: &str) -> Vec<Value> {
    detect_payload(rows, today, PolicyOverrides::default())["data"]["subscriptions"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

pub fn subscription_exists(rows: &[Value], merchant_key: &str, frequency: &str) -> bool {
    rows.iter().any(|row| {
        row.get("merchant_key").and_then(Value::as_str) == Some(merchant_key)
            && row.get("frequency").and_then(Value::as_str) == Some(frequency)
    })
}

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::{ClientError, ClientResult};

pub(crate) const ID_FIELDS: &[&str] = &["id", "transaction_id"];
pub(crate) const MERCHANT_FIELDS: &[&str] = &["merchant", "merchant_name", "name"];
pub(crate) const AMOUNT_FIELDS: &[&str] = &["amount"];
pub(crate) const DATE_FIELDS: &[&str] = &["date", "posted_at"];
pub(crate) const CATEGORY_FIELDS: &[&str] = &["category"];

const REQUIRED_FIELDS: [(&str, &[&str]); 4] = [
    ("id", ID_FIELDS),
    ("merchant", MERCHANT_FIELDS),
    ("amount", AMOUNT_FIELDS),
    ("date", DATE_FIELDS),
];

/// One source record before validation. Every field is still untrusted text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTransaction {
    pub row: usize,
    pub id: Option<String>,
    pub merchant: Option<String>,
    pub amount: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
}

pub fn parse_source(content: &str) -> ClientResult<Vec<RawTransaction>> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if looks_like_ndjson(trimmed) {
        return Err(ClientError::invalid_input_format(
            "NDJSON is not supported. Provide a JSON array or CSV.",
            "ndjson",
        ));
    }

    if trimmed.starts_with('[') {
        return parse_json_array(trimmed);
    }

    if serde_json::from_str::<Value>(trimmed).is_ok() {
        return Err(ClientError::invalid_input_format(
            "JSON input must be a top-level array of transaction objects.",
            "json_non_array",
        ));
    }

    if looks_like_csv(trimmed) {
        return parse_csv(trimmed);
    }

    Err(ClientError::invalid_input_format(
        "Unsupported input format. Provide a JSON array or CSV with headers.",
        "unknown",
    ))
}

fn parse_json_array(content: &str) -> ClientResult<Vec<RawTransaction>> {
    let parsed = serde_json::from_str::<Value>(content).map_err(|_| {
        ClientError::invalid_input_format("Invalid JSON input. Provide a valid JSON array.", "json")
    })?;

    let Some(items) = parsed.as_array() else {
        return Err(ClientError::invalid_input_format(
            "JSON input must be a top-level array of transaction objects.",
            "json_non_array",
        ));
    };

    let mut rows = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let row = index + 1;
        // Non-object entries carry no fields and are dropped during validation.
        let Some(object) = item.as_object() else {
            rows.push(RawTransaction {
                row,
                ..RawTransaction::default()
            });
            continue;
        };

        rows.push(RawTransaction {
            row,
            id: first_json_value(object, ID_FIELDS),
            merchant: first_json_value(object, MERCHANT_FIELDS),
            amount: first_json_value(object, AMOUNT_FIELDS),
            date: first_json_value(object, DATE_FIELDS),
            category: first_json_value(object, CATEGORY_FIELDS),
        });
    }

    Ok(rows)
}

fn parse_csv(content: &str) -> ClientResult<Vec<RawTransaction>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| ClientError::invalid_input("CSV header row is missing or unreadable."))?
        .iter()
        .map(|value| value.trim().to_ascii_lowercase())
        .collect::<Vec<String>>();

    if !headers_are_valid(&headers) {
        return Err(ClientError::input_schema_mismatch(
            REQUIRED_FIELDS
                .iter()
                .map(|(name, _)| (*name).to_string())
                .collect(),
            accepted_headers(),
            headers,
        ));
    }

    let index_by_name = headers
        .iter()
        .enumerate()
        .map(|(index, name)| (name.to_string(), index))
        .collect::<HashMap<String, usize>>();

    let mut rows = Vec::new();
    for (row_index, result_row) in reader.records().enumerate() {
        let record = result_row
            .map_err(|_| ClientError::invalid_input("CSV rows are malformed or not UTF-8."))?;

        rows.push(RawTransaction {
            row: row_index + 1,
            id: first_csv_value(&record, &index_by_name, ID_FIELDS),
            merchant: first_csv_value(&record, &index_by_name, MERCHANT_FIELDS),
            amount: first_csv_value(&record, &index_by_name, AMOUNT_FIELDS),
            date: first_csv_value(&record, &index_by_name, DATE_FIELDS),
            category: first_csv_value(&record, &index_by_name, CATEGORY_FIELDS),
        });
    }

    Ok(rows)
}

fn first_json_value(object: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|alias| read_json_text(object.get(*alias)))
}

fn first_csv_value(
    record: &csv::StringRecord,
    index_by_name: &HashMap<String, usize>,
    aliases: &[&str],
) -> Option<String> {
    aliases.iter().find_map(|alias| {
        let index = index_by_name.get(*alias)?;
        let value = record.get(*index)?;
        non_blank(value)
    })
}

/// Strings and numbers pass through as text. Arrays (aggregator category
/// paths such as `["Service", "Subscription"]`) yield their first non-blank
/// string element.
fn read_json_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => non_blank(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(items) => items
            .iter()
            .find_map(|item| item.as_str().and_then(non_blank)),
        other => Some(other.to_string()),
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

fn looks_like_ndjson(content: &str) -> bool {
    let lines = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<&str>>();
    if lines.len() < 2 {
        return false;
    }

    lines.iter().all(|line| {
        let parsed = serde_json::from_str::<Value>(line.trim());
        if let Ok(value) = parsed {
            return value.is_object();
        }
        false
    })
}

fn looks_like_csv(content: &str) -> bool {
    let Some(first_line) = content.lines().find(|line| !line.trim().is_empty()) else {
        return false;
    };
    first_line.contains(',')
}

fn headers_are_valid(actual_headers: &[String]) -> bool {
    REQUIRED_FIELDS.iter().all(|(_, aliases)| {
        aliases
            .iter()
            .any(|alias| actual_headers.iter().any(|header| header == alias))
    })
}

fn accepted_headers() -> Vec<String> {
    [ID_FIELDS, MERCHANT_FIELDS, AMOUNT_FIELDS, DATE_FIELDS, CATEGORY_FIELDS]
        .iter()
        .flat_map(|aliases| aliases.iter().map(|alias| (*alias).to_string()))
        .collect()
}

use std::fs;
use std::io::{IsTerminal, Read};

use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SourceKind {
    File,
    Stdin,
    Bundled,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Stdin => "stdin",
            Self::Bundled => "bundled",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub source_kind: SourceKind,
    pub source_ref: Option<String>,
    pub content: String,
}

/// `-` (or no path) reads stdin; anything else is a file path. Passing a
/// file path while also piping stdin is rejected as ambiguous.
pub fn resolve_source(
    path: Option<String>,
    stdin_override: Option<String>,
) -> ClientResult<ResolvedSource> {
    let stdin_body = read_stdin(stdin_override)?;
    let has_stdin = stdin_body
        .as_ref()
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false);

    if let Some(path_value) = path
        && path_value != "-"
    {
        if has_stdin {
            return Err(ClientError::invalid_input(
                "Both stdin and a file path were provided. Pass exactly one source.",
            ));
        }

        let file_body = fs::read_to_string(&path_value).map_err(|error| {
            ClientError::input_read_failed(&format!("`{path_value}`"), &error.to_string())
        })?;

        return Ok(ResolvedSource {
            source_kind: SourceKind::File,
            source_ref: Some(path_value),
            content: file_body,
        });
    }

    if let Some(stdin_value) = stdin_body
        && !stdin_value.trim().is_empty()
    {
        return Ok(ResolvedSource {
            source_kind: SourceKind::Stdin,
            source_ref: None,
            content: stdin_value,
        });
    }

    Err(ClientError::invalid_input(
        "No transactions provided. Pass a file path or pipe input via stdin with `-`.",
    ))
}

pub fn bundled_source(name: &str, content: &str) -> ResolvedSource {
    ResolvedSource {
        source_kind: SourceKind::Bundled,
        source_ref: Some(name.to_string()),
        content: content.to_string(),
    }
}

fn read_stdin(stdin_override: Option<String>) -> ClientResult<Option<String>> {
    if let Some(value) = stdin_override {
        return Ok(Some(value));
    }

    if std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|error| ClientError::input_read_failed("stdin", &error.to_string()))?;

    if buffer.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(buffer))
}

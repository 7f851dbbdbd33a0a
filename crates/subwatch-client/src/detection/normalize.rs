/// Canonical grouping key for a merchant label: lower-cased, restricted to
/// ASCII letters, digits and whitespace, trimmed. Inner whitespace is kept
/// as-is. Returns an empty string when nothing meaningful remains.
pub fn merchant_key(label: &str) -> String {
    let mut output = String::with_capacity(label.len());
    for character in label.chars() {
        let lowered = character.to_ascii_lowercase();
        if lowered.is_ascii_lowercase() || lowered.is_ascii_digit() || lowered.is_whitespace() {
            output.push(lowered);
        }
    }
    output.trim().to_string()
}

pub fn normalize_optional(value: Option<String>) -> Option<String> {
    let raw = value?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

//! JSON object extraction from free-form model responses.
//!
//! Models are asked to answer with a single JSON object, but frequently wrap
//! it in prose or markdown fences. [`extract_json_object`] recovers the first
//! well-formed object:
//!
//! 1. ` ```json ` (or bare ` ``` `) fenced blocks whose content is an object
//! 2. The first balanced `{ ... }` substring that parses as an object
//!
//! Pure domain logic - no I/O.

use serde_json::Value;

/// Extract the first well-formed JSON object from `text`.
///
/// Returns `None` when the text contains no parsable object. Top-level
/// arrays and scalars are not accepted.
pub fn extract_json_object(text: &str) -> Option<Value> {
    if let Some(value) = from_fenced_blocks(text) {
        return Some(value);
    }

    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        if let Some(close) = matching_brace(bytes, open)
            && let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&text[open..=close])
        {
            return Some(value);
        }
        start = open + 1;
    }

    None
}

/// Try every fenced code block in order.
fn from_fenced_blocks(text: &str) -> Option<Value> {
    let mut in_block = false;
    let mut current = String::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            current.clear();
        } else if in_block && trimmed == "```" {
            in_block = false;
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(current.trim()) {
                return Some(value);
            }
        } else if in_block {
            current.push_str(line);
            current.push('\n');
        }
    }

    None
}

/// Find the index of the `}` closing the `{` at `open`, honouring strings
/// and escapes.
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

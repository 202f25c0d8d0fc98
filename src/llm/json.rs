//! JSON extraction from free-form LLM answers.
//!
//! Providers wrap JSON in markdown fences or chat around it; these helpers
//! dig the first valid object out.

use serde::de::DeserializeOwned;

/// Extract a JSON object from an LLM response.
///
/// Tries a ` ```json ` fence, then a bare fence whose content starts with
/// `{`, then the first parseable object in the text. Falls back to the
/// trimmed input.
pub fn extract_json(response: &str) -> String {
    let trimmed = response.trim();

    if let Some(inner) = fenced_block(trimmed, "```json") {
        return inner.to_string();
    }

    if let Some(inner) = fenced_block(trimmed, "```") {
        if inner.starts_with('{') {
            return inner.to_string();
        }
    }

    find_valid_json_object(trimmed).unwrap_or_else(|| trimmed.to_string())
}

/// Extract and deserialize in one go. The error carries the parse failure.
pub fn parse_json<T: DeserializeOwned>(response: &str) -> Result<T, String> {
    let json = extract_json(response);
    serde_json::from_str(&json).map_err(|e| e.to_string())
}

fn fenced_block<'a>(text: &'a str, opener: &str) -> Option<&'a str> {
    let start = text.find(opener)? + opener.len();
    let end = text[start..].find("```")?;
    Some(text[start..start + end].trim())
}

/// First `{` from which a JSON object parses, either directly (serde stops
/// at the end of the value) or after balanced-brace trimming.
fn find_valid_json_object(text: &str) -> Option<String> {
    text.match_indices('{').find_map(|(idx, _)| {
        let candidate = &text[idx..];

        let mut stream =
            serde_json::Deserializer::from_str(candidate).into_iter::<serde_json::Value>();
        if let Some(Ok(value)) = stream.next() {
            if value.is_object() {
                return serde_json::to_string(&value).ok();
            }
        }

        extract_balanced_braces(candidate)
            .filter(|json| serde_json::from_str::<serde_json::Value>(json).is_ok())
    })
}

/// Substring up to the brace closing the first `{`, ignoring braces inside
/// string literals.
fn extract_balanced_braces(text: &str) -> Option<String> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (idx, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(text[..=idx].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

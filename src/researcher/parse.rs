// SPDX-License-Identifier: MIT

//! Helpers for pulling structure out of free-form model text

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("text is empty")]
    Empty,

    #[error("JSON is not a list")]
    NotAList,

    #[error("invalid JSON: {0}")]
    Invalid(String),
}

/// Text split around a section marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sections {
    pub primary: String,
    pub secondary: Option<String>,
}

const EMPHASIS: &[char] = &['*', '#', '_', ' ', '\n', '\r', '\t'];

/// Split `text` at the first case-insensitive occurrence of `marker`
pub fn split_sections(text: &str, marker: &str) -> Sections {
    let Some(idx) = find_ignore_case(text, marker) else {
        return Sections {
            primary: text.trim().to_string(),
            secondary: None,
        };
    };

    let primary = text[..idx].trim_end_matches(EMPHASIS).trim().to_string();
    let secondary = text[idx + marker.len()..]
        .trim_start_matches(EMPHASIS)
        .trim()
        .to_string();

    Sections {
        primary,
        secondary: Some(secondary),
    }
}

// Byte offset of `needle` in `haystack`, ignoring ASCII case
fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    (0..=hay.len() - pat.len())
        .filter(|i| haystack.is_char_boundary(*i))
        .find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
}

/// Body of the first fenced code block, if any
pub fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    // skip the info string (e.g. `json`)
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// Parse a JSON list of `T` out of model text
///
/// Tries the first fenced block, then the whole text, then the span from the
/// first `[` to the last `]`.
pub fn extract_json_list<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let candidate = fenced_block(trimmed).unwrap_or(trimmed);
    let value = match serde_json::from_str::<Value>(candidate) {
        Ok(v) => v,
        Err(first) => match bracket_span(trimmed) {
            Some(span) => serde_json::from_str::<Value>(span)
                .map_err(|e| ParseError::Invalid(e.to_string()))?,
            None => return Err(ParseError::Invalid(first.to_string())),
        },
    };

    if !value.is_array() {
        return Err(ParseError::NotAList);
    }
    serde_json::from_value(value).map_err(|e| ParseError::Invalid(e.to_string()))
}

fn bracket_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        name: String,
    }

    #[test]
    fn test_split_at_marker() {
        let text = "Topic findings here.\n\n**General Company Information:** Founded 1999.";
        let sections = split_sections(text, "General Company Information:");
        assert_eq!(sections.primary, "Topic findings here.");
        assert_eq!(sections.secondary.as_deref(), Some("Founded 1999."));
    }

    #[test]
    fn test_split_is_case_insensitive() {
        let text = "A\n## general company information:\nB";
        let sections = split_sections(text, "General Company Information:");
        assert_eq!(sections.primary, "A");
        assert_eq!(sections.secondary.as_deref(), Some("B"));
    }

    #[test]
    fn test_split_without_marker() {
        let sections = split_sections("  just one section \n", "General Company Information:");
        assert_eq!(sections.primary, "just one section");
        assert!(sections.secondary.is_none());
    }

    #[test]
    fn test_split_with_multibyte_text() {
        let sections = split_sections("Café — überblick. Marker: rest", "marker:");
        assert_eq!(sections.primary, "Café — überblick.");
        assert_eq!(sections.secondary.as_deref(), Some("rest"));
    }

    #[test]
    fn test_extract_fenced_json() {
        let text = "Here you go:\n```json\n[{\"name\": \"Ada\"}]\n```\nThanks";
        let items: Vec<Item> = extract_json_list(text).unwrap();
        assert_eq!(items, vec![Item { name: "Ada".into() }]);
    }

    #[test]
    fn test_extract_plain_fence() {
        let text = "```\n[{\"name\": \"Grace\"}]\n```";
        let items: Vec<Item> = extract_json_list(text).unwrap();
        assert_eq!(items[0].name, "Grace");
    }

    #[test]
    fn test_extract_bare_json() {
        let items: Vec<Item> = extract_json_list("[{\"name\": \"Linus\"}]").unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_extract_embedded_brackets() {
        let text = "Leads found: [{\"name\": \"Barbara\"}] (2 sources)";
        let items: Vec<Item> = extract_json_list(text).unwrap();
        assert_eq!(items[0].name, "Barbara");
    }

    #[test]
    fn test_extract_empty_list() {
        let items: Vec<Item> = extract_json_list("[]").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_extract_errors() {
        assert_eq!(extract_json_list::<Item>("  "), Err(ParseError::Empty));
        assert_eq!(
            extract_json_list::<Item>("{\"name\": \"x\"}"),
            Err(ParseError::NotAList)
        );
        assert!(matches!(
            extract_json_list::<Item>("no json here"),
            Err(ParseError::Invalid(_))
        ));
        assert!(matches!(
            extract_json_list::<Item>("[{\"title\": 1}]"),
            Err(ParseError::Invalid(_))
        ));
    }
}

// src/utils/text.rs

//! Text cleanup helpers for extracted page content.

/// Collapse runs of whitespace (including newlines) into single spaces
/// and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clean extracted text, returning `None` when nothing usable remains.
pub fn non_empty(s: &str) -> Option<String> {
    let cleaned = collapse_whitespace(s);
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  hello  world "), Some("hello world".to_string()));
        assert_eq!(non_empty(" \n\t "), None);
    }
}

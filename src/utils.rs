//! Utility functions for string manipulation and JSON error classification.

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary)
/// with an ellipsis and a count of the dropped bytes appended.
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// A scraper killed mid-write leaves a batch that ends early; this tells
/// that case apart from a batch that is simply malformed.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// Capitalize the first character of a string.
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte_boundary() {
        // 'é' is two bytes; a cut at byte 3 would split it
        let result = truncate_for_log("aaéé", 3);
        assert_eq!(result, "aa…(+4 bytes)");
    }

    #[test]
    fn test_upcase() {
        assert_eq!(upcase("politics"), "Politics");
        assert_eq!(upcase(""), "");
        assert_eq!(upcase("N/A"), "N/A");
    }

    #[test]
    fn test_looks_truncated() {
        let eof = serde_json::from_str::<serde_json::Value>(r#"[{"title": "x""#).unwrap_err();
        assert!(looks_truncated(&eof));
        let syntax = serde_json::from_str::<serde_json::Value>("[1,,]").unwrap_err();
        assert!(!looks_truncated(&syntax));
    }
}

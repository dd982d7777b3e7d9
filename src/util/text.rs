//! Small text helpers shared by tools and the CLI.

/// Truncate to `max_chars` characters, appending `...` when cut.
pub fn ellipsize(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// Collapse runs of whitespace into single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipsize_counts_chars_not_bytes() {
        assert_eq!(ellipsize("广州天气", 2), "广州...");
        assert_eq!(ellipsize("short", 10), "short");
    }

    #[test]
    fn collapse_whitespace_joins_words() {
        assert_eq!(collapse_whitespace("  a \n\t b   c "), "a b c");
    }
}

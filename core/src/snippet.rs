//! Result previews cut around the first query-term occurrence.

pub const DEFAULT_SNIPPET_LEN: usize = 200;
/// Characters of leading context kept before the first match.
pub const SNIPPET_LEAD: usize = 50;
pub const ELLIPSIS: &str = "...";

/// Build a preview of `content` of at most `max_len` characters (plus ellipsis markers).
///
/// The window starts [`SNIPPET_LEAD`] characters before the earliest case-insensitive substring
/// occurrence of any term. With no occurrence the window is anchored at the end of the content,
/// yielding its tail. Offsets count characters, not bytes.
pub fn snippet<S: AsRef<str>>(content: &str, terms: &[S], max_len: usize) -> String {
    let lowered: Vec<char> = content.chars().map(|c| c.to_ascii_lowercase()).collect();
    let len = lowered.len();

    let best = terms
        .iter()
        .filter_map(|t| find_chars(&lowered, t.as_ref()))
        .min()
        .unwrap_or(len);

    let start = best.saturating_sub(SNIPPET_LEAD);
    let end = (start + max_len).min(len);

    let mut out = String::new();
    if start > 0 {
        out.push_str(ELLIPSIS);
    }
    out.extend(content.chars().skip(start).take(end - start));
    if end < len {
        out.push_str(ELLIPSIS);
    }
    out
}

fn find_chars(haystack: &[char], needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().map(|c| c.to_ascii_lowercase()).collect();
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_at_start_has_only_trailing_ellipsis() {
        assert_eq!(snippet("abcdefghij", &["abc"], 5), "abcde...");
    }

    #[test]
    fn short_content_is_returned_whole() {
        assert_eq!(snippet("Rust is fast", &["fast"], 200), "Rust is fast");
    }

    #[test]
    fn late_match_gets_leading_ellipsis() {
        let content = format!("{}needle{}", "x".repeat(100), "y".repeat(300));
        let s = snippet(&content, &["NEEDLE"], 200);
        assert!(s.starts_with("..."));
        assert!(s.ends_with("..."));
        let body = &s[3..s.len() - 3];
        assert_eq!(body.chars().count(), 200);
        assert!(body.starts_with(&"x".repeat(50)));
        assert_eq!(&body[50..56], "needle");
    }

    #[test]
    fn earliest_term_wins() {
        let content = format!("{}beta{}alpha", "-".repeat(60), "-".repeat(10));
        let s = snippet(&content, &["alpha", "beta"], 20);
        assert_eq!(s, format!("...{}...", &content[10..30]));
    }

    #[test]
    fn no_match_yields_tail() {
        let content = "z".repeat(120);
        let s = snippet(&content, &["absent"], 200);
        assert_eq!(s, format!("...{}", "z".repeat(50)));
    }

    #[test]
    fn substring_match_is_not_token_aware() {
        assert_eq!(snippet("JavaScript", &["script"], 200), "JavaScript");
    }

    #[test]
    fn multibyte_content_does_not_split_chars() {
        let content = format!("{}café rust", "é".repeat(80));
        let s = snippet(&content, &["rust"], 10);
        assert!(s.starts_with("..."));
        assert!(s.ends_with("..."));
    }
}

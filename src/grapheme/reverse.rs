//! Cluster-order reversal
//!
//! Segmentation runs once, forward, recording cluster spans; assembly then
//! walks the spans back to front. Both passes are linear in the input.
//!
//! Reversal is deterministic but not an involution. Segmenting the output
//! can group code points differently than the input did, e.g. a trailing
//! Prepend character ends up in front of its old predecessor and absorbs it,
//! and an odd run of regional indicators re-pairs from the other end.

use super::segment::{cluster_spans, decode_text};

/// Reverse the grapheme clusters of `text`.
///
/// ```
/// use text_mirror_core::grapheme::reverse;
///
/// assert_eq!(reverse("Hello, World!"), "!dlroW ,olleH");
/// assert_eq!(reverse("e\u{0301}a\u{0300}"), "a\u{0300}e\u{0301}");
/// ```
pub fn reverse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    reverse_into(text, &mut out);
    out
}

/// Append the cluster-reversed `text` to `out`.
pub fn reverse_into(text: &str, out: &mut String) {
    let spans: Vec<_> = cluster_spans(text).collect();

    out.reserve(text.len());
    for span in spans.into_iter().rev() {
        out.push_str(&text[span]);
    }
}

/// Reverse bytes claimed to be UTF-8, replacing invalid sequences with U+FFFD first.
pub fn reverse_bytes(bytes: &[u8]) -> String {
    reverse(&decode_text(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(reverse(""), "");
    }

    #[test]
    fn test_ascii() {
        assert_eq!(reverse("Hello, World!"), "!dlroW ,olleH");
        assert_eq!(reverse("racecar"), "racecar");
    }

    #[test]
    fn test_single_cluster_is_fixed_point() {
        for text in ["A", "e\u{0301}", "👩‍👩‍👦", "🇯🇵", "\r\n", "\u{1100}\u{1161}\u{11A8}"] {
            assert_eq!(reverse(text), text);
        }
    }

    #[test]
    fn test_combining_marks_travel_with_base() {
        assert_eq!(reverse("e\u{0301}a\u{0300}"), "a\u{0300}e\u{0301}");
    }

    #[test]
    fn test_flags_swap_as_units() {
        assert_eq!(reverse("🇯🇵🇺🇸"), "🇺🇸🇯🇵");
    }

    #[test]
    fn test_zwj_sequence_stays_whole() {
        assert_eq!(reverse("a👩‍💻b"), "b👩‍💻a");
    }

    #[test]
    fn test_reverse_into_appends() {
        let mut out = String::from(">");
        reverse_into("abc", &mut out);
        assert_eq!(out, ">cba");
    }

    #[test]
    fn test_reverse_bytes_replaces_invalid_sequences() {
        assert_eq!(reverse_bytes(b"ab\xFFc"), "c\u{FFFD}ba");
        assert_eq!(reverse_bytes(b""), "");
    }

    #[test]
    fn test_double_reverse_is_not_always_identity() {
        let prepend = "a\u{0600}";
        assert_eq!(reverse(prepend), "\u{0600}a");
        assert_eq!(reverse(&reverse(prepend)), "\u{0600}a");

        let odd_flags = "🇯🇵🇺";
        assert_eq!(reverse(odd_flags), "🇺🇯🇵");
        assert_eq!(reverse(&reverse(odd_flags)), "🇵🇺🇯");

        let lf_cr = "\n\r";
        assert_eq!(reverse(lf_cr), "\r\n");
        assert_eq!(reverse(&reverse(lf_cr)), "\r\n");
    }
}

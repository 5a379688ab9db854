//! Extended grapheme cluster segmentation
//!
//! Boundary decisions follow the default UAX #29 rules (GB1–GB999) with the
//! extended variant enabled: Extend and SpacingMark attach to the preceding
//! character, Prepend attaches to the following one, CR LF stays together,
//! Hangul syllable sequences stay together, and emoji modifier, ZWJ, tag and
//! regional-indicator sequences form single clusters.
//!
//! Property lookup (Grapheme_Cluster_Break, Extended_Pictographic,
//! Indic_Conjunct_Break) is done against the Unicode Character Database
//! tables shipped with `unicode-segmentation`.

use std::borrow::Cow;
use std::ops::Range;
use unicode_segmentation::{Graphemes, UnicodeSegmentation};

/// Lazy iterator over the grapheme clusters of a text.
///
/// A clone continues from the same position; call [`clusters`] again to
/// start over from the beginning.
#[derive(Debug, Clone)]
pub struct GraphemeClusters<'a> {
    inner: Graphemes<'a>,
}

impl<'a> Iterator for GraphemeClusters<'a> {
    type Item = &'a str;

    #[inline]
    fn next(&mut self) -> Option<&'a str> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Split `text` into extended grapheme clusters.
///
/// Concatenating the yielded slices reproduces `text` exactly. No slice is
/// empty, and empty input yields nothing.
pub fn clusters(text: &str) -> GraphemeClusters<'_> {
    GraphemeClusters {
        inner: text.graphemes(true),
    }
}

/// Byte ranges of each grapheme cluster, in order.
pub fn cluster_spans(text: &str) -> impl Iterator<Item = Range<usize>> + '_ {
    text.grapheme_indices(true)
        .map(|(start, cluster)| start..start + cluster.len())
}

/// Number of user-perceived characters in `text`.
pub fn cluster_count(text: &str) -> usize {
    clusters(text).count()
}

/// Decode bytes claimed to be UTF-8.
///
/// Each maximal invalid subsequence becomes one U+FFFD, which then segments
/// as an ordinary single-code-point cluster. Valid input is borrowed as is.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

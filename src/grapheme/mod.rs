//! Grapheme-cluster-safe text reversal
//!
//! Text is split into extended grapheme clusters (UAX #29, including the
//! emoji sequence rules of UAX #51) and the clusters are emitted in reverse
//! order, each one byte-for-byte unchanged.
//!
//! The engine is pure and total: no logging, no shared state, no errors.

pub mod reverse;
pub mod segment;

pub use reverse::{reverse, reverse_bytes, reverse_into};
pub use segment::{cluster_count, cluster_spans, clusters, decode_text, GraphemeClusters};

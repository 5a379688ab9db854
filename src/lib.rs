//! text-mirror - grapheme-aware text mirroring over MCP
//!
//! A minimal Model Context Protocol service exposing one tool, `mirror`,
//! which reverses UTF-8 text by extended grapheme cluster rather than by
//! code point or byte, so combining marks, emoji sequences and flags survive.
//!
//! # Architecture
//!
//! - **Grapheme**: segmentation and the reversal engine (pure, total)
//! - **MCP**: JSON-RPC 2.0 over stdio, the `mirror` tool, server bootstrap
//! - **Config / Logging / Version**: environment knobs, diagnostic sink,
//!   version string
//!
//! # Example
//!
//! ```
//! use text_mirror_core::grapheme;
//!
//! assert_eq!(grapheme::reverse("🇯🇵🇺🇸"), "🇺🇸🇯🇵");
//! ```

pub mod config;
pub mod error;
pub mod grapheme;
pub mod logging;
pub mod mcp;
pub mod version;

// Re-export commonly used types
pub use crate::config::MirrorConfig;
pub use error::{MirrorError, Result};
pub use grapheme::{reverse, reverse_bytes};
pub use mcp::{McpServer, ServerRunner, StdioRunner, ToolHandler};
pub use version::{service_version, BuildInfo, BuildInfoSource, CompiledBuildInfo};

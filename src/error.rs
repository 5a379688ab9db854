//! Error types for the text-mirror service
//!
//! The grapheme engine itself never fails; everything here belongs to the
//! boundary (transport, configuration, tool dispatch). Structured errors use
//! thiserror, with anyhow accepted at the edges.

use thiserror::Error;

/// Main error type for text-mirror operations
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Tool arguments did not match the input schema
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Tool name is not registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The caller cancelled before the tool ran
    #[error("request canceled")]
    Cancelled,

    /// The MCP server stopped with an error
    #[error("MCP server failed to run: {0}")]
    ServerRun(#[source] Box<MirrorError>),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl MirrorError {
    /// Wrap an error as a server run failure
    pub fn server_run(err: MirrorError) -> Self {
        MirrorError::ServerRun(Box::new(err))
    }

    /// Whether this error, or any error it wraps, is a cancellation
    pub fn is_cancelled(&self) -> bool {
        match self {
            MirrorError::Cancelled => true,
            MirrorError::ServerRun(inner) => inner.is_cancelled(),
            _ => false,
        }
    }
}

/// Result type alias for text-mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Convert anyhow::Error to MirrorError
impl From<anyhow::Error> for MirrorError {
    fn from(err: anyhow::Error) -> Self {
        MirrorError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = MirrorError::UnknownTool("reverse".to_string());
        assert_eq!(err.to_string(), "Unknown tool: reverse");

        assert_eq!(MirrorError::Cancelled.to_string(), "request canceled");
    }

    #[test]
    fn test_server_run_wraps_source() {
        let err = MirrorError::server_run(MirrorError::Cancelled);

        assert_eq!(err.to_string(), "MCP server failed to run: request canceled");
        assert!(err.is_cancelled());

        let source = err.source().expect("wrapped error should be the source");
        assert_eq!(source.to_string(), "request canceled");
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: MirrorError = json_err.into();
        assert!(matches!(err, MirrorError::Serialization(_)));
        assert!(!err.is_cancelled());

        let err: MirrorError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, MirrorError::Other(ref msg) if msg == "boom"));
    }
}

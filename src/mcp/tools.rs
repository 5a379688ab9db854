//! MCP tool implementations
//!
//! A single tool is registered: `mirror`, which reverses UTF-8 text while
//! keeping grapheme clusters intact.

use crate::error::{MirrorError, Result};
use crate::grapheme;
use crate::logging::TRANSCRIPT_TARGET;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Name of the mirror tool
pub const MIRROR_TOOL: &str = "mirror";

/// Human-readable title of the mirror tool
pub const MIRROR_TITLE: &str = "Mirror text";

/// Description of the mirror tool
pub const MIRROR_DESCRIPTION: &str = "Reverses the given UTF-8 text";

/// Tool schema definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Tool name (e.g., "mirror")
    pub name: String,

    /// Display title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: Value,

    /// JSON Schema for structured output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
}

/// Input of the mirror tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorInput {
    /// UTF-8 text to be mirrored
    pub text: String,
}

/// Output of the mirror tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorOutput {
    /// Mirrored text
    pub text: String,
}

/// Tool handler that dispatches to the mirror implementation
#[derive(Debug, Clone, Default)]
pub struct ToolHandler {
    transcript: bool,
}

impl ToolHandler {
    /// Create a new tool handler.
    ///
    /// With `transcript` on, every call logs its original and mirrored text.
    pub fn new(transcript: bool) -> Self {
        Self { transcript }
    }

    /// Get list of all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        vec![Tool {
            name: MIRROR_TOOL.to_string(),
            title: Some(MIRROR_TITLE.to_string()),
            description: MIRROR_DESCRIPTION.to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "UTF-8 text to be mirrored"
                    }
                },
                "required": ["text"],
                "additionalProperties": false
            }),
            output_schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "Mirrored text"
                    }
                },
                "required": ["text"],
                "additionalProperties": false
            })),
        }]
    }

    /// Execute a tool call and build the MCP `CallToolResult`
    pub async fn execute(
        &self,
        tool_name: &str,
        params: Value,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        debug!("Executing tool: {}", tool_name);

        match tool_name {
            MIRROR_TOOL => {
                let input: MirrorInput = serde_json::from_value(params).map_err(|e| {
                    MirrorError::InvalidParams(format!(
                        "invalid arguments for '{}': {}",
                        MIRROR_TOOL, e
                    ))
                })?;

                // Large inputs would otherwise stall a runtime worker. The
                // blocking thread gets the caller's dispatcher for the transcript.
                let handler = self.clone();
                let cancel = cancel.clone();
                let dispatch = tracing::dispatcher::get_default(|current| current.clone());
                let output = tokio::task::spawn_blocking(move || {
                    tracing::dispatcher::with_default(&dispatch, || handler.mirror(&input, &cancel))
                })
                .await
                .map_err(|e| MirrorError::Other(format!("Mirror task failed: {}", e)))??;

                call_result(&output)
            }
            _ => {
                warn!("Unknown tool: {}", tool_name);
                Err(MirrorError::UnknownTool(tool_name.to_string()))
            }
        }
    }

    /// Mirror `input` on the calling thread.
    ///
    /// Returns [`MirrorError::Cancelled`] without touching the text if
    /// `cancel` has already fired.
    pub fn mirror(&self, input: &MirrorInput, cancel: &CancellationToken) -> Result<MirrorOutput> {
        if cancel.is_cancelled() {
            return Err(MirrorError::Cancelled);
        }

        let output = MirrorOutput {
            text: grapheme::reverse(&input.text),
        };
        self.record(input, &output);
        Ok(output)
    }

    fn record(&self, input: &MirrorInput, output: &MirrorOutput) {
        if self.transcript {
            info!(
                target: TRANSCRIPT_TARGET,
                "original text: {} => mirrored text: {}", input.text, output.text
            );
        }
    }
}

/// Wrap a mirror result as text content plus structured content
fn call_result(output: &MirrorOutput) -> Result<Value> {
    Ok(serde_json::json!({
        "content": [
            {
                "type": "text",
                "text": serde_json::to_string(output)?
            }
        ],
        "structuredContent": output,
        "isError": false
    }))
}

//! Model Context Protocol (MCP) server implementation
//!
//! Provides a JSON-RPC 2.0 server over stdio for editor and agent clients.
//! Exposes a single tool, `mirror`.

pub mod protocol;
pub mod runner;
pub mod server;
pub mod tools;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use runner::{new_server, run, ServerRunner, StdioRunner};
pub use server::{McpServer, ServerInfo};
pub use tools::{MirrorInput, MirrorOutput, ToolHandler};

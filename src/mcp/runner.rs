//! Server bootstrap
//!
//! Wires configuration and build metadata into an [`McpServer`] and hands it
//! to a [`ServerRunner`]. The runner is a trait so the transport can be
//! swapped out in tests.

use super::server::{McpServer, ServerInfo};
use super::tools::ToolHandler;
use crate::config::MirrorConfig;
use crate::error::{MirrorError, Result};
use crate::version::{service_version, BuildInfoSource};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Something that runs a server until it stops or `shutdown` fires
#[async_trait]
pub trait ServerRunner: Send + Sync {
    async fn run(&self, server: &McpServer, shutdown: CancellationToken) -> Result<()>;
}

/// Runs the server over stdin/stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct StdioRunner;

#[async_trait]
impl ServerRunner for StdioRunner {
    async fn run(&self, server: &McpServer, shutdown: CancellationToken) -> Result<()> {
        if shutdown.is_cancelled() {
            return Err(MirrorError::Cancelled);
        }

        server.run(shutdown).await
    }
}

/// Construct the MCP server with the mirror tool registered
pub fn new_server(config: &MirrorConfig, build: &dyn BuildInfoSource) -> McpServer {
    let version = service_version(build);
    debug!("Creating MCP server, version {}", version);

    McpServer::new(
        ToolHandler::new(config.is_debug_mode()),
        ServerInfo::new(version),
    )
}

/// Build the server and run it with `runner`
pub async fn run(
    runner: &dyn ServerRunner,
    config: &MirrorConfig,
    build: &dyn BuildInfoSource,
    shutdown: CancellationToken,
) -> Result<()> {
    let server = new_server(config, build);

    runner
        .run(&server, shutdown)
        .await
        .map_err(MirrorError::server_run)
}

//! text-mirror - MCP server that mirrors UTF-8 text by grapheme cluster
//!
//! This is the main entry point: it reads configuration, installs the log
//! sink, and either serves MCP over stdio or runs a one-off command.

use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::PathBuf;
use text_mirror_core::{
    error::Result, grapheme, logging, mcp, service_version, CompiledBuildInfo, MirrorConfig,
    StdioRunner,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, Level};

#[derive(Parser)]
#[command(name = "text-mirror")]
#[command(about = "Reverses UTF-8 text by grapheme cluster, as an MCP tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Debug log file (overrides MCP_TEXT_MIRROR_DEBUG_LOG); enables the transcript
    #[arg(long)]
    debug_log: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server (stdio mode, the default)
    Serve,

    /// Mirror TEXT, or stdin when TEXT is omitted
    Reverse {
        /// Text to mirror
        text: Option<String>,
    },

    /// Print the service version string
    Version,
}

/// Start MCP server in stdio mode
async fn start_mcp_server(config: &MirrorConfig) -> Result<()> {
    debug!("Starting MCP server...");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal, stopping MCP server gracefully...");
            signal_token.cancel();
        }
    });

    mcp::run(&StdioRunner, config, &CompiledBuildInfo, shutdown).await?;

    info!("MCP server shut down complete");
    Ok(())
}

/// Mirror a single text and print it
fn reverse_command(text: Option<String>) -> Result<()> {
    let mirrored = match text {
        Some(text) => grapheme::reverse(&text),
        None => {
            let mut bytes = Vec::new();
            std::io::stdin().read_to_end(&mut bytes)?;
            grapheme::reverse_bytes(&bytes)
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(mirrored.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut config = MirrorConfig::from_env()?;
    if let Some(path) = cli.debug_log {
        config = config.with_debug_log(path);
    }

    let sink = logging::init(&config, level)?;
    debug!(
        "text-mirror {} starting (log sink: {:?})",
        service_version(&CompiledBuildInfo),
        sink
    );

    match cli.command {
        None | Some(Commands::Serve) => start_mcp_server(&config).await,
        Some(Commands::Reverse { text }) => reverse_command(text),
        Some(Commands::Version) => {
            println!("{}", service_version(&CompiledBuildInfo));
            Ok(())
        }
    }
}

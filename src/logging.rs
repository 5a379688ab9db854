//! Diagnostic sink setup
//!
//! Builds a tracing dispatcher from a [`MirrorConfig`] instead of touching a
//! global logger. `main` installs the result once; tests install it scoped.
//!
//! stdout carries protocol traffic, so logs go to stderr, or in debug mode
//! to the configured log file.

use crate::config::MirrorConfig;
use crate::error::Result;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{warn, Dispatch, Level};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// Target used for the original/mirrored text transcript
pub const TRANSCRIPT_TARGET: &str = "text_mirror_core::transcript";

/// Permissions for a newly created log file
#[cfg(unix)]
const LOG_PERM: u32 = 0o644;

/// Where log lines end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    File(PathBuf),
}

/// A ready-to-install dispatcher plus what it writes to
pub struct Logging {
    pub dispatch: Dispatch,
    pub sink: LogSink,
    /// Why the log file could not be used, if debug mode fell back to stderr
    pub open_error: Option<io::Error>,
}

/// Open (or create) the log file for appending
pub fn open_log_file(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.append(true).create(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(LOG_PERM);
    }

    options.open(path)
}

/// Default filter directives for our two crates at `level`
pub fn filter_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    format!("text_mirror={level},text_mirror_core={level}")
}

/// `RUST_LOG` when set, else [`filter_directives`]; the transcript target is
/// always switched on in debug mode.
pub fn env_filter(level: Level, transcript: bool) -> EnvFilter {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));

    if !transcript {
        return filter;
    }
    match format!("{TRANSCRIPT_TARGET}=info").parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Build the dispatcher described by `config`.
///
/// If debug mode is on but the log file cannot be opened, logging silently
/// falls back to stderr and the failure is reported in `open_error`.
pub fn build(config: &MirrorConfig, level: Level) -> Logging {
    let mut open_error = None;

    let (writer, sink) = if config.is_debug_mode() {
        let path = config.log_path();
        match open_log_file(&path) {
            Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), LogSink::File(path)),
            Err(e) => {
                open_error = Some(e);
                (BoxMakeWriter::new(io::stderr), LogSink::Stderr)
            }
        }
    } else {
        (BoxMakeWriter::new(io::stderr), LogSink::Stderr)
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level, config.is_debug_mode()))
        .with_target(false)
        .with_ansi(sink == LogSink::Stderr)
        .with_writer(writer)
        .finish();

    Logging {
        dispatch: Dispatch::new(subscriber),
        sink,
        open_error,
    }
}

/// Build and install the process-wide dispatcher
pub fn init(config: &MirrorConfig, level: Level) -> Result<LogSink> {
    let logging = build(config, level);

    tracing::dispatcher::set_global_default(logging.dispatch)
        .map_err(|e| anyhow::anyhow!("Failed to install log dispatcher: {}", e))?;

    if let Some(e) = logging.open_error {
        warn!(
            "Cannot open log file {}, logging to stderr: {}",
            config.log_path().display(),
            e
        );
    }

    Ok(logging.sink)
}

//! Environment-driven configuration for text-mirror
//!
//! Only one knob exists: `MCP_TEXT_MIRROR_DEBUG_LOG`. A non-empty value turns
//! on debug mode, which sends logs (and the mirror transcript) to that file.

use crate::error::Result;
use config::{Config, Environment};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Prefix shared by all environment variables
pub const ENV_PREFIX: &str = "MCP_TEXT_MIRROR";

/// Full name of the debug log variable
pub const ENV_DEBUG_LOG: &str = "MCP_TEXT_MIRROR_DEBUG_LOG";

/// Log to a file even when the environment does not ask for it
pub const FILE_LOG_DEFAULT: bool = false;

/// Default log file name
pub const LOG_NAME: &str = "text-mirror.log";

/// Default log directory
pub const LOG_DIR: &str = ".";

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(default)]
    debug_log: Option<String>,
}

/// Resolved service configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorConfig {
    debug_log: Option<PathBuf>,
}

impl MirrorConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    /// Load configuration from an explicit variable map instead of the environment
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn load(source: Environment) -> Result<Self> {
        let raw: RawSettings = Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;

        let debug_log = raw
            .debug_log
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        debug!("Loaded configuration (debug_log: {:?})", debug_log);
        Ok(Self { debug_log })
    }

    /// Override the debug log path (e.g. from the command line)
    pub fn with_debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.debug_log = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        };
        self
    }

    /// Whether file logging and the mirror transcript are enabled
    pub fn is_debug_mode(&self) -> bool {
        self.debug_log.is_some() || FILE_LOG_DEFAULT
    }

    /// Path of the debug log file, cleaned
    pub fn log_path(&self) -> PathBuf {
        match &self.debug_log {
            Some(path) => clean_path(path),
            None => clean_path(&Path::new(LOG_DIR).join(LOG_NAME)),
        }
    }
}

/// Lexically clean a path: drop `.` components and fold `name/..` pairs.
fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

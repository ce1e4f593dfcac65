//! Configuration for ttywm.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.ttywm/config.toml`
//! - The built-in background patterns
//! - Validation that keeps every value usable
//!
//! # Configuration File
//!
//! ```toml
//! # Shell started in every new window (default: $SHELL or /bin/bash)
//! shell = "/bin/zsh"
//!
//! # Cursor glyph
//! cursor_glyph = "+"
//!
//! # Initial background pattern index
//! background = 1
//!
//! [window]
//! lines = 16
//! cols = 65
//!
//! [rename]
//! width = 25
//! prompt = "> "
//!
//! [drain]
//! queue_capacity = 1024
//! budget_per_frame = 4096
//! ```
//!
//! `backgrounds` replaces the built-in patterns with a list of patterns,
//! each a list of rows:
//!
//! ```toml
//! backgrounds = [["-=-"], ["o ", " o"]]
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::wm::MIN_SIZE;

/// Shell used when neither the config nor `$SHELL` names one
pub const FALLBACK_SHELL: &str = "/bin/bash";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shell command for new windows
    pub shell: Option<String>,
    /// Glyph drawn at the cursor
    pub cursor_glyph: char,
    /// Initial background pattern index
    pub background: usize,
    /// Background patterns; empty means the built-ins
    pub backgrounds: Vec<Vec<String>>,
    pub window: WindowConfig,
    pub rename: RenameConfig,
    pub drain: DrainConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shell: None,
            cursor_glyph: '🠭',
            background: 0,
            backgrounds: Vec::new(),
            window: WindowConfig::default(),
            rename: RenameConfig::default(),
            drain: DrainConfig::default(),
        }
    }
}

/// Size of newly spawned windows, border included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub lines: u16,
    pub cols: u16,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { lines: 16, cols: 65 }
    }
}

/// Rename field settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameConfig {
    /// Visible width of the value, excluding the prompt
    pub width: usize,
    pub prompt: String,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            width: 25,
            prompt: "> ".to_string(),
        }
    }
}

/// Output drain settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrainConfig {
    /// Bound of each session's output queue, in messages
    pub queue_capacity: usize,
    /// Messages applied per frame across all sessions
    pub budget_per_frame: usize,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            budget_per_frame: 4096,
        }
    }
}

impl Config {
    /// Load configuration from the default path, falling back to defaults.
    pub fn load() -> Self {
        match Self::get_config_path() {
            Some(path) if path.exists() => Self::load_or_default(&path),
            _ => Self::default().validate(),
        }
    }

    /// Load `path`, logging and falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Using default configuration: {}", e);
                Self::default().validate()
            }
        }
    }

    /// Load and validate configuration from `path`
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.validate())
    }

    /// Clamp every value into its usable range
    pub fn validate(mut self) -> Self {
        self.window.lines = self.window.lines.max(MIN_SIZE);
        self.window.cols = self.window.cols.max(MIN_SIZE);
        self.drain.queue_capacity = self.drain.queue_capacity.max(1);
        self.drain.budget_per_frame = self.drain.budget_per_frame.max(1);

        self.backgrounds = std::mem::take(&mut self.backgrounds)
            .into_iter()
            .map(|rows| rows.into_iter().filter(|r| !r.is_empty()).collect::<Vec<_>>())
            .filter(|rows| !rows.is_empty())
            .collect();
        if self.backgrounds.is_empty() {
            self.backgrounds = builtin_backgrounds();
        }
        if self.background >= self.backgrounds.len() {
            self.background = 0;
        }
        self
    }

    /// Shell for new windows: config, then `$SHELL`, then `/bin/bash`
    pub fn shell_command(&self) -> String {
        self.shell
            .clone()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| std::env::var("SHELL").ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| FALLBACK_SHELL.to_string())
    }

    /// `~/.ttywm/config.toml`
    pub fn get_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".ttywm").join("config.toml"))
    }
}

/// Zig-zag, brick and ring patterns
pub fn builtin_backgrounds() -> Vec<Vec<String>> {
    let patterns: [&[&str]; 3] = [
        &["/|/ \\|\\ "],
        &["_|__", "___|"],
        &[
            " / __ \\ \\__/",
            "/ /  \\ \\____",
            "\\ \\__/ / __ ",
            " \\____/ /  \\",
        ],
    ];
    patterns
        .iter()
        .map(|rows| rows.iter().map(|r| r.to_string()).collect())
        .collect()
}

/// Directory holding the config and log files
pub fn data_dir() -> PathBuf {
    home_dir()
        .map(|h| h.join(".ttywm"))
        .unwrap_or_else(|| PathBuf::from("."))
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

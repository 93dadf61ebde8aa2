//! Visual configuration loaded from TOML
//!
//! ```toml
//! [experimental]
//! enabled = true
//!
//! [sandbox]
//! mode = "auto"
//! ```
//!
//! Every section and key is optional.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How the visual decides whether to sandbox itself by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SandboxMode {
    /// Sandbox unless the host already runs the visual inside a frame
    #[default]
    Auto,
    Always,
    Never,
}

impl SandboxMode {
    /// Resolve the default sandbox state for the hosting environment.
    pub fn resolve(&self, in_frame: bool) -> bool {
        match self {
            SandboxMode::Auto => !in_frame,
            SandboxMode::Always => true,
            SandboxMode::Never => false,
        }
    }
}

impl FromStr for SandboxMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(SandboxMode::Auto),
            "always" | "on" => Ok(SandboxMode::Always),
            "never" | "off" => Ok(SandboxMode::Never),
            _ => Err(Error::InvalidSandboxMode {
                mode: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SandboxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SandboxMode::Auto => write!(f, "auto"),
            SandboxMode::Always => write!(f, "always"),
            SandboxMode::Never => write!(f, "never"),
        }
    }
}

/// Experimental features
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExperimentalConfig {
    /// Declare and enumerate the `experimental` settings object
    #[serde(default)]
    pub enabled: bool,
}

/// Sandbox configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SandboxConfig {
    #[serde(default)]
    pub mode: SandboxMode,
}

/// Top-level visual configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualConfig {
    #[serde(default)]
    pub experimental: ExperimentalConfig,
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

impl VisualConfig {
    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: VisualConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if the file does not exist, or a
    /// parse error if it is not valid configuration.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        tracing::debug!(
            path = %path.display(),
            experimental = config.experimental.enabled,
            sandbox = %config.sandbox.mode,
            "Loaded visual configuration"
        );
        Ok(config)
    }
}

//! Visual integration for the settings engine
//!
//! Provides the pieces every visual shares on top of `settings-core`:
//!
//! - [`VisualConfig`] loaded from TOML
//! - [`ExperimentalSettings`], the built-in `experimental` object
//! - [`VisualSettings`], which tracks the sandbox state across host updates
//! - [`logging::init`] for tracing output

pub mod config;
pub mod error;
pub mod experimental;
pub mod logging;
pub mod visual;

pub use config::{ExperimentalConfig, SandboxConfig, SandboxMode, VisualConfig};
pub use error::{Error, Result};
pub use experimental::ExperimentalSettings;
pub use visual::{SandboxChange, VisualSettings};

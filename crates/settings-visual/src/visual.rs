//! Visual-level settings state
//!
//! Tracks the sandbox state of a visual across host updates. The default
//! sandbox state comes from [`SandboxMode`] and whether the host already runs
//! the visual in a frame; the host may override it through the
//! `experimental.sandboxed` property when experimental features are enabled.

use std::sync::Arc;

use serde_json::Value;
use settings_core::{CapabilitySchema, ConfigSnapshot, EnumerationEntry, HasSettings, Record};

use crate::Result;
use crate::config::{SandboxMode, VisualConfig};
use crate::experimental::{ExperimentalSettings, OBJECT_NAME};

/// Outcome of applying a host update to the sandbox state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxChange {
    Unchanged,
    /// The visual must move into a frame
    Enabled,
    /// The visual must leave its frame
    Disabled,
}

impl SandboxChange {
    pub fn is_changed(&self) -> bool {
        !matches!(self, SandboxChange::Unchanged)
    }
}

#[derive(Debug, Clone)]
pub struct VisualSettings {
    config: VisualConfig,
    default_sandboxed: bool,
    experimental: ExperimentalSettings,
}

impl VisualSettings {
    /// Create the settings state for a visual.
    ///
    /// `in_frame` reports whether the host already runs the visual inside a
    /// frame; it only matters for [`SandboxMode::Auto`].
    pub fn new(config: VisualConfig, in_frame: bool) -> Self {
        let default_sandboxed = config.sandbox.mode.resolve(in_frame);
        tracing::debug!(
            mode = %config.sandbox.mode,
            in_frame,
            default_sandboxed,
            "Resolved default sandbox state"
        );
        Self {
            config,
            default_sandboxed,
            experimental: ExperimentalSettings {
                sandboxed: default_sandboxed,
            },
        }
    }

    pub fn config(&self) -> &VisualConfig {
        &self.config
    }

    pub fn sandbox_mode(&self) -> SandboxMode {
        self.config.sandbox.mode
    }

    /// Sandbox state used when the host does not set one.
    pub fn default_sandboxed(&self) -> bool {
        self.default_sandboxed
    }

    /// Current sandbox state.
    pub fn sandboxed(&self) -> bool {
        self.experimental.sandboxed
    }

    pub fn experimental_enabled(&self) -> bool {
        self.config.experimental.enabled
    }

    /// Capability schema of the visual's own objects.
    ///
    /// Empty unless experimental features are enabled.
    pub fn capabilities(&self) -> Result<Arc<CapabilitySchema>> {
        if !self.experimental_enabled() {
            return Ok(Arc::new(CapabilitySchema::new()));
        }
        Ok(ExperimentalSettings::capabilities()?)
    }

    /// Apply a host update.
    ///
    /// With experimental features enabled, the sandbox state becomes the
    /// snapshot's `experimental.sandboxed`, or the default sandbox state
    /// when the snapshot does not set it.
    pub fn update(&mut self, snapshot: Option<&ConfigSnapshot>) -> Result<SandboxChange> {
        if !self.experimental_enabled() {
            return Ok(SandboxChange::Unchanged);
        }

        let mut fallback = Record::new();
        fallback.insert("sandboxed".to_string(), Value::Bool(self.default_sandboxed));
        let next = ExperimentalSettings::from_host(snapshot, Some(&fallback))?;

        let change = match (self.experimental.sandboxed, next.sandboxed) {
            (false, true) => SandboxChange::Enabled,
            (true, false) => SandboxChange::Disabled,
            _ => SandboxChange::Unchanged,
        };
        if change.is_changed() {
            tracing::debug!(?change, "Sandbox state changed");
        }
        self.experimental = next;
        Ok(change)
    }

    /// Property-pane rows for one of the visual's own objects.
    pub fn enumerate(
        &self,
        object_name: &str,
        snapshot: Option<&ConfigSnapshot>,
    ) -> Result<Vec<EnumerationEntry>> {
        if object_name != OBJECT_NAME || !self.experimental_enabled() {
            return Ok(Vec::new());
        }
        Ok(self
            .experimental
            .build_enumeration_objects(object_name, snapshot, false)?)
    }
}

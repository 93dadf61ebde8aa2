//! The built-in `experimental` settings object

use serde::{Deserialize, Serialize};
use settings_meta::{ClassDefinition, FieldDescriptor, FieldType, SettingsClass};

pub const OBJECT_NAME: &str = "experimental";

/// Experimental options every visual exposes when enabled in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentalSettings {
    /// Whether the visual runs inside its own frame
    pub sandboxed: bool,
}

impl SettingsClass for ExperimentalSettings {
    const NAME: &'static str = "ExperimentalSettings";

    fn describe() -> ClassDefinition {
        ClassDefinition::new(Self::NAME)
            .object(OBJECT_NAME, "Experimental")
            .field(
                FieldDescriptor::new("sandboxed", OBJECT_NAME, "sandboxed", FieldType::Bool)
                    .display_name("Enable to sandbox the visual into an IFrame")
                    .default_value(true),
            )
    }
}

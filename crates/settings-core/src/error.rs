//! Error types for settings-core

/// Result type for settings-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while mapping settings to and from the host
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two leaf fields, own or nested, map to the same host property
    #[error("Schema conflict on {object}.{property} in settings class {class}")]
    SchemaConflict {
        class: String,
        object: String,
        property: String,
    },

    /// The settings value did not serialize to a JSON object
    #[error("Settings class {class} must serialize to an object")]
    NotAnObject { class: String },

    /// Definition error from settings-meta
    #[error(transparent)]
    Meta(#[from] settings_meta::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

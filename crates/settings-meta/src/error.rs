//! Error types for settings-meta
//!
//! Every variant is a definition-time error: a mistake in how a settings
//! type declares its fields, surfaced when the type is first registered.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Duplicate property {object}.{property} on settings class {class}")]
    DuplicateProperty {
        class: String,
        object: String,
        property: String,
    },

    #[error("Attribute {attribute} is declared more than once on settings class {class}")]
    DuplicateAttribute { class: String, attribute: String },

    #[error("Field {attribute} on settings class {class} has neither a default value nor a parse transform")]
    MissingDefault { class: String, attribute: String },

    #[error("Default value of {attribute} on settings class {class} is not a valid {expected}")]
    InvalidDefault {
        class: String,
        attribute: String,
        expected: String,
    },

    #[error("Settings class {class} inherits from itself")]
    CyclicInheritance { class: String },

    #[error("Settings class {class} nests itself through composite field {attribute}")]
    CyclicComposite { class: String, attribute: String },

    #[error("Settings class {class} is already in use; its descriptors can no longer change")]
    ClassSealed { class: String },
}

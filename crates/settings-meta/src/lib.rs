//! Metadata for the visual settings engine.
//!
//! This crate provides the declarative half of the engine: field
//! descriptors, settings type definitions, and the append-only registry
//! that merges a type's own fields with everything it inherits.

pub mod class;
pub mod descriptor;
pub mod error;
pub mod registry;

pub use class::{ClassDefinition, ClassId, ClassRef, SettingsClass};
pub use descriptor::{EnumMember, FieldDescriptor, FieldType, FormatFn, ParseFn};
pub use error::{Error, Result};
pub use registry::MetadataRegistry;

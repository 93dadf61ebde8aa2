//! Settings engine core
//!
//! Moves typed settings values across the host boundary using the field
//! descriptors held by [`settings_meta::MetadataRegistry`]:
//!
//! - [`schema`] derives the host capability schema
//! - [`codec`] converts values to and from plain JSON records
//! - [`bridge`] reads host snapshots and builds persist/enumeration payloads
//! - [`settings`] exposes all of it as methods on the settings type

pub mod bridge;
pub mod codec;
pub mod error;
mod fields;
pub mod host;
pub mod schema;
pub mod settings;

pub use bridge::{build_enumeration_objects, build_persist_objects, parse_settings_from_host};
pub use codec::{Record, decode_record, encode_record, from_json, to_json};
pub use error::{Error, Result};
pub use host::{
    ConfigSnapshot, EnumerationEntry, ObjectInstance, PersistInstances, PersistPayload,
    PropertyBag, Selector,
};
pub use schema::{
    CapabilitySchema, FillType, ObjectCapability, PropertyCapability, PropertyType, SolidFill,
    build_capabilities_objects,
};
pub use settings::HasSettings;

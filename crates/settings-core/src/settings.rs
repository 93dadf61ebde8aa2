//! Convenience methods on every settings type
//!
//! [`HasSettings`] is implemented for all [`SettingsClass`] types and bundles
//! the codec, schema and bridge operations behind the type itself.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//! use settings_core::{ConfigSnapshot, HasSettings, Selector};
//! use settings_meta::{ClassDefinition, FieldDescriptor, FieldType, SettingsClass};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Legend {
//!     show: bool,
//! }
//!
//! impl SettingsClass for Legend {
//!     const NAME: &'static str = "Legend";
//!
//!     fn describe() -> ClassDefinition {
//!         ClassDefinition::new(Self::NAME).field(
//!             FieldDescriptor::new("show", "legend", "show", FieldType::Bool)
//!                 .default_value(json!(true)),
//!         )
//!     }
//! }
//!
//! let legend = Legend::defaults().unwrap();
//! assert!(legend.show);
//!
//! let snapshot = ConfigSnapshot::new().with_value("legend", Selector::global(), "show", false);
//! let legend = legend.receive_host_settings(Some(&snapshot)).unwrap();
//! assert!(!legend.show);
//! ```

use std::sync::Arc;

use settings_meta::{ClassRef, SettingsClass};

use crate::Result;
use crate::bridge;
use crate::codec::{self, Layer, Record};
use crate::host::{ConfigSnapshot, EnumerationEntry, PersistPayload};
use crate::schema::{self, CapabilitySchema};

pub trait HasSettings: SettingsClass + Sized {
    /// Build a value from a plain record, defaulting what is missing.
    fn from_json_object(record: &Record) -> Result<Self> {
        codec::from_json(record)
    }

    /// Build a value from the host configuration, with `additional` as the
    /// fallback below the snapshot.
    fn from_host(snapshot: Option<&ConfigSnapshot>, additional: Option<&Record>) -> Result<Self> {
        bridge::parse_settings_from_host(snapshot, additional)
    }

    /// The capability schema of this type.
    fn capabilities() -> Result<Arc<CapabilitySchema>> {
        schema::build_capabilities_objects(ClassRef::of::<Self>())
    }

    /// A value with every field at its default.
    fn defaults() -> Result<Self> {
        codec::from_json(&Record::new())
    }

    fn to_json_object(&self) -> Result<Record> {
        codec::to_json(self)
    }

    /// Overlay in-memory values on a copy of this value.
    ///
    /// `new_props` holds values as they sit on the type (before `format`),
    /// so `parse` is not applied to them. Attributes absent from `new_props`,
    /// not coercible to their field type or not fitting their Rust field keep
    /// their current value. Composite attributes merge field by field.
    fn receive(&self, new_props: &Record) -> Result<Self> {
        let current = codec::to_value(self)?;
        codec::resolve_typed(&[Layer::Memory(new_props), Layer::Memory(&current)])
    }

    /// Overlay the host configuration on a copy of this value.
    fn receive_host_settings(&self, snapshot: Option<&ConfigSnapshot>) -> Result<Self> {
        let current = self.to_json_object()?;
        bridge::parse_settings_from_host(snapshot, Some(&current))
    }

    fn build_persist_objects(&self, include_hidden: bool) -> Result<PersistPayload> {
        bridge::build_persist_objects(self, include_hidden)
    }

    fn build_enumeration_objects(
        &self,
        object_name: &str,
        snapshot: Option<&ConfigSnapshot>,
        include_hidden: bool,
    ) -> Result<Vec<EnumerationEntry>> {
        bridge::build_enumeration_objects(self, object_name, snapshot, include_hidden)
    }
}

impl<T: SettingsClass> HasSettings for T {}

//! Settings types and their declared definitions
//!
//! A settings type is a plain serde struct that implements [`SettingsClass`].
//! Its [`ClassDefinition`] is an explicit table built once: an optional parent
//! type, display names for its host objects and its own field descriptors.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//! use settings_meta::{ClassDefinition, FieldDescriptor, FieldType, SettingsClass};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Bar {
//!     color: String,
//! }
//!
//! impl SettingsClass for Bar {
//!     const NAME: &'static str = "Bar";
//!
//!     fn describe() -> ClassDefinition {
//!         ClassDefinition::new(Self::NAME)
//!             .object("bar", "Bar")
//!             .field(
//!                 FieldDescriptor::new("color", "bar", "color", FieldType::Color)
//!                     .default_value(json!("#fff")),
//!             )
//!     }
//! }
//!
//! assert_eq!(Bar::describe().fields.len(), 1);
//! ```

use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::descriptor::FieldDescriptor;

/// A typed settings value whose fields are mapped to host objects.
pub trait SettingsClass: Serialize + DeserializeOwned + 'static {
    /// Human-readable type name used in errors and logs.
    const NAME: &'static str;

    /// Build the explicit descriptor table for this type.
    ///
    /// Called once per process by the global registry.
    fn describe() -> ClassDefinition;
}

/// Identity of a settings type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(TypeId);

impl ClassId {
    pub fn of<T: 'static>() -> Self {
        Self(TypeId::of::<T>())
    }
}

/// A type-erased handle to a settings type.
///
/// Lets descriptor tables point at other settings types (parents and
/// composite fields) without generics.
#[derive(Clone, Copy)]
pub struct ClassRef {
    id: ClassId,
    name: &'static str,
    describe: fn() -> ClassDefinition,
}

impl ClassRef {
    pub fn of<T: SettingsClass>() -> Self {
        Self {
            id: ClassId::of::<T>(),
            name: T::NAME,
            describe: T::describe,
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Build the type's declared definition.
    pub fn definition(&self) -> ClassDefinition {
        (self.describe)()
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassRef {}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassRef").field(&self.name).finish()
    }
}

/// Declared definition of a settings type: its own fields only.
///
/// Inherited fields are merged by the registry.
#[derive(Debug, Clone)]
pub struct ClassDefinition {
    pub name: &'static str,
    pub parent: Option<ClassRef>,
    /// Display names of host objects, keyed by object name
    pub objects: BTreeMap<String, String>,
    pub fields: Vec<FieldDescriptor>,
}

impl ClassDefinition {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            parent: None,
            objects: BTreeMap::new(),
            fields: Vec::new(),
        }
    }

    /// Inherit every field of `P`.
    pub fn extends<P: SettingsClass>(mut self) -> Self {
        self.parent = Some(ClassRef::of::<P>());
        self
    }

    /// Name the display name of a host object.
    pub fn object(mut self, object_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.objects.insert(object_name.into(), display_name.into());
        self
    }

    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.push(descriptor);
        self
    }
}

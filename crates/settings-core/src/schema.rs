//! Capability schema derived from field descriptors
//!
//! The schema tells the host which objects and properties a settings type
//! exposes and how to edit them. It serializes to the host's `objects` shape:
//!
//! ```json
//! {
//!   "bar": {
//!     "displayName": "Bar",
//!     "properties": {
//!       "color": { "displayName": "Color", "type": { "fill": { "solid": { "color": true } } } }
//!     }
//!   }
//! }
//! ```
//!
//! Schemas are built once per settings type and cached for the process.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use settings_meta::{ClassId, ClassRef, EnumMember, FieldType, MetadataRegistry};

use crate::Result;
use crate::fields::{HostField, host_fields};

static SCHEMAS: LazyLock<DashMap<ClassId, Arc<CapabilitySchema>>> = LazyLock::new(DashMap::new);

/// Host type tag of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyType {
    Bool(bool),
    Text(bool),
    Numeric(bool),
    Integer(bool),
    Enumeration(Vec<EnumMember>),
    Fill(FillType),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillType {
    pub solid: SolidFill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidFill {
    pub color: bool,
}

impl PropertyType {
    /// Host type tag for a scalar field type; `None` for composites.
    pub fn from_field_type(field_type: &FieldType) -> Option<Self> {
        match field_type {
            FieldType::Bool => Some(Self::Bool(true)),
            FieldType::Text => Some(Self::Text(true)),
            FieldType::Numeric => Some(Self::Numeric(true)),
            FieldType::Integer => Some(Self::Integer(true)),
            FieldType::Enumeration(members) => Some(Self::Enumeration(members.clone())),
            FieldType::Color => Some(Self::Fill(FillType {
                solid: SolidFill { color: true },
            })),
            FieldType::Composite(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyCapability {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectCapability {
    pub display_name: String,
    pub properties: BTreeMap<String, PropertyCapability>,
}

/// The host capability schema: `object -> { displayName, properties }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySchema {
    objects: BTreeMap<String, ObjectCapability>,
}

impl CapabilitySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, object_name: &str) -> Option<&ObjectCapability> {
        self.objects.get(object_name)
    }

    pub fn property(&self, object_name: &str, property_name: &str) -> Option<&PropertyCapability> {
        self.objects.get(object_name)?.properties.get(property_name)
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn add(&mut self, field: &HostField) {
        let descriptor = &field.descriptor;
        let Some(property_type) = PropertyType::from_field_type(&descriptor.field_type) else {
            return;
        };

        let object = self
            .objects
            .entry(descriptor.object_name.clone())
            .or_insert_with(|| ObjectCapability {
                display_name: MetadataRegistry::global()
                    .object_display_name(field.owner, &descriptor.object_name)
                    .unwrap_or_else(|| descriptor.object_name.clone()),
                properties: BTreeMap::new(),
            });
        object.properties.insert(
            descriptor.property_name.clone(),
            PropertyCapability {
                display_name: descriptor.display_name.clone(),
                description: descriptor.description.clone(),
                property_type,
            },
        );
    }
}

/// Build (or fetch from cache) the capability schema of a settings type.
///
/// Composite fields contribute the nested type's objects under their own
/// names. Two fields claiming the same property fail with
/// [`Error::SchemaConflict`](crate::Error::SchemaConflict).
pub fn build_capabilities_objects(class: ClassRef) -> Result<Arc<CapabilitySchema>> {
    if let Some(cached) = SCHEMAS.get(&class.id()) {
        return Ok(Arc::clone(&cached));
    }

    let mut schema = CapabilitySchema::new();
    for field in host_fields(class)? {
        schema.add(&field);
    }
    tracing::debug!(
        class = class.name(),
        objects = schema.len(),
        "Built capability schema"
    );

    let schema = Arc::new(schema);
    SCHEMAS.insert(class.id(), Arc::clone(&schema));
    Ok(schema)
}

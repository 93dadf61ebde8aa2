//! Host-side shapes exchanged with the platform
//!
//! The host hands the engine a [`ConfigSnapshot`] on every update and takes
//! back a [`PersistPayload`] (storage write-back) or a list of
//! [`EnumerationEntry`] rows (property pane). All of them are plain JSON trees.
//!
//! # Example JSON
//!
//! A snapshot is keyed `object -> selector -> property`, where the empty
//! selector is the global configuration:
//!
//! ```json
//! {
//!   "bar": {
//!     "": { "color": "#000" },
//!     "series-1": { "color": "#f00" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;

/// Key identifying which bound data element a configuration applies to.
///
/// The empty selector is the global (default) configuration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(String);

impl Selector {
    /// The global selector.
    pub fn global() -> Self {
        Self(String::new())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn is_global(&self) -> bool {
        self.0.is_empty()
    }

    /// The selector id, `None` for the global selector.
    pub fn id(&self) -> Option<&str> {
        (!self.is_global()).then_some(self.0.as_str())
    }
}

impl From<&str> for Selector {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<Option<&str>> for Selector {
    fn from(id: Option<&str>) -> Self {
        id.map(Self::new).unwrap_or_default()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Some(id) => write!(f, "{}", id),
            None => write!(f, "<global>"),
        }
    }
}

/// Property values of one object for one selector.
pub type PropertyBag = Map<String, Value>;

/// The host's raw configuration: `object -> selector -> property -> value`.
///
/// Read-only from the engine's point of view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSnapshot {
    objects: BTreeMap<String, BTreeMap<Selector, PropertyBag>>,
}

impl ConfigSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from its JSON shape.
    pub fn from_json(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Set a property value (builder pattern).
    pub fn with_value(
        mut self,
        object_name: impl Into<String>,
        selector: impl Into<Selector>,
        property_name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.insert(object_name, selector, property_name, value);
        self
    }

    /// Set a property value.
    pub fn insert(
        &mut self,
        object_name: impl Into<String>,
        selector: impl Into<Selector>,
        property_name: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.objects
            .entry(object_name.into())
            .or_default()
            .entry(selector.into())
            .or_default()
            .insert(property_name.into(), value.into());
    }

    /// Per-selector property bags of an object.
    pub fn object(&self, object_name: &str) -> Option<&BTreeMap<Selector, PropertyBag>> {
        self.objects.get(object_name)
    }

    /// Selectors present for an object, global first.
    pub fn selectors(&self, object_name: &str) -> Vec<&Selector> {
        self.object(object_name)
            .map(|bags| bags.keys().collect())
            .unwrap_or_default()
    }

    /// Look up a single property value.
    pub fn value(&self, object_name: &str, selector: &Selector, property_name: &str) -> Option<&Value> {
        self.objects
            .get(object_name)?
            .get(selector)?
            .get(property_name)
    }

    /// Look up a property value of the global configuration.
    pub fn global_value(&self, object_name: &str, property_name: &str) -> Option<&Value> {
        self.value(object_name, &Selector::global(), property_name)
    }

    /// Names of all objects present.
    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Persistence write-back: `object -> property -> value`.
///
/// A full replacement write per object, not a diff.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistPayload {
    objects: BTreeMap<String, PropertyBag>,
}

impl PersistPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        object_name: impl Into<String>,
        property_name: impl Into<String>,
        value: Value,
    ) {
        self.objects
            .entry(object_name.into())
            .or_default()
            .insert(property_name.into(), value);
    }

    /// Properties written for an object.
    pub fn object(&self, object_name: &str) -> Option<&PropertyBag> {
        self.objects.get(object_name)
    }

    pub fn value(&self, object_name: &str, property_name: &str) -> Option<&Value> {
        self.objects.get(object_name)?.get(property_name)
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Convert into the host's instance list form, one global instance per object.
    pub fn to_instances(&self) -> PersistInstances {
        PersistInstances {
            merge: self
                .objects
                .iter()
                .map(|(object_name, properties)| ObjectInstance {
                    object_name: object_name.clone(),
                    selector: None,
                    properties: properties.clone(),
                })
                .collect(),
        }
    }
}

/// One object's property values for one selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInstance {
    pub object_name: String,
    /// `None` for the global configuration
    pub selector: Option<String>,
    pub properties: PropertyBag,
}

/// A property-pane row: one object for one selector.
pub type EnumerationEntry = ObjectInstance;

/// Host persistence request in instance form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistInstances {
    pub merge: Vec<ObjectInstance>,
}

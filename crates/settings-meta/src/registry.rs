//! Metadata registry for settings types
//!
//! The registry maps each settings type to its declared field descriptors and
//! answers merged lookups (own fields plus everything inherited). It is
//! append-only: descriptors are added at definition time and never removed.
//!
//! A process-wide instance is available through [`MetadataRegistry::global`].
//! Types are pulled into it lazily, exactly once, from
//! [`SettingsClass::describe`](crate::SettingsClass::describe) the first time
//! their descriptors are requested.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use dashmap::{DashMap, DashSet};

use crate::class::{ClassId, ClassRef};
use crate::descriptor::FieldDescriptor;
use crate::error::{Error, Result};

static GLOBAL: LazyLock<MetadataRegistry> = LazyLock::new(MetadataRegistry::new);

/// Declared state of one settings type.
#[derive(Debug, Clone)]
struct ClassEntry {
    name: &'static str,
    parent: Option<ClassRef>,
    objects: BTreeMap<String, String>,
    fields: Vec<FieldDescriptor>,
}

impl ClassEntry {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            parent: None,
            objects: BTreeMap::new(),
            fields: Vec::new(),
        }
    }

    /// Add a descriptor to this type's own fields.
    ///
    /// Returns `Ok(false)` when an identical descriptor is already present.
    fn add(&mut self, descriptor: FieldDescriptor) -> Result<bool> {
        let descriptor = validate(self.name, descriptor)?;

        if let Some(existing) = self.fields.iter().find(|d| d.key() == descriptor.key()) {
            if existing.same_as(&descriptor) {
                return Ok(false);
            }
            return Err(Error::DuplicateProperty {
                class: self.name.to_string(),
                object: descriptor.object_name,
                property: descriptor.property_name,
            });
        }

        if self
            .fields
            .iter()
            .any(|d| d.attribute == descriptor.attribute)
        {
            return Err(Error::DuplicateAttribute {
                class: self.name.to_string(),
                attribute: descriptor.attribute,
            });
        }

        self.fields.push(descriptor);
        Ok(true)
    }
}

/// Check a descriptor for definition errors and normalize its default.
fn validate(class: &str, mut descriptor: FieldDescriptor) -> Result<FieldDescriptor> {
    if descriptor.is_composite() {
        return Ok(descriptor);
    }

    match (&descriptor.default_value, descriptor.parse) {
        (None, None) => Err(Error::MissingDefault {
            class: class.to_string(),
            attribute: descriptor.attribute,
        }),
        // Without a parse transform the in-memory value has the host type
        (Some(default), None) => match descriptor.field_type.coerce(default) {
            Some(normalized) => {
                descriptor.default_value = Some(normalized);
                Ok(descriptor)
            }
            None => Err(Error::InvalidDefault {
                class: class.to_string(),
                expected: descriptor.field_type.to_string(),
                attribute: descriptor.attribute,
            }),
        },
        _ => Ok(descriptor),
    }
}

/// Registry of settings types and their field descriptors.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
/// use settings_meta::{
///     ClassDefinition, ClassRef, FieldDescriptor, FieldType, MetadataRegistry, SettingsClass,
/// };
///
/// #[derive(Serialize, Deserialize)]
/// struct Labels {
///     show: bool,
/// }
///
/// impl SettingsClass for Labels {
///     const NAME: &'static str = "Labels";
///
///     fn describe() -> ClassDefinition {
///         ClassDefinition::new(Self::NAME).field(
///             FieldDescriptor::new("show", "labels", "show", FieldType::Bool)
///                 .default_value(json!(true)),
///         )
///     }
/// }
///
/// let registry = MetadataRegistry::new();
/// let fields = registry.get_descriptors(ClassRef::of::<Labels>()).unwrap();
/// assert_eq!(fields.len(), 1);
/// assert_eq!(fields[0].key(), ("labels", "show"));
/// ```
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    classes: DashMap<ClassId, ClassEntry>,
    /// Merged (inherited + own) descriptor sets, computed on first lookup
    merged: DashMap<ClassId, Arc<[FieldDescriptor]>>,
    /// Types whose descriptors have been read and can no longer change
    sealed: DashSet<ClassId>,
}

impl MetadataRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            classes: DashMap::new(),
            merged: DashMap::new(),
            sealed: DashSet::new(),
        }
    }

    /// The process-wide registry used by the settings engine.
    pub fn global() -> &'static MetadataRegistry {
        &GLOBAL
    }

    /// Register a single descriptor on a settings type.
    ///
    /// The type's declared definition is loaded first, so the descriptor
    /// extends it. Re-registering an identical descriptor is a no-op. A
    /// different descriptor under a key the type already declares fails with
    /// [`Error::DuplicateProperty`]. Once the type's descriptors have been
    /// read, directly or through a subtype, it is sealed and further
    /// registration fails with [`Error::ClassSealed`].
    pub fn register(&self, class: ClassRef, descriptor: FieldDescriptor) -> Result<()> {
        self.register_class(class)?;
        if self.sealed.contains(&class.id()) {
            return Err(Error::ClassSealed {
                class: class.name().to_string(),
            });
        }

        let mut entry = self
            .classes
            .entry(class.id())
            .or_insert_with(|| ClassEntry::new(class.name()));
        entry.add(descriptor)?;
        Ok(())
    }

    /// Register a settings type from its declared definition.
    ///
    /// Parents and composite field types are registered first. Does nothing if
    /// the type is already registered.
    pub fn register_class(&self, class: ClassRef) -> Result<()> {
        let result = self.register_class_inner(class, &mut Vec::new());
        if let Err(e) = &result {
            tracing::warn!(class = class.name(), error = %e, "Settings class definition rejected");
        }
        result
    }

    fn register_class_inner(&self, class: ClassRef, stack: &mut Vec<ClassId>) -> Result<()> {
        if self.classes.contains_key(&class.id()) {
            return Ok(());
        }
        if stack.contains(&class.id()) {
            return Err(Error::CyclicInheritance {
                class: class.name().to_string(),
            });
        }
        stack.push(class.id());

        let definition = class.definition();
        if let Some(parent) = definition.parent {
            self.register_class_inner(parent, stack)?;
        }

        let mut entry = ClassEntry {
            name: class.name(),
            parent: definition.parent,
            objects: definition.objects,
            fields: Vec::new(),
        };
        for field in definition.fields {
            if let Some(nested) = field.nested() {
                if stack.contains(&nested.id()) {
                    return Err(Error::CyclicComposite {
                        class: class.name().to_string(),
                        attribute: field.attribute,
                    });
                }
                self.register_class_inner(nested, stack)?;
            }
            entry.add(field)?;
        }
        stack.pop();

        tracing::debug!(
            class = class.name(),
            fields = entry.fields.len(),
            parent = definition.parent.map(|p| p.name()),
            "Registered settings class"
        );
        self.classes.entry(class.id()).or_insert(entry);
        Ok(())
    }

    /// Get the merged descriptor set of a settings type.
    ///
    /// Inherited fields that the type does not override come first, in
    /// ancestor declaration order, followed by the type's own fields in
    /// declaration order. A field overrides an inherited one with the same
    /// `(object_name, property_name)` key.
    pub fn get_descriptors(&self, class: ClassRef) -> Result<Arc<[FieldDescriptor]>> {
        if let Some(cached) = self.merged.get(&class.id()) {
            return Ok(Arc::clone(&cached));
        }

        self.register_class(class)?;
        let merged: Arc<[FieldDescriptor]> = self.merge(class)?.into();
        self.merged.insert(class.id(), Arc::clone(&merged));
        Ok(merged)
    }

    fn merge(&self, class: ClassRef) -> Result<Vec<FieldDescriptor>> {
        self.sealed.insert(class.id());
        let (parent, own) = match self.classes.get(&class.id()) {
            Some(entry) => (entry.parent, entry.fields.clone()),
            None => (None, Vec::new()),
        };

        let mut merged = match parent {
            Some(parent) => self.merge(parent)?,
            None => Vec::new(),
        };
        merged.retain(|inherited| !own.iter().any(|d| d.key() == inherited.key()));

        if let Some(clash) = own
            .iter()
            .find(|d| merged.iter().any(|inherited| inherited.attribute == d.attribute))
        {
            return Err(Error::DuplicateAttribute {
                class: class.name().to_string(),
                attribute: clash.attribute.clone(),
            });
        }

        merged.extend(own);
        Ok(merged)
    }

    /// Display name of a host object, searching the type and then its ancestors.
    pub fn object_display_name(&self, class: ClassRef, object_name: &str) -> Option<String> {
        let mut current = Some(class);
        while let Some(class) = current {
            let entry = self.classes.get(&class.id())?;
            if let Some(name) = entry.objects.get(object_name) {
                return Some(name.clone());
            }
            current = entry.parent;
        }
        None
    }

    /// Check if a settings type is registered.
    pub fn contains(&self, class: ClassRef) -> bool {
        self.classes.contains_key(&class.id())
    }

    /// List the names of all registered settings types, sorted.
    pub fn class_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.classes.iter().map(|entry| entry.name).collect();
        names.sort();
        names
    }

    /// Get the number of registered settings types.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

//! Leaf fields of a settings type, flattened through its composites
//!
//! Schema, persistence and enumeration all address the host by
//! `(object, property)`. A composite has no slot of its own, so each of them
//! works on this flattened view, where every host slot belongs to exactly one
//! leaf field.

use std::collections::BTreeSet;

use serde_json::Value;
use settings_meta::{ClassRef, FieldDescriptor, MetadataRegistry};

use crate::codec::Record;
use crate::{Error, Result};

/// A leaf descriptor together with its attribute path through composites.
#[derive(Debug)]
pub(crate) struct HostField {
    pub path: Vec<String>,
    /// Type that declares the field, for object display names
    pub owner: ClassRef,
    pub descriptor: FieldDescriptor,
    pub hidden: bool,
}

impl HostField {
    /// In-memory value of this field in a serialized instance.
    ///
    /// An explicit `null` (an unset `Option`) reads as absent, so writers
    /// substitute the default; a field without a default stays `null`.
    pub fn read<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        let (last, parents) = self.path.split_last()?;
        let mut current = record;
        for segment in parents {
            current = current.get(segment)?.as_object()?;
        }
        current.get(last).filter(|v| !v.is_null())
    }

    pub fn default_host_value(&self) -> Option<Value> {
        self.descriptor
            .default_value
            .as_ref()
            .map(|v| self.descriptor.encode(v))
    }
}

/// Flatten the descriptor table of a settings type through its composites.
///
/// A hidden composite hides every field beneath it. Two leaf fields mapped to
/// the same `(object, property)` fail with [`Error::SchemaConflict`].
pub(crate) fn host_fields(class: ClassRef) -> Result<Vec<HostField>> {
    let mut out = Vec::new();
    collect(class, &mut Vec::new(), false, &mut out)?;

    let mut seen = BTreeSet::new();
    for field in &out {
        let (object, property) = field.descriptor.key();
        if !seen.insert((object, property)) {
            tracing::warn!(
                class = class.name(),
                object,
                property,
                attribute = %field.path.join("."),
                "Host slot claimed by more than one field"
            );
            return Err(Error::SchemaConflict {
                class: class.name().to_string(),
                object: object.to_string(),
                property: property.to_string(),
            });
        }
    }
    Ok(out)
}

fn collect(
    class: ClassRef,
    path: &mut Vec<String>,
    hidden: bool,
    out: &mut Vec<HostField>,
) -> Result<()> {
    let fields = MetadataRegistry::global().get_descriptors(class)?;
    for descriptor in fields.iter() {
        path.push(descriptor.attribute.clone());
        let hidden = hidden || descriptor.hidden;
        match descriptor.nested() {
            Some(nested) => collect(nested, path, hidden, out)?,
            None => out.push(HostField {
                path: path.clone(),
                owner: class,
                descriptor: descriptor.clone(),
                hidden,
            }),
        }
        path.pop();
    }
    Ok(())
}

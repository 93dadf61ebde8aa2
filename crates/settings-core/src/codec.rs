//! Instance codec - typed settings values to and from plain JSON records
//!
//! A plain record is keyed by attribute name and holds host primitives: every
//! value has gone through its descriptor's `format` transform. Decoding walks
//! the merged descriptor table and resolves each attribute through an ordered
//! chain of value sources ([`Layer`]), falling back to the descriptor default.
//! Undecodable values are never errors, and neither are values that decode
//! but do not fit the Rust field they land in: both fall through to the next
//! source.

use serde_json::{Map, Value};
use settings_meta::{ClassRef, FieldDescriptor, MetadataRegistry, SettingsClass};

use crate::fields::host_fields;
use crate::host::{ConfigSnapshot, Selector};
use crate::{Error, Result};

/// A plain JSON record keyed by attribute name.
pub type Record = Map<String, Value>;

/// One source of raw values, consulted in order during resolution.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Layer<'a> {
    /// Host configuration for a selector, looked up by `(object, property)`
    Host {
        snapshot: &'a ConfigSnapshot,
        selector: &'a Selector,
    },
    /// Plain record, looked up by attribute
    Record(&'a Record),
    /// In-memory record, looked up by attribute; `parse` is not applied
    Memory(&'a Record),
}

impl<'a> Layer<'a> {
    fn lookup(&self, descriptor: &FieldDescriptor) -> Option<&'a Value> {
        match self {
            Layer::Host { snapshot, selector } => snapshot.value(
                &descriptor.object_name,
                selector,
                &descriptor.property_name,
            ),
            Layer::Record(record) | Layer::Memory(record) => record.get(&descriptor.attribute),
        }
    }

    fn decode(&self, descriptor: &FieldDescriptor, raw: &Value) -> Option<Value> {
        match self {
            Layer::Memory(_) => descriptor.normalize(raw),
            _ => descriptor.decode(raw),
        }
    }

    /// The source to consult for the nested type of a composite field.
    fn descend(&self, descriptor: &FieldDescriptor) -> Option<Layer<'a>> {
        match self {
            // Nested descriptors keep their own object names
            Layer::Host { .. } => Some(*self),
            Layer::Record(record) => record
                .get(&descriptor.attribute)
                .and_then(Value::as_object)
                .map(Layer::Record),
            Layer::Memory(record) => record
                .get(&descriptor.attribute)
                .and_then(Value::as_object)
                .map(Layer::Memory),
        }
    }

    fn tier(&self) -> &'static str {
        match self {
            Layer::Host { .. } => "snapshot",
            Layer::Record(_) => "record",
            Layer::Memory(_) => "memory",
        }
    }
}

/// Accepts or rejects a decoded value at an attribute path.
type Accept<'f> = dyn FnMut(&[String], &Value) -> bool + 'f;

/// Resolve every attribute of a settings type through the given layers.
pub(crate) fn resolve(class: ClassRef, layers: &[Layer<'_>]) -> Result<Record> {
    resolve_at(class, layers, &mut Vec::new(), &mut |_: &[String], _: &Value| true)
}

fn resolve_at(
    class: ClassRef,
    layers: &[Layer<'_>],
    path: &mut Vec<String>,
    accept: &mut Accept<'_>,
) -> Result<Record> {
    let fields = MetadataRegistry::global().get_descriptors(class)?;
    let mut record = Record::new();

    for descriptor in fields.iter() {
        path.push(descriptor.attribute.clone());

        if let Some(nested) = descriptor.nested() {
            let nested_layers: Vec<_> = layers
                .iter()
                .filter_map(|layer| layer.descend(descriptor))
                .collect();
            let value = resolve_at(nested, &nested_layers, path, accept)?;
            record.insert(descriptor.attribute.clone(), Value::Object(value));
            path.pop();
            continue;
        }

        let value = layers
            .iter()
            .find_map(|layer| {
                let raw = layer.lookup(descriptor)?;
                match layer.decode(descriptor, raw) {
                    Some(decoded) if accept(path.as_slice(), &decoded) => Some(decoded),
                    Some(_) => {
                        tracing::debug!(
                            class = class.name(),
                            attribute = %path.join("."),
                            tier = layer.tier(),
                            ?raw,
                            "Value does not fit the field, falling back"
                        );
                        None
                    }
                    None => {
                        if !raw.is_null() {
                            tracing::debug!(
                                class = class.name(),
                                object = %descriptor.object_name,
                                property = %descriptor.property_name,
                                tier = layer.tier(),
                                ?raw,
                                "Value not decodable, falling back"
                            );
                        }
                        None
                    }
                }
            })
            .or_else(|| descriptor.default_value.clone())
            .unwrap_or(Value::Null);

        record.insert(descriptor.attribute.clone(), value);
        path.pop();
    }

    Ok(record)
}

/// Resolve the layers into a typed value.
///
/// When the resolved record does not deserialize into `T`, each candidate
/// value is tried alone against a record of defaults and the ones `T` rejects
/// fall through to the next layer. A record of defaults that `T` rejects is
/// an error.
pub(crate) fn resolve_typed<T: SettingsClass>(layers: &[Layer<'_>]) -> Result<T> {
    let class = ClassRef::of::<T>();
    host_fields(class)?;

    let record = resolve(class, layers)?;
    match serde_json::from_value(Value::Object(record)) {
        Ok(value) => return Ok(value),
        Err(e) => tracing::debug!(
            class = T::NAME,
            error = %e,
            "Resolved values do not fit the settings type, checking field by field"
        ),
    }

    let baseline = Value::Object(resolve(class, &[])?);
    serde_json::from_value::<T>(baseline.clone())?;

    let mut fits = |path: &[String], value: &Value| {
        let mut candidate = baseline.clone();
        place(&mut candidate, path, value.clone());
        serde_json::from_value::<T>(candidate).is_ok()
    };
    let record = resolve_at(class, layers, &mut Vec::new(), &mut fits)?;
    materialize(record)
}

/// Set the value at an attribute path, leaving the target alone if the path
/// does not exist.
fn place(target: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = target;
    for segment in parents {
        match current.get_mut(segment) {
            Some(next) => current = next,
            None => return,
        }
    }
    if let Some(map) = current.as_object_mut() {
        map.insert(last.clone(), value);
    }
}

/// Decode a plain record of a settings type into in-memory form.
///
/// Absent or undecodable attributes take their default.
pub fn decode_record(class: ClassRef, record: &Record) -> Result<Record> {
    resolve(class, &[Layer::Record(record)])
}

/// Encode the in-memory form of a settings type into a plain record.
///
/// Absent or null attributes take their default; `format` applies to
/// whatever value is written.
pub fn encode_record(class: ClassRef, source: &Record) -> Result<Record> {
    let fields = MetadataRegistry::global().get_descriptors(class)?;
    let empty = Record::new();
    let mut record = Record::new();

    for descriptor in fields.iter() {
        if let Some(nested) = descriptor.nested() {
            let nested_source = source
                .get(&descriptor.attribute)
                .and_then(Value::as_object)
                .unwrap_or(&empty);
            let value = encode_record(nested, nested_source)?;
            record.insert(descriptor.attribute.clone(), Value::Object(value));
            continue;
        }

        let value = source
            .get(&descriptor.attribute)
            .filter(|v| !v.is_null())
            .or(descriptor.default_value.as_ref())
            .map(|v| descriptor.encode(v))
            .unwrap_or(Value::Null);
        record.insert(descriptor.attribute.clone(), value);
    }

    Ok(record)
}

/// Serialize a typed value into its in-memory record (before `format`).
pub(crate) fn to_value<T: SettingsClass>(instance: &T) -> Result<Record> {
    match serde_json::to_value(instance)? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::NotAnObject {
            class: T::NAME.to_string(),
        }),
    }
}

/// Build a typed value from a resolved in-memory record.
pub(crate) fn materialize<T: SettingsClass>(record: Record) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Convert a typed settings value into a plain record.
pub fn to_json<T: SettingsClass>(instance: &T) -> Result<Record> {
    encode_record(ClassRef::of::<T>(), &to_value(instance)?)
}

/// Build a typed settings value from a plain record.
///
/// Attributes that are absent, undecodable or out of range for their Rust
/// field take their default.
pub fn from_json<T: SettingsClass>(record: &Record) -> Result<T> {
    resolve_typed(&[Layer::Record(record)])
}

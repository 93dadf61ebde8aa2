//! Host bridge - typed settings values to and from the host's object model
//!
//! Three operations cross the boundary:
//!
//! - [`parse_settings_from_host`] reads a [`ConfigSnapshot`] into a typed value,
//!   resolving each field as snapshot, then existing record, then default.
//! - [`build_persist_objects`] writes a typed value as a [`PersistPayload`].
//! - [`build_enumeration_objects`] lists property-pane rows for one object,
//!   one per selector the host knows about.

use serde_json::Value;
use settings_meta::{ClassRef, SettingsClass};

use crate::Result;
use crate::codec::{self, Layer, Record};
use crate::fields::host_fields;
use crate::host::{ConfigSnapshot, EnumerationEntry, PersistPayload, PropertyBag, Selector};

/// Read a typed settings value from the host configuration.
///
/// Each field takes the first decodable value of: the global selector's entry
/// in `snapshot`, the attribute in `existing` (a plain record as produced by
/// [`codec::to_json`]), the descriptor default. A value that decodes but does
/// not fit the Rust field it lands in falls through the same way. Composite
/// fields resolve field by field against their nested tables.
pub fn parse_settings_from_host<T: SettingsClass>(
    snapshot: Option<&ConfigSnapshot>,
    existing: Option<&Record>,
) -> Result<T> {
    let global = Selector::global();
    let mut layers = Vec::with_capacity(2);
    if let Some(snapshot) = snapshot {
        layers.push(Layer::Host {
            snapshot,
            selector: &global,
        });
    }
    if let Some(existing) = existing {
        layers.push(Layer::Record(existing));
    }

    codec::resolve_typed(&layers)
}

/// Build the host persistence payload of a typed settings value.
///
/// Every field is written, formatted, at `payload[object][property]`.
/// Hidden fields are skipped unless `include_hidden` is set. An unset field
/// is written as its default, or `null` when it has none.
pub fn build_persist_objects<T: SettingsClass>(
    instance: &T,
    include_hidden: bool,
) -> Result<PersistPayload> {
    let values = codec::to_value(instance)?;
    let mut payload = PersistPayload::new();

    for field in host_fields(ClassRef::of::<T>())? {
        if field.hidden && !include_hidden {
            continue;
        }
        let value = field
            .read(&values)
            .map(|v| field.descriptor.encode(v))
            .or_else(|| field.default_host_value())
            .unwrap_or(Value::Null);
        payload.insert(
            field.descriptor.object_name.as_str(),
            field.descriptor.property_name.as_str(),
            value,
        );
    }

    tracing::debug!(
        class = T::NAME,
        objects = payload.object_names().count(),
        include_hidden,
        "Built persist payload"
    );
    Ok(payload)
}

/// Build property-pane rows for one host object.
///
/// Yields one entry per selector present under `object_name` in the snapshot,
/// or a single global entry when there is none. The global entry reflects the
/// instance; other selectors show their own snapshot values over defaults.
/// An object without fields yields no entries.
pub fn build_enumeration_objects<T: SettingsClass>(
    instance: &T,
    object_name: &str,
    snapshot: Option<&ConfigSnapshot>,
    include_hidden: bool,
) -> Result<Vec<EnumerationEntry>> {
    let fields: Vec<_> = host_fields(ClassRef::of::<T>())?
        .into_iter()
        .filter(|f| f.descriptor.object_name == object_name)
        .filter(|f| include_hidden || !f.hidden)
        .collect();
    if fields.is_empty() {
        return Ok(Vec::new());
    }

    let global = Selector::global();
    let mut selectors = snapshot
        .map(|s| s.selectors(object_name))
        .unwrap_or_default();
    if selectors.is_empty() {
        selectors.push(&global);
    }

    let values = codec::to_value(instance)?;
    let entries = selectors
        .into_iter()
        .map(|selector| {
            let mut properties = PropertyBag::new();
            for field in &fields {
                let value = if selector.is_global() {
                    field.read(&values).map(|v| field.descriptor.encode(v))
                } else {
                    snapshot
                        .and_then(|s| s.value(object_name, selector, &field.descriptor.property_name))
                        .and_then(|raw| field.descriptor.decode(raw))
                        .map(|v| field.descriptor.encode(&v))
                };
                if let Some(value) = value.or_else(|| field.default_host_value()) {
                    properties.insert(field.descriptor.property_name.clone(), value);
                }
            }
            EnumerationEntry {
                object_name: object_name.to_string(),
                selector: selector.id().map(str::to_string),
                properties,
            }
        })
        .collect();

    Ok(entries)
}

//! Field descriptors - one per declared settings attribute
//!
//! A descriptor ties an attribute of a typed settings struct to a host
//! `(object, property)` slot, and carries everything the engine needs to
//! move a value between the two: a type tag, a default, a hidden flag and
//! optional parse/format transforms.
//!
//! # Example
//!
//! ```
//! use settings_meta::{FieldDescriptor, FieldType};
//! use serde_json::json;
//!
//! let color = FieldDescriptor::new("color", "bar", "color", FieldType::Color)
//!     .display_name("Bar Color")
//!     .default_value(json!("#fff"));
//!
//! assert_eq!(color.key(), ("bar", "color"));
//! assert_eq!(color.decode(&json!("#000")), Some(json!("#000")));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::class::{ClassRef, SettingsClass};

/// Converts a host primitive into the in-memory representation.
///
/// Returning `None` marks the raw value as unparseable; the engine then
/// falls back to the next value source instead of failing.
pub type ParseFn = fn(&Value) -> Option<Value>;

/// Converts an in-memory value into the host primitive representation.
pub type FormatFn = fn(&Value) -> Value;

/// A single member of an enumeration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumMember {
    /// Value stored in the host property bag
    pub value: String,
    /// Label shown in the host UI
    pub display_name: String,
}

impl EnumMember {
    pub fn new(value: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display_name: display_name.into(),
        }
    }
}

/// The kind of value a settings field holds.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// `true` / `false`
    Bool,
    /// Free text
    Text,
    /// Any JSON number
    Numeric,
    /// Integral number
    Integer,
    /// One of a closed set of string values. An empty member list accepts any string.
    Enumeration(Vec<EnumMember>),
    /// A color string such as `"#ff0000"`
    Color,
    /// A nested settings type with its own descriptor table
    Composite(ClassRef),
}

impl FieldType {
    /// Coerce a loosely-typed host value into this type.
    ///
    /// `null` never coerces. Returns `None` when the value cannot be
    /// represented as this type.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (_, Value::Null) => None,

            (FieldType::Bool, Value::Bool(_)) => Some(value.clone()),
            (FieldType::Bool, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },

            (FieldType::Numeric, Value::Number(_)) => Some(value.clone()),
            (FieldType::Numeric, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),

            (FieldType::Integer, Value::Number(n)) => {
                if n.is_i64() || n.is_u64() {
                    Some(value.clone())
                } else {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                        .map(|f| Value::from(f as i64))
                }
            }
            (FieldType::Integer, Value::String(s)) => {
                s.trim().parse::<i64>().ok().map(Value::from)
            }

            (FieldType::Text, Value::String(_)) => Some(value.clone()),
            (FieldType::Text, Value::Number(n)) => Some(Value::String(n.to_string())),
            (FieldType::Text, Value::Bool(b)) => Some(Value::String(b.to_string())),

            (FieldType::Color, Value::String(s)) if !s.trim().is_empty() => Some(value.clone()),
            // Host fill objects: { "solid": { "color": "#rrggbb" } }
            (FieldType::Color, Value::Object(fill)) => fill
                .get("solid")
                .and_then(|solid| solid.get("color"))
                .filter(|color| color.as_str().is_some_and(|s| !s.trim().is_empty()))
                .cloned(),

            (FieldType::Enumeration(members), Value::String(s)) => {
                (members.is_empty() || members.iter().any(|m| &m.value == s))
                    .then(|| value.clone())
            }
            (FieldType::Enumeration(members), Value::Number(n)) => {
                let s = n.to_string();
                members
                    .iter()
                    .any(|m| m.value == s)
                    .then_some(Value::String(s))
            }

            (FieldType::Composite(_), Value::Object(_)) => Some(value.clone()),

            _ => None,
        }
    }

    /// The nested settings type of a composite field.
    pub fn nested(&self) -> Option<ClassRef> {
        match self {
            FieldType::Composite(class) => Some(*class),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => write!(f, "bool"),
            FieldType::Text => write!(f, "text"),
            FieldType::Numeric => write!(f, "numeric"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Enumeration(_) => write!(f, "enumeration"),
            FieldType::Color => write!(f, "color"),
            FieldType::Composite(class) => write!(f, "composite<{}>", class.name()),
        }
    }
}

/// Metadata for one settings attribute.
///
/// The `(object_name, property_name)` pair is the field's host key and must be
/// unique within a settings type's full descriptor set. `attribute` is the
/// field's key in the in-memory record, i.e. its serde name on the typed struct.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Key of the field in the in-memory record
    pub attribute: String,
    /// Host object grouping this field
    pub object_name: String,
    /// Property key within the host object
    pub property_name: String,
    /// Label shown in the host UI
    pub display_name: String,
    /// Optional longer description shown by the host
    pub description: Option<String>,
    /// Value type
    pub field_type: FieldType,
    /// In-memory default value
    pub default_value: Option<Value>,
    /// Excluded from UI enumeration, still persisted
    pub hidden: bool,
    /// Host primitive -> in-memory value
    pub parse: Option<ParseFn>,
    /// In-memory value -> host primitive
    pub format: Option<FormatFn>,
}

impl FieldDescriptor {
    /// Create a descriptor with the display name defaulting to the property name.
    pub fn new(
        attribute: impl Into<String>,
        object_name: impl Into<String>,
        property_name: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        let property_name = property_name.into();
        Self {
            attribute: attribute.into(),
            object_name: object_name.into(),
            display_name: property_name.clone(),
            property_name,
            description: None,
            field_type,
            default_value: None,
            hidden: false,
            parse: None,
            format: None,
        }
    }

    /// Create a composite descriptor nesting the settings type `T`.
    ///
    /// Composite fields carry no host slot of their own: the nested type's
    /// descriptors keep their own object names. The key of a composite
    /// descriptor is `(T::NAME, attribute)`, which keeps it unique and lets a
    /// subtype override it.
    pub fn composite<T: SettingsClass>(attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        Self::new(
            attribute.clone(),
            T::NAME,
            attribute,
            FieldType::Composite(ClassRef::of::<T>()),
        )
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Hide this field from UI enumeration.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn parse_with(mut self, parse: ParseFn) -> Self {
        self.parse = Some(parse);
        self
    }

    pub fn format_with(mut self, format: FormatFn) -> Self {
        self.format = Some(format);
        self
    }

    /// The host key `(object_name, property_name)`.
    pub fn key(&self) -> (&str, &str) {
        (&self.object_name, &self.property_name)
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.field_type, FieldType::Composite(_))
    }

    /// The nested settings type of a composite descriptor.
    pub fn nested(&self) -> Option<ClassRef> {
        self.field_type.nested()
    }

    /// Decode a raw (host or plain-record) value into the in-memory representation.
    ///
    /// Uses the parse transform when present, type coercion otherwise.
    pub fn decode(&self, raw: &Value) -> Option<Value> {
        if raw.is_null() {
            return None;
        }
        match self.parse {
            Some(parse) => parse(raw),
            None => self.field_type.coerce(raw),
        }
    }

    /// Check an in-memory value against this field.
    ///
    /// Fields with a parse transform hold values of their own shape and are
    /// taken as-is; other fields must coerce to their type.
    pub fn normalize(&self, value: &Value) -> Option<Value> {
        if value.is_null() {
            return None;
        }
        match self.parse {
            Some(_) => Some(value.clone()),
            None => self.field_type.coerce(value),
        }
    }

    /// Encode an in-memory value into the host primitive representation.
    pub fn encode(&self, value: &Value) -> Value {
        match self.format {
            Some(format) => format(value),
            None => value.clone(),
        }
    }

    /// True when both descriptors describe the same field identically.
    ///
    /// Transforms are compared by function address.
    pub fn same_as(&self, other: &FieldDescriptor) -> bool {
        self.attribute == other.attribute
            && self.object_name == other.object_name
            && self.property_name == other.property_name
            && self.display_name == other.display_name
            && self.description == other.description
            && self.field_type == other.field_type
            && self.default_value == other.default_value
            && self.hidden == other.hidden
            && same_fn(self.parse, other.parse, |a, b| std::ptr::fn_addr_eq(a, b))
            && same_fn(self.format, other.format, |a, b| std::ptr::fn_addr_eq(a, b))
    }
}

fn same_fn<F: Copy>(a: Option<F>, b: Option<F>, eq: impl Fn(F, F) -> bool) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => eq(a, b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(FieldType::Bool, json!(true), Some(json!(true)))]
    #[case(FieldType::Bool, json!("False"), Some(json!(false)))]
    #[case(FieldType::Bool, json!("yes"), None)]
    #[case(FieldType::Bool, json!(1), None)]
    #[case(FieldType::Numeric, json!(2.5), Some(json!(2.5)))]
    #[case(FieldType::Numeric, json!(" 4.5 "), Some(json!(4.5)))]
    #[case(FieldType::Numeric, json!("abc"), None)]
    #[case(FieldType::Integer, json!(7), Some(json!(7)))]
    #[case(FieldType::Integer, json!(7.0), Some(json!(7)))]
    #[case(FieldType::Integer, json!(7.5), None)]
    #[case(FieldType::Integer, json!("12"), Some(json!(12)))]
    #[case(FieldType::Text, json!("hello"), Some(json!("hello")))]
    #[case(FieldType::Text, json!(42), Some(json!("42")))]
    #[case(FieldType::Text, json!(false), Some(json!("false")))]
    #[case(FieldType::Text, json!([1]), None)]
    #[case(FieldType::Color, json!("#000"), Some(json!("#000")))]
    #[case(FieldType::Color, json!({"solid": {"color": "#123456"}}), Some(json!("#123456")))]
    #[case(FieldType::Color, json!({"solid": {}}), None)]
    #[case(FieldType::Color, json!(""), None)]
    fn test_coerce(#[case] ty: FieldType, #[case] input: Value, #[case] expected: Option<Value>) {
        assert_eq!(ty.coerce(&input), expected);
    }

    #[test]
    fn test_null_never_coerces() {
        for ty in [
            FieldType::Bool,
            FieldType::Text,
            FieldType::Numeric,
            FieldType::Integer,
            FieldType::Color,
            FieldType::Enumeration(vec![]),
        ] {
            assert_eq!(ty.coerce(&Value::Null), None, "{ty} coerced null");
        }
    }

    #[test]
    fn test_enumeration_members() {
        let ty = FieldType::Enumeration(vec![
            EnumMember::new("left", "Left"),
            EnumMember::new("right", "Right"),
        ]);
        assert_eq!(ty.coerce(&json!("left")), Some(json!("left")));
        assert_eq!(ty.coerce(&json!("center")), None);

        let open = FieldType::Enumeration(vec![]);
        assert_eq!(open.coerce(&json!("anything")), Some(json!("anything")));
    }

    #[test]
    fn test_numeric_enumeration_member() {
        let ty = FieldType::Enumeration(vec![EnumMember::new("1", "One")]);
        assert_eq!(ty.coerce(&json!(1)), Some(json!("1")));
        assert_eq!(ty.coerce(&json!(2)), None);
    }

    #[test]
    fn test_new_uses_property_as_display_name() {
        let desc = FieldDescriptor::new("fontSize", "labels", "fontSize", FieldType::Numeric);
        assert_eq!(desc.display_name, "fontSize");
        assert!(!desc.hidden);
        assert!(desc.default_value.is_none());
    }

    #[test]
    fn test_builder_flags() {
        let desc = FieldDescriptor::new("secret", "general", "secret", FieldType::Text)
            .display_name("Secret")
            .description("Not shown in the property pane")
            .default_value("x")
            .hidden();
        assert_eq!(desc.display_name, "Secret");
        assert_eq!(
            desc.description.as_deref(),
            Some("Not shown in the property pane")
        );
        assert_eq!(desc.default_value, Some(json!("x")));
        assert!(desc.hidden);
    }

    fn parse_percent(raw: &Value) -> Option<Value> {
        raw.as_f64().map(|v| json!(v / 100.0))
    }

    fn format_percent(value: &Value) -> Value {
        value.as_f64().map(|v| json!(v * 100.0)).unwrap_or(Value::Null)
    }

    #[test]
    fn test_transforms_take_precedence_over_coercion() {
        let desc = FieldDescriptor::new("opacity", "general", "opacity", FieldType::Numeric)
            .parse_with(parse_percent)
            .format_with(format_percent);

        assert_eq!(desc.decode(&json!(50)), Some(json!(0.5)));
        // parse sees the raw value; a string is not a number for this parser
        assert_eq!(desc.decode(&json!("50")), None);
        assert_eq!(desc.encode(&json!(0.25)), json!(25.0));
    }

    #[test]
    fn test_normalize_skips_parse_for_in_memory_values() {
        let desc = FieldDescriptor::new("opacity", "general", "opacity", FieldType::Numeric)
            .parse_with(parse_percent);
        assert_eq!(desc.normalize(&json!(0.5)), Some(json!(0.5)));
        assert_eq!(desc.normalize(&Value::Null), None);

        let plain = FieldDescriptor::new("size", "general", "size", FieldType::Integer);
        assert_eq!(plain.normalize(&json!("3")), Some(json!(3)));
        assert_eq!(plain.normalize(&json!("x")), None);
    }

    #[test]
    fn test_same_as_compares_transforms() {
        let a = FieldDescriptor::new("opacity", "general", "opacity", FieldType::Numeric)
            .default_value(1.0)
            .parse_with(parse_percent);
        let b = a.clone();
        assert!(a.same_as(&b));

        let c = a.clone().default_value(0.5);
        assert!(!a.same_as(&c));

        let mut d = a.clone();
        d.parse = None;
        assert!(!a.same_as(&d));
    }
}

//! End-to-end host lifecycle for a chart visual's settings
//!
//! Declares a small settings hierarchy (base chart, bar chart subtype with a
//! nested label type) and drives it through the same calls a host makes:
//! capabilities, update with a snapshot, persist and property-pane enumeration.

use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use settings_core::{ConfigSnapshot, HasSettings, Record, Selector};
use settings_meta::{
    ClassDefinition, ClassRef, EnumMember, FieldDescriptor, FieldType, MetadataRegistry,
    SettingsClass,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Bar {
    color: String,
}

impl SettingsClass for Bar {
    const NAME: &'static str = "Bar";

    fn describe() -> ClassDefinition {
        ClassDefinition::new(Self::NAME).field(
            FieldDescriptor::new("color", "bar", "color", FieldType::Color).default_value("#fff"),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DataLabels {
    show: bool,
    precision: i64,
}

impl SettingsClass for DataLabels {
    const NAME: &'static str = "DataLabels";

    fn describe() -> ClassDefinition {
        ClassDefinition::new(Self::NAME)
            .object("labels", "Data labels")
            .field(
                FieldDescriptor::new("show", "labels", "show", FieldType::Bool)
                    .display_name("Show")
                    .default_value(false),
            )
            .field(
                FieldDescriptor::new("precision", "labels", "precision", FieldType::Integer)
                    .display_name("Decimal places")
                    .default_value(0),
            )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChartSettings {
    title: String,
    legend_position: String,
    /// Kept in storage, never shown in the property pane
    layout_version: i64,
}

impl SettingsClass for ChartSettings {
    const NAME: &'static str = "ChartSettings";

    fn describe() -> ClassDefinition {
        ClassDefinition::new(Self::NAME)
            .object("general", "General")
            .object("legend", "Legend")
            .field(
                FieldDescriptor::new("title", "general", "title", FieldType::Text)
                    .display_name("Title")
                    .default_value("Chart"),
            )
            .field(
                FieldDescriptor::new(
                    "legend_position",
                    "legend",
                    "position",
                    FieldType::Enumeration(vec![
                        EnumMember::new("top", "Top"),
                        EnumMember::new("bottom", "Bottom"),
                        EnumMember::new("right", "Right"),
                    ]),
                )
                .display_name("Position")
                .default_value("top"),
            )
            .field(
                FieldDescriptor::new("layout_version", "general", "layoutVersion", FieldType::Integer)
                    .default_value(1)
                    .hidden(),
            )
    }
}

fn parse_percent(raw: &Value) -> Option<Value> {
    raw.as_f64()
        .filter(|v| (0.0..=100.0).contains(v))
        .map(|v| json!(v / 100.0))
}

fn format_percent(value: &Value) -> Value {
    value
        .as_f64()
        .map(|v| json!((v * 100.0).round()))
        .unwrap_or(Value::Null)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct BarChartSettings {
    title: String,
    legend_position: String,
    layout_version: i64,
    bar_color: String,
    /// Stored 0..1, exchanged with the host as a percentage
    bar_opacity: f64,
    labels: DataLabels,
}

impl SettingsClass for BarChartSettings {
    const NAME: &'static str = "BarChartSettings";

    fn describe() -> ClassDefinition {
        ClassDefinition::new(Self::NAME)
            .extends::<ChartSettings>()
            .object("bars", "Bars")
            .field(
                FieldDescriptor::new("title", "general", "title", FieldType::Text)
                    .display_name("Title")
                    .default_value("Bar chart"),
            )
            .field(
                FieldDescriptor::new("bar_color", "bars", "fill", FieldType::Color)
                    .display_name("Fill")
                    .default_value("#01b8aa"),
            )
            .field(
                FieldDescriptor::new("bar_opacity", "bars", "opacity", FieldType::Numeric)
                    .display_name("Opacity")
                    .description("Bar opacity in percent")
                    .default_value(1.0)
                    .parse_with(parse_percent)
                    .format_with(format_percent),
            )
            .field(FieldDescriptor::composite::<DataLabels>("labels"))
    }
}

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[test]
fn test_bar_color_scenario() {
    let snapshot = ConfigSnapshot::new().with_value("bar", Selector::global(), "color", "#000");

    let bar = Bar::from_host(Some(&snapshot), None).unwrap();
    assert_eq!(bar.color, "#000");

    let payload = bar.build_persist_objects(false).unwrap();
    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({ "bar": { "color": "#000" } })
    );
}

#[test]
fn test_subtype_overrides_inherited_default() {
    let fields = MetadataRegistry::global()
        .get_descriptors(ClassRef::of::<BarChartSettings>())
        .unwrap();

    let titles: Vec<_> = fields
        .iter()
        .filter(|d| d.key() == ("general", "title"))
        .collect();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].default_value, Some(json!("Bar chart")));

    let attrs: Vec<_> = fields.iter().map(|d| d.attribute.as_str()).collect();
    assert_eq!(
        attrs,
        vec![
            "legend_position",
            "layout_version",
            "title",
            "bar_color",
            "bar_opacity",
            "labels"
        ]
    );

    let defaults = BarChartSettings::defaults().unwrap();
    assert_eq!(defaults.title, "Bar chart");
    assert_eq!(ChartSettings::defaults().unwrap().title, "Chart");
}

#[test]
fn test_capabilities_cover_inherited_and_nested_objects() {
    let schema = BarChartSettings::capabilities().unwrap();

    let objects: Vec<_> = schema.object_names().collect();
    assert_eq!(objects, vec!["bars", "general", "labels", "legend"]);
    assert_eq!(schema.object("labels").unwrap().display_name, "Data labels");
    assert_eq!(schema.object("general").unwrap().display_name, "General");

    assert_eq!(
        serde_json::to_value(schema.property("bars", "opacity").unwrap()).unwrap(),
        json!({
            "displayName": "Opacity",
            "description": "Bar opacity in percent",
            "type": { "numeric": true }
        })
    );
    // hidden fields are still declared to the host
    assert!(schema.property("general", "layoutVersion").is_some());
}

#[test]
fn test_host_update_cycle() {
    let stored = BarChartSettings::defaults().unwrap();

    let snapshot = ConfigSnapshot::new()
        .with_value("bars", Selector::global(), "opacity", 40)
        .with_value("bars", Selector::global(), "fill", json!({ "solid": { "color": "#fd625e" } }))
        .with_value("labels", Selector::global(), "show", true)
        .with_value("legend", Selector::global(), "position", "sideways");

    let updated = stored.receive_host_settings(Some(&snapshot)).unwrap();
    assert_eq!(
        updated,
        BarChartSettings {
            title: "Bar chart".to_string(),
            // not a member: keeps the current value
            legend_position: "top".to_string(),
            layout_version: 1,
            bar_color: "#fd625e".to_string(),
            bar_opacity: 0.4,
            labels: DataLabels {
                show: true,
                precision: 0
            },
        }
    );

    let payload = updated.build_persist_objects(false).unwrap();
    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({
            "bars": { "fill": "#fd625e", "opacity": 40.0 },
            "general": { "title": "Bar chart" },
            "labels": { "precision": 0, "show": true },
            "legend": { "position": "top" }
        })
    );

    let with_hidden = updated.build_persist_objects(true).unwrap();
    assert_eq!(with_hidden.value("general", "layoutVersion"), Some(&json!(1)));
}

#[test]
fn test_out_of_range_percentage_keeps_existing_value() {
    let existing = record(json!({ "bar_opacity": 50.0 }));
    let snapshot = ConfigSnapshot::new().with_value("bars", Selector::global(), "opacity", 250);

    let settings = BarChartSettings::from_host(Some(&snapshot), Some(&existing)).unwrap();
    assert_eq!(settings.bar_opacity, 0.5);
}

#[test]
fn test_receive_merges_nested_record() {
    let settings = BarChartSettings::defaults().unwrap();
    let updated = settings
        .receive(&record(json!({
            "title": "Revenue",
            "labels": { "precision": 2 }
        })))
        .unwrap();

    assert_eq!(updated.title, "Revenue");
    assert_eq!(updated.labels.precision, 2);
    assert!(!updated.labels.show);
    assert_eq!(updated.bar_color, settings.bar_color);
}

#[test]
fn test_receive_takes_transformed_fields_as_stored() {
    let settings = BarChartSettings::defaults().unwrap();
    let updated = settings
        .receive(&record(json!({ "bar_opacity": 0.5 })))
        .unwrap();
    assert_eq!(updated.bar_opacity, 0.5);

    let payload = updated.build_persist_objects(false).unwrap();
    assert_eq!(payload.value("bars", "opacity"), Some(&json!(50.0)));
}

#[test]
fn test_plain_record_round_trip() {
    let settings = BarChartSettings::defaults().unwrap();
    let plain = settings.to_json_object().unwrap();

    assert_eq!(plain.get("bar_opacity"), Some(&json!(100.0)));
    assert_eq!(plain.get("labels"), Some(&json!({ "show": false, "precision": 0 })));
    assert_eq!(BarChartSettings::from_json_object(&plain).unwrap(), settings);
}

#[test]
fn test_property_pane_per_selector() {
    let snapshot = ConfigSnapshot::new()
        .with_value("bars", "series-a", "fill", "#111111")
        .with_value("bars", "series-b", "fill", "#222222")
        .with_value("bars", "series-b", "opacity", 25);
    let settings = BarChartSettings::from_host(Some(&snapshot), None).unwrap();

    let entries = settings
        .build_enumeration_objects("bars", Some(&snapshot), false)
        .unwrap();
    assert_eq!(
        serde_json::to_value(&entries).unwrap(),
        json!([
            {
                "objectName": "bars",
                "selector": "series-a",
                "properties": { "fill": "#111111", "opacity": 100.0 }
            },
            {
                "objectName": "bars",
                "selector": "series-b",
                "properties": { "fill": "#222222", "opacity": 25.0 }
            }
        ])
    );
}

#[test]
fn test_property_pane_hides_hidden_fields() {
    let settings = BarChartSettings::defaults().unwrap();

    let visible = settings
        .build_enumeration_objects("general", None, false)
        .unwrap();
    assert_eq!(
        Value::Object(visible[0].properties.clone()),
        json!({ "title": "Bar chart" })
    );

    let all = settings
        .build_enumeration_objects("general", None, true)
        .unwrap();
    assert_eq!(
        Value::Object(all[0].properties.clone()),
        json!({ "title": "Bar chart", "layoutVersion": 1 })
    );
}

//! Visual integration: configuration file through to host updates

use std::fs;

use pretty_assertions::assert_eq;
use serde_json::json;
use settings_core::{ConfigSnapshot, Selector};
use settings_visual::{SandboxChange, VisualConfig, VisualSettings};
use tempfile::TempDir;

fn load(contents: &str) -> VisualConfig {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("visual.toml");
    fs::write(&path, contents).unwrap();
    VisualConfig::load(&path).unwrap()
}

#[test]
fn test_experimental_visual_lifecycle() {
    let config = load("[experimental]\nenabled = true\n");
    let mut visual = VisualSettings::new(config, false);

    assert!(visual.default_sandboxed());
    assert_eq!(
        serde_json::to_value(visual.capabilities().unwrap().as_ref()).unwrap(),
        json!({
            "experimental": {
                "displayName": "Experimental",
                "properties": {
                    "sandboxed": {
                        "displayName": "Enable to sandbox the visual into an IFrame",
                        "type": { "bool": true }
                    }
                }
            }
        })
    );

    let snapshot =
        ConfigSnapshot::new().with_value("experimental", Selector::global(), "sandboxed", false);
    assert_eq!(visual.update(Some(&snapshot)).unwrap(), SandboxChange::Disabled);

    let entries = visual.enumerate("experimental", Some(&snapshot)).unwrap();
    assert_eq!(
        serde_json::to_value(&entries).unwrap(),
        json!([{
            "objectName": "experimental",
            "selector": null,
            "properties": { "sandboxed": false }
        }])
    );
}

#[test]
fn test_default_config_exposes_nothing() {
    let mut visual = VisualSettings::new(VisualConfig::default(), true);

    assert!(visual.capabilities().unwrap().is_empty());
    assert!(visual.enumerate("experimental", None).unwrap().is_empty());

    let snapshot =
        ConfigSnapshot::new().with_value("experimental", Selector::global(), "sandboxed", true);
    assert_eq!(visual.update(Some(&snapshot)).unwrap(), SandboxChange::Unchanged);
    assert!(!visual.sandboxed());
}

#[test]
fn test_string_flag_from_host_is_coerced() {
    let config = load("[experimental]\nenabled = true\n[sandbox]\nmode = \"never\"\n");
    let mut visual = VisualSettings::new(config, false);
    assert!(!visual.sandboxed());

    let snapshot =
        ConfigSnapshot::new().with_value("experimental", Selector::global(), "sandboxed", "true");
    assert_eq!(visual.update(Some(&snapshot)).unwrap(), SandboxChange::Enabled);
    assert!(visual.sandboxed());
}

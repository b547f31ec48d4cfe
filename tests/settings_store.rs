use std::fs;
use std::path::PathBuf;

use crosshair::config::{load_settings, save_settings};
use crosshair::{CrosshairSettings, Rgb, ShapeKind};
use tempfile::tempdir;

#[test]
fn partial_file_keeps_given_keys_and_defaults_the_rest() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crosshair_config.json");
    fs::write(
        &path,
        r#"{ "circle_radius": 42, "crosshair_type": "cross", "crosshair_color": [0, 128, 255] }"#,
    )
    .unwrap();

    let loaded = load_settings(&path);
    let defaults = CrosshairSettings::default();

    assert_eq!(loaded.radius, 42);
    assert_eq!(loaded.kind, ShapeKind::Cross);
    assert_eq!(loaded.color, Rgb::new(0, 128, 255));
    assert_eq!(loaded.alpha, defaults.alpha);
    assert_eq!(loaded.dot_radius, defaults.dot_radius);
    assert_eq!(loaded.thickness, defaults.thickness);
    assert_eq!(loaded.image_path, None);
}

#[test]
fn wrong_typed_key_only_costs_that_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crosshair_config.json");
    fs::write(
        &path,
        r#"{ "crosshair_alpha": "opaque", "red_dot_radius": 9, "crosshair_type": "hexagon" }"#,
    )
    .unwrap();

    let loaded = load_settings(&path);
    assert_eq!(loaded.alpha, CrosshairSettings::default().alpha);
    assert_eq!(loaded.kind, ShapeKind::Circle);
    assert_eq!(loaded.dot_radius, 9);
}

#[test]
fn values_above_slider_range_load_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crosshair_config.json");
    fs::write(
        &path,
        r#"{ "circle_radius": 600, "red_dot_radius": 80, "crosshair_thickness": 20 }"#,
    )
    .unwrap();

    let loaded = load_settings(&path);
    assert_eq!(loaded.radius, 600);
    assert_eq!(loaded.dot_radius, 80);
    assert_eq!(loaded.thickness, 20);
}

#[test]
fn zero_radius_is_raised_to_one() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crosshair_config.json");
    fs::write(&path, r#"{ "circle_radius": 0, "red_dot_radius": -3 }"#).unwrap();

    let loaded = load_settings(&path);
    assert_eq!(loaded.radius, 1);
    assert_eq!(loaded.dot_radius, 1);
}

#[test]
fn garbage_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crosshair_config.json");
    fs::write(&path, "not json at all {").unwrap();
    assert_eq!(load_settings(&path), CrosshairSettings::default());

    fs::write(&path, "[1, 2, 3]").unwrap();
    assert_eq!(load_settings(&path), CrosshairSettings::default());
}

#[test]
fn save_then_load_round_trips_every_field() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("crosshair_config.json");

    let settings = CrosshairSettings {
        radius: 17,
        color: Rgb::new(10, 20, 30),
        alpha: 200,
        kind: ShapeKind::RedDot,
        dot_radius: 4,
        thickness: 7,
        image_path: None,
    };
    save_settings(&path, &settings).unwrap();
    assert_eq!(load_settings(&path), settings);

    let with_image = CrosshairSettings {
        kind: ShapeKind::Image,
        image_path: Some(PathBuf::from("aims").join("dot.png")),
        ..settings
    };
    save_settings(&path, &with_image).unwrap();
    assert_eq!(load_settings(&path), with_image);
}

#[test]
fn absent_image_path_is_written_as_null() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crosshair_config.json");
    save_settings(&path, &CrosshairSettings::default()).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(json["crosshair_image_path"].is_null());
    assert_eq!(json["crosshair_type"], "circle");
    assert_eq!(json["crosshair_color"], serde_json::json!([255, 0, 0]));
}

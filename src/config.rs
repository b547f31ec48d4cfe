use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use crate::settings::{CrosshairSettings, Rgb, ShapeKind};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings could not be serialized: {0}")]
    Json(#[from] serde_json::Error),
}

// JSON keys, shared with older versions of the tool
const KEY_RADIUS: &str = "circle_radius";
const KEY_COLOR: &str = "crosshair_color";
const KEY_ALPHA: &str = "crosshair_alpha";
const KEY_TYPE: &str = "crosshair_type";
const KEY_DOT_RADIUS: &str = "red_dot_radius";
const KEY_THICKNESS: &str = "crosshair_thickness";
const KEY_IMAGE_PATH: &str = "crosshair_image_path";

/// On-disk layout of the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsFile {
    circle_radius: i32,
    crosshair_color: [u8; 3],
    crosshair_alpha: u8,
    crosshair_type: ShapeKind,
    red_dot_radius: i32,
    crosshair_thickness: i32,
    crosshair_image_path: Option<PathBuf>,
}

impl From<&CrosshairSettings> for SettingsFile {
    fn from(s: &CrosshairSettings) -> Self {
        Self {
            circle_radius: s.radius,
            crosshair_color: s.color.to_array(),
            crosshair_alpha: s.alpha,
            crosshair_type: s.kind,
            red_dot_radius: s.dot_radius,
            crosshair_thickness: s.thickness,
            crosshair_image_path: s.image_path.clone(),
        }
    }
}

pub fn config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Load settings from `path`. Never fails: anything missing, unreadable or
/// of the wrong shape is replaced by its default, key by key.
pub fn load_settings(path: &Path) -> CrosshairSettings {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            if path.exists() {
                log::warn!("Could not read {}: {}", path.display(), e);
            } else {
                log::info!("No settings at {}, using defaults", path.display());
            }
            return CrosshairSettings::default();
        }
    };

    match serde_json::from_str::<Value>(&data) {
        Ok(Value::Object(map)) => settings_from_map(&map),
        Ok(_) => {
            log::warn!("{} is not a JSON object, using defaults", path.display());
            CrosshairSettings::default()
        }
        Err(e) => {
            log::warn!("{} is not valid JSON ({}), using defaults", path.display(), e);
            CrosshairSettings::default()
        }
    }
}

/// Write every field to `path`, replacing whatever was there.
pub fn save_settings(path: &Path, settings: &CrosshairSettings) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let data = serde_json::to_string_pretty(&SettingsFile::from(settings))?;
    fs::write(path, data)?;
    Ok(())
}

fn settings_from_map(map: &Map<String, Value>) -> CrosshairSettings {
    let defaults = CrosshairSettings::default();
    let mut settings = CrosshairSettings {
        radius: field(map, KEY_RADIUS).unwrap_or(defaults.radius),
        color: field::<[u8; 3]>(map, KEY_COLOR)
            .map(Rgb::from)
            .unwrap_or(defaults.color),
        alpha: field(map, KEY_ALPHA).unwrap_or(defaults.alpha),
        kind: field(map, KEY_TYPE).unwrap_or(defaults.kind),
        dot_radius: field(map, KEY_DOT_RADIUS).unwrap_or(defaults.dot_radius),
        thickness: field(map, KEY_THICKNESS).unwrap_or(defaults.thickness),
        image_path: field::<Option<PathBuf>>(map, KEY_IMAGE_PATH).flatten(),
    };
    settings.validate();
    settings
}

/// Parse one key on its own so a bad value only costs that key.
fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("Ignoring settings key {:?}: {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let loaded = load_settings(&dir.path().join("nope.json"));
        assert_eq!(loaded, CrosshairSettings::default());
    }

    #[test]
    fn garbage_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), CrosshairSettings::default());

        fs::write(&path, "[1, 2, 3]").unwrap();
        assert_eq!(load_settings(&path), CrosshairSettings::default());
    }

    #[test]
    fn wrong_typed_key_falls_back_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mixed.json");
        fs::write(
            &path,
            r#"{"circle_radius": "big", "crosshair_alpha": 300, "crosshair_thickness": 7,
                "crosshair_color": [1, 2], "crosshair_type": "hexagon"}"#,
        )
        .unwrap();

        let loaded = load_settings(&path);
        let defaults = CrosshairSettings::default();
        assert_eq!(loaded.radius, defaults.radius);
        assert_eq!(loaded.alpha, defaults.alpha);
        assert_eq!(loaded.color, defaults.color);
        assert_eq!(loaded.kind, defaults.kind);
        assert_eq!(loaded.thickness, 7);
    }

    #[test]
    fn null_image_path_reads_as_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("null.json");
        fs::write(&path, r#"{"crosshair_image_path": null}"#).unwrap();
        assert!(load_settings(&path).image_path.is_none());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join(CONFIG_FILE_NAME);
        save_settings(&path, &CrosshairSettings::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn saved_file_uses_flat_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        save_settings(&path, &CrosshairSettings::default()).unwrap();

        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[KEY_RADIUS], 3);
        assert_eq!(value[KEY_COLOR], serde_json::json!([255, 0, 0]));
        assert_eq!(value[KEY_TYPE], "circle");
        assert!(value[KEY_IMAGE_PATH].is_null());
    }

    #[test]
    fn config_path_ends_with_file_name() {
        let path = config_path();
        assert!(path.ends_with(Path::new(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)));
    }
}

//! On-disk project format and its validator.
//!
//! The file is JSON with snake_case field names:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "canvas": { "width": 1920, "height": 1080 },
//!   "layers": [{ "id": "…", "name": "…", "file_path": "…", "width": 800, "height": 600,
//!                "is_visible": true, "z_index": 0 }],
//!   "presets": [{ "id": "…", "name": "…", "layer_states": { "<layer id>": true },
//!                 "created_at": "2024-01-01T00:00:00Z" }]
//! }
//! ```
//!
//! [`validate`] performs the structural checks and nothing else; individual layer and
//! preset entries are then read leniently, filling defaults for missing fields.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::{EditorConfig, LayerStates, ProjectCanvas, MAX_CANVAS_DIMENSION};
use crate::utils::{file_stem, EditorError, EditorResult, ValidationError};

/// Version written by this build.
pub const CURRENT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub version: String,
    pub canvas: ProjectCanvas,
    pub layers: Vec<ProjectLayer>,
    pub presets: Vec<ProjectPreset>,
}

/// A layer as stored in the project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectLayer {
    pub id: String,
    pub name: String,
    pub file_path: String,
    pub width: u32,
    pub height: u32,
    pub is_visible: bool,
    pub z_index: i64,
}

/// A preset as stored in the project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPreset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_states: Option<LayerStates>,
    pub created_at: DateTime<Utc>,
}

impl ProjectFile {
    /// An empty project, as created by "New Project".
    pub fn new_empty(config: &EditorConfig) -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            canvas: config.default_canvas,
            layers: Vec::new(),
            presets: Vec::new(),
        }
    }

    /// Parses and validates project JSON.
    pub fn parse(text: &str, default_layer_size: ProjectCanvas) -> EditorResult<Self> {
        let raw: Value = serde_json::from_str(text)
            .map_err(|e| EditorError::parse(format!("Project file is not valid JSON: {e}")))?;
        Ok(validate_with(&raw, default_layer_size)?)
    }

    pub fn to_json_pretty(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Validates a raw JSON document into a [`ProjectFile`], using 1920×1080 for layers
/// without a usable size.
pub fn validate(raw: &Value) -> Result<ProjectFile, ValidationError> {
    validate_with(raw, ProjectCanvas::default())
}

/// Like [`validate`] with an explicit fallback layer size.
pub fn validate_with(raw: &Value, default_layer_size: ProjectCanvas) -> Result<ProjectFile, ValidationError> {
    let version = match raw.get("version") {
        None | Some(Value::Null) => return Err(ValidationError::MissingVersion),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    let canvas = raw.get("canvas").ok_or(ValidationError::InvalidCanvas)?;
    let width = canvas.get("width").and_then(Value::as_f64).ok_or(ValidationError::InvalidCanvas)?;
    let height = canvas.get("height").and_then(Value::as_f64).ok_or(ValidationError::InvalidCanvas)?;

    let layers = raw.get("layers").and_then(Value::as_array).ok_or(ValidationError::InvalidLayers)?;
    let presets = raw.get("presets").and_then(Value::as_array).ok_or(ValidationError::InvalidPresets)?;

    if width <= 0.0 || height <= 0.0 {
        return Err(ValidationError::NonPositiveCanvas);
    }
    let max = f64::from(MAX_CANVAS_DIMENSION);
    if width > max || height > max {
        return Err(ValidationError::CanvasTooLarge);
    }

    let canvas = ProjectCanvas::new(width.ceil() as u32, height.ceil() as u32);

    let layers: Vec<ProjectLayer> = layers
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| read_layer(index, entry, default_layer_size))
        .collect();
    let presets: Vec<ProjectPreset> = presets
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| read_preset(index, entry))
        .collect();

    debug!(
        "Validated project v{}: {}x{} canvas, {} layers, {} presets",
        version, canvas.width, canvas.height, layers.len(), presets.len()
    );

    Ok(ProjectFile { version, canvas, layers, presets })
}

/// Accepts any `1.x` version.
pub fn ensure_supported_version(version: &str) -> EditorResult<()> {
    let major = version.trim().split('.').next().and_then(|m| m.parse::<u32>().ok());
    match major {
        Some(1) => Ok(()),
        _ => Err(EditorError::UnsupportedVersion(version.to_string())),
    }
}

// ── Lenient entry readers ──────────────────────────────────────────────────────────

fn read_layer(index: usize, entry: &Value, default_size: ProjectCanvas) -> Option<ProjectLayer> {
    let Some(obj) = entry.as_object() else {
        warn!("Skipping layer entry {index}: not an object");
        return None;
    };

    let file_path = string_field(obj, "file_path").unwrap_or_default();
    let id = string_field(obj, "id").unwrap_or_else(|| {
        debug!("Layer entry {index} has no id, generating one");
        Uuid::new_v4().to_string()
    });
    let name = string_field(obj, "name")
        .or_else(|| file_stem(&file_path))
        .unwrap_or_else(|| format!("Layer {}", index + 1));

    let width = positive_dimension(obj.get("width"));
    let height = positive_dimension(obj.get("height"));
    let (width, height) = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (w, h) => {
            debug!("Layer '{id}' has no usable size, defaulting missing dimensions");
            (w.unwrap_or(default_size.width), h.unwrap_or(default_size.height))
        }
    };

    let is_visible = obj.get("is_visible").and_then(Value::as_bool).unwrap_or(true);
    let z_index = obj
        .get("z_index")
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)))
        .unwrap_or(index as i64);

    Some(ProjectLayer { id, name, file_path, width, height, is_visible, z_index })
}

fn read_preset(index: usize, entry: &Value) -> Option<ProjectPreset> {
    let Some(obj) = entry.as_object() else {
        warn!("Skipping preset entry {index}: not an object");
        return None;
    };

    let id = string_field(obj, "id").unwrap_or_else(|| Uuid::new_v4().to_string());
    let name = string_field(obj, "name").unwrap_or_else(|| format!("Preset {}", index + 1));

    let layer_states = obj.get("layer_states").and_then(|value| {
        let states = value.as_object()?;
        states
            .iter()
            .map(|(layer_id, visible)| visible.as_bool().map(|v| (layer_id.clone(), v)))
            .collect::<Option<LayerStates>>()
    });
    if layer_states.is_none() {
        warn!("Preset '{name}' has a missing or malformed layer_states mapping");
    }

    let created_at = obj.get("created_at").and_then(parse_timestamp).unwrap_or_else(|| {
        debug!("Preset '{name}' has no readable created_at, using now");
        Utc::now()
    });

    Some(ProjectPreset { id, name, layer_states, created_at })
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn positive_dimension(value: Option<&Value>) -> Option<u32> {
    let v = value?.as_f64()?;
    (v.is_finite() && v >= 1.0 && v <= f64::from(u32::MAX)).then(|| v.round() as u32)
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s).ok().map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => Utc.timestamp_millis_opt(n.as_i64()?).single(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn project(canvas: Value) -> Value {
        json!({ "version": "1.0", "canvas": canvas, "layers": [], "presets": [] })
    }

    #[test]
    fn checks_run_in_order() {
        assert_eq!(validate(&json!({})), Err(ValidationError::MissingVersion));
        assert_eq!(validate(&json!({ "version": "1.0" })), Err(ValidationError::InvalidCanvas));
        assert_eq!(
            validate(&json!({ "version": "1.0", "canvas": { "width": "wide", "height": 10 } })),
            Err(ValidationError::InvalidCanvas)
        );
        assert_eq!(
            validate(&json!({ "version": "1.0", "canvas": { "width": 0, "height": 10 }, "layers": {} })),
            Err(ValidationError::InvalidLayers)
        );
        assert_eq!(
            validate(&json!({ "version": "1.0", "canvas": { "width": 0, "height": 10 }, "layers": [] })),
            Err(ValidationError::InvalidPresets)
        );
    }

    #[test]
    fn canvas_bounds() {
        assert_eq!(
            validate(&project(json!({ "width": 0, "height": 1080 }))),
            Err(ValidationError::NonPositiveCanvas)
        );
        assert_eq!(
            validate(&project(json!({ "width": 60000, "height": 1080 }))),
            Err(ValidationError::CanvasTooLarge)
        );
        assert_eq!(
            validate(&project(json!({ "width": -5, "height": 60000 }))),
            Err(ValidationError::NonPositiveCanvas)
        );

        let file = validate(&project(json!({ "width": 1920, "height": 1080 }))).unwrap();
        assert_eq!(file.canvas, ProjectCanvas::new(1920, 1080));
        assert!(validate(&project(json!({ "width": 50000, "height": 50000 }))).is_ok());
    }

    #[test]
    fn layer_defaults_are_filled() {
        let raw = json!({
            "version": "1.0",
            "canvas": { "width": 100, "height": 100 },
            "layers": [
                { "id": "a", "file_path": "assets/hat.png", "width": 0, "height": "tall" },
                { "id": "b", "name": "Body", "file_path": "body.png", "width": 40, "height": 30,
                  "is_visible": false, "z_index": 7 },
                "garbage"
            ],
            "presets": []
        });

        let file = validate_with(&raw, ProjectCanvas::new(640, 480)).unwrap();
        assert_eq!(file.layers.len(), 2);
        assert_eq!(
            file.layers[0],
            ProjectLayer {
                id: "a".into(),
                name: "hat".into(),
                file_path: "assets/hat.png".into(),
                width: 640,
                height: 480,
                is_visible: true,
                z_index: 0,
            }
        );
        assert_eq!(file.layers[1].z_index, 7);
        assert!(!file.layers[1].is_visible);
    }

    #[test]
    fn duplicate_ids_are_tolerated() {
        let raw = json!({
            "version": "1.0",
            "canvas": { "width": 10, "height": 10 },
            "layers": [{ "id": "x", "file_path": "a.png" }, { "id": "x", "file_path": "b.png" }],
            "presets": []
        });
        assert_eq!(validate(&raw).unwrap().layers.len(), 2);
    }

    #[test]
    fn malformed_preset_states_become_absent() {
        let raw = json!({
            "version": "1.0",
            "canvas": { "width": 10, "height": 10 },
            "layers": [],
            "presets": [
                { "id": "p1", "name": "Good", "layer_states": { "a": true, "b": false },
                  "created_at": "2024-03-01T10:00:00Z" },
                { "id": "p2", "name": "Bad", "layer_states": ["a"], "created_at": 1700000000000i64 }
            ]
        });

        let file = validate(&raw).unwrap();
        let good = file.presets[0].layer_states.as_ref().unwrap();
        assert_eq!(good.get("b"), Some(&false));
        assert_eq!(file.presets[1].layer_states, None);
        assert_eq!(file.presets[1].created_at.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn parse_reports_bad_json() {
        let err = ProjectFile::parse("{ not json", ProjectCanvas::default()).unwrap_err();
        assert!(matches!(err, EditorError::Parse(_)));

        let err = ProjectFile::parse(r#"{ "canvas": {} }"#, ProjectCanvas::default()).unwrap_err();
        assert!(matches!(err, EditorError::Validation(ValidationError::MissingVersion)));
    }

    #[test]
    fn serialized_file_validates_again() {
        let mut file = ProjectFile::new_empty(&EditorConfig::default());
        file.layers.push(ProjectLayer {
            id: "l1".into(),
            name: "Sky".into(),
            file_path: "sky.png".into(),
            width: 300,
            height: 200,
            is_visible: false,
            z_index: 3,
        });
        file.presets.push(ProjectPreset {
            id: "p".into(),
            name: "Night".into(),
            layer_states: Some(LayerStates::from([("l1".to_string(), true)])),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        });

        let text = file.to_json_pretty().unwrap();
        assert!(text.contains("\"file_path\""));
        assert!(text.contains("\"layer_states\""));
        assert_eq!(ProjectFile::parse(&text, ProjectCanvas::default()).unwrap(), file);
    }

    #[test]
    fn version_support() {
        assert!(ensure_supported_version("1.0").is_ok());
        assert!(ensure_supported_version("1.3").is_ok());
        assert!(matches!(
            ensure_supported_version("2.0"),
            Err(EditorError::UnsupportedVersion(v)) if v == "2.0"
        ));
    }
}

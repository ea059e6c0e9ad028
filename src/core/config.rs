//! Editor configuration.
//!
//! Plain serde structs with defaults, loaded from JSON. The desktop host persists the same
//! document through the settings store.

use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::core::{ProjectCanvas, MAX_CANVAS_DIMENSION};
use crate::utils::{EditorError, EditorResult, ExportFormat};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Canvas used by "New Project"
    pub default_canvas: ProjectCanvas,
    /// Size assumed for layers whose stored width/height is missing or invalid
    pub default_layer_size: ProjectCanvas,
    pub export: ExportConfig,
    /// Extension suggested when saving a project
    pub project_extension: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_canvas: ProjectCanvas::new(1920, 1080),
            default_layer_size: ProjectCanvas::new(1920, 1080),
            export: ExportConfig::default(),
            project_extension: "json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    /// Format preselected for new export items
    pub default_format: ExportFormat,
    pub default_jpeg_quality: u8,
    /// Pause between bulk-export items; 0 disables it
    pub inter_item_delay_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: ExportFormat::Png,
            default_jpeg_quality: 92,
            inter_item_delay_ms: 50,
        }
    }
}

impl ExportConfig {
    pub fn inter_item_delay(&self) -> Duration {
        Duration::from_millis(self.inter_item_delay_ms)
    }

    /// Quality preselected for an item of `format`
    pub fn default_quality(&self, format: ExportFormat) -> u8 {
        match format {
            ExportFormat::Jpg => self.default_jpeg_quality,
            ExportFormat::Png => format.default_quality(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EditorError::config(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config at `path`; a missing file yields the defaults.
    pub async fn load(path: impl AsRef<Path>) -> EditorResult<Self> {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Self::from_json_str(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate(&self) -> EditorResult<()> {
        for (label, size) in [
            ("defaultCanvas", self.default_canvas),
            ("defaultLayerSize", self.default_layer_size),
        ] {
            if !size.is_valid() {
                return Err(EditorError::config(format!(
                    "{label} must be between 1 and {MAX_CANVAS_DIMENSION} pixels, got {}x{}",
                    size.width, size.height
                )));
            }
        }

        if !ExportFormat::Jpg.validate_quality(self.export.default_jpeg_quality) {
            return Err(EditorError::config(format!(
                "Invalid quality value: {}. Must be between 1 and 100",
                self.export.default_jpeg_quality
            )));
        }

        if self.project_extension.trim().is_empty() {
            return Err(EditorError::config("projectExtension cannot be empty"));
        }

        Ok(())
    }
}

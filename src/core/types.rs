//! Core types shared by the runtime model and the project file.

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest accepted canvas width or height, in pixels.
pub const MAX_CANVAS_DIMENSION: u32 = 50_000;

/// Where a layer's pixels come from, as resolved by an asset resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum SourceRef {
    /// A file on the local filesystem
    Path(String),
    /// An inline `data:image/...;base64,` URI
    DataUri(String),
    /// Stand-in for an asset that could not be resolved; never decodes
    Placeholder { original: String },
}

impl SourceRef {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }
}

/// One image layer as the editor holds it in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Unique within a project (not enforced)
    pub id: String,
    /// Display name
    pub name: String,
    /// Resolved pixel source
    pub source_reference: SourceRef,
    /// Path persisted in the project file, used to re-resolve on reload
    pub original_file_path: String,
    /// Native pixel width of the layer image
    pub width: u32,
    /// Native pixel height of the layer image
    pub height: u32,
    pub is_visible: bool,
    /// Paint order key, lower paints first
    pub z_index: i64,
}

/// Output canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCanvas {
    pub width: u32,
    pub height: u32,
}

impl ProjectCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are in `1..=MAX_CANVAS_DIMENSION`.
    pub fn is_valid(&self) -> bool {
        let range = 1..=MAX_CANVAS_DIMENSION;
        range.contains(&self.width) && range.contains(&self.height)
    }
}

impl Default for ProjectCanvas {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

/// Per-layer visibility snapshot keyed by layer id.
pub type LayerStates = BTreeMap<String, bool>;

/// A named snapshot of layer visibility.
///
/// `layer_states` is `None` when the project file carried a missing or malformed mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerPreset {
    pub id: String,
    pub name: String,
    pub layer_states: Option<LayerStates>,
    pub created_at: DateTime<Utc>,
}

/// Fill used for the canvas before any layer is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Transparent,
    White,
}

//! Translation between the on-disk project records and the runtime model.
//!
//! This is the only place where snake_case project fields meet the runtime types.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::{Layer, LayerPreset, ProjectCanvas, SourceRef};
use crate::project::schema::{ProjectFile, ProjectLayer, ProjectPreset, CURRENT_VERSION};
use crate::utils::AssetResolutionError;

/// What a resolver knows about the project being loaded.
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// Directory of the project file, for relative layer paths
    pub project_dir: Option<PathBuf>,
}

impl ResolveContext {
    pub fn for_project_file(location: Option<&str>) -> Self {
        let project_dir = location
            .map(Path::new)
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf);
        Self { project_dir }
    }
}

/// Turns a persisted `file_path` into something the decoder can read.
pub trait AssetResolver: Send + Sync {
    fn resolve(&self, file_path: &str, ctx: &ResolveContext) -> Result<SourceRef, AssetResolutionError>;
}

/// Uses the stored path as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl AssetResolver for IdentityResolver {
    fn resolve(&self, file_path: &str, _ctx: &ResolveContext) -> Result<SourceRef, AssetResolutionError> {
        Ok(SourceRef::Path(file_path.to_string()))
    }
}

/// Resolves against the local filesystem, relative to the project directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsResolver;

impl AssetResolver for FsResolver {
    fn resolve(&self, file_path: &str, ctx: &ResolveContext) -> Result<SourceRef, AssetResolutionError> {
        if file_path.starts_with("data:") {
            return Ok(SourceRef::DataUri(file_path.to_string()));
        }
        if file_path.trim().is_empty() {
            return Err(AssetResolutionError::new(file_path, "layer has no file path"));
        }

        let path = Path::new(file_path);
        let full = match &ctx.project_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        };

        if !full.is_file() {
            return Err(AssetResolutionError::new(
                file_path,
                format!("file does not exist: {}", full.display()),
            ));
        }

        Ok(SourceRef::Path(full.to_string_lossy().to_string()))
    }
}

/// Result of converting project layers, including the assets that fell back to
/// placeholders.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    pub layers: Vec<Layer>,
    pub asset_failures: Vec<AssetResolutionError>,
}

/// Converts project layers into runtime layers, sorted by `z_index` (stable).
///
/// A layer whose asset cannot be resolved keeps its place with a
/// [`SourceRef::Placeholder`] source.
pub fn to_runtime(
    project_layers: &[ProjectLayer],
    resolver: &impl AssetResolver,
    ctx: &ResolveContext,
) -> Conversion {
    let mut sorted: Vec<&ProjectLayer> = project_layers.iter().collect();
    sorted.sort_by_key(|layer| layer.z_index);

    let mut conversion = Conversion::default();
    for layer in sorted {
        let source_reference = match resolver.resolve(&layer.file_path, ctx) {
            Ok(source) => source,
            Err(e) => {
                warn!("Layer '{}' uses a placeholder: {}", layer.name, e);
                conversion.asset_failures.push(e);
                SourceRef::Placeholder { original: layer.file_path.clone() }
            }
        };

        conversion.layers.push(Layer {
            id: layer.id.clone(),
            name: layer.name.clone(),
            source_reference,
            original_file_path: layer.file_path.clone(),
            width: layer.width,
            height: layer.height,
            is_visible: layer.is_visible,
            z_index: layer.z_index,
        });
    }

    debug!(
        "Converted {} layers ({} placeholders)",
        conversion.layers.len(),
        conversion.asset_failures.len()
    );
    conversion
}

/// Converts runtime layers back to project records, keeping the caller's order.
pub fn to_project(layers: &[Layer]) -> Vec<ProjectLayer> {
    layers
        .iter()
        .map(|layer| ProjectLayer {
            id: layer.id.clone(),
            name: layer.name.clone(),
            file_path: layer.original_file_path.clone(),
            width: layer.width,
            height: layer.height,
            is_visible: layer.is_visible,
            z_index: layer.z_index,
        })
        .collect()
}

pub fn presets_to_runtime(presets: &[ProjectPreset]) -> Vec<LayerPreset> {
    presets
        .iter()
        .map(|preset| LayerPreset {
            id: preset.id.clone(),
            name: preset.name.clone(),
            layer_states: preset.layer_states.clone(),
            created_at: preset.created_at,
        })
        .collect()
}

pub fn presets_to_project(presets: &[LayerPreset]) -> Vec<ProjectPreset> {
    presets
        .iter()
        .map(|preset| ProjectPreset {
            id: preset.id.clone(),
            name: preset.name.clone(),
            layer_states: preset.layer_states.clone(),
            created_at: preset.created_at,
        })
        .collect()
}

impl ProjectFile {
    /// Builds a fresh project file from the in-memory state.
    pub fn from_runtime(canvas: ProjectCanvas, layers: &[Layer], presets: &[LayerPreset]) -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            canvas,
            layers: to_project(layers),
            presets: presets_to_project(presets),
        }
    }
}

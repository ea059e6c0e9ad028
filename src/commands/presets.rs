//! Tauri command handlers for presets.
//!
//! Presets live in the frontend; these commands take the current list and return the
//! result, so every rule (name trimming, stale ids, summaries) is applied in one place.

use tauri::State;

use crate::core::{AppState, Layer, LayerPreset};
use crate::processing::ExportItem;
use crate::project::presets::{self, PresetStore, PresetSummary};
use crate::utils::EditorResult;

/// Captures the current layer visibility as a new preset, returning the updated list.
#[tauri::command]
pub fn save_preset(
    presets: Vec<LayerPreset>,
    name: String,
    layers: Vec<Layer>,
) -> EditorResult<Vec<LayerPreset>> {
    let mut store = PresetStore::new(presets);
    store.save(&name, &layers)?;
    Ok(store.into_vec())
}

/// Layers with the preset's visibility applied.
#[tauri::command]
pub fn apply_preset(preset: LayerPreset, layers: Vec<Layer>) -> Vec<Layer> {
    presets::apply(&preset, &layers)
}

#[tauri::command]
pub fn preset_summaries(presets: Vec<LayerPreset>) -> Vec<PresetSummary> {
    presets.iter().map(presets::summary).collect()
}

/// Initial bulk-export queue for the given presets.
#[tauri::command]
pub async fn export_items(
    state: State<'_, AppState>,
    presets: Vec<LayerPreset>,
) -> EditorResult<Vec<ExportItem>> {
    let manager = state.manager().lock().await;
    Ok(crate::processing::export_items(&presets, &manager.config().export))
}

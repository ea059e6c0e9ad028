//! Named visibility presets over the current layer set.

use std::collections::HashMap;
use chrono::Utc;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::core::{Layer, LayerPreset, LayerStates};
use crate::utils::{EditorError, EditorResult};

/// Ordered collection of presets, owned by the host application.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetStore {
    presets: Vec<LayerPreset>,
}

/// Visible/total counts of a preset, for list display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PresetSummary {
    #[serde(rename_all = "camelCase")]
    Valid { visible_count: usize, total_count: usize },
    /// The preset's layer states were missing or malformed
    Invalid,
}

impl PresetStore {
    pub fn new(presets: Vec<LayerPreset>) -> Self {
        Self { presets }
    }

    pub fn presets(&self) -> &[LayerPreset] {
        &self.presets
    }

    pub fn into_vec(self) -> Vec<LayerPreset> {
        self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LayerPreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Captures the visibility of every layer under `name` and appends the preset.
    pub fn save(&mut self, name: &str, layers: &[Layer]) -> EditorResult<LayerPreset> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EditorError::EmptyName);
        }

        let layer_states: LayerStates = layers
            .iter()
            .map(|layer| (layer.id.clone(), layer.is_visible))
            .collect();

        let preset = LayerPreset {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            layer_states: Some(layer_states),
            created_at: Utc::now(),
        };

        debug!("Saved preset '{}' over {} layers", preset.name, layers.len());
        self.presets.push(preset.clone());
        Ok(preset)
    }

    pub fn rename(&mut self, id: &str, name: &str) -> EditorResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EditorError::EmptyName);
        }
        let preset = self
            .presets
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| EditorError::PresetNotFound(id.to_string()))?;
        preset.name = name.to_string();
        Ok(())
    }

    /// Removes the preset, returning whether it existed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.presets.len();
        self.presets.retain(|p| p.id != id);
        before != self.presets.len()
    }

    /// Moves `dragged_id` to the position currently held by `target_id`.
    pub fn reorder(&mut self, dragged_id: &str, target_id: &str) {
        move_to_target(&mut self.presets, |p| p.id.as_str(), dragged_id, target_id);
    }
}

/// Returns a copy of `layers` with visibility taken from the preset where it has an entry.
///
/// Ids in the preset that match no layer are ignored. A preset without layer states
/// leaves everything unchanged.
pub fn apply(preset: &LayerPreset, layers: &[Layer]) -> Vec<Layer> {
    let Some(states) = &preset.layer_states else {
        return layers.to_vec();
    };

    layers
        .iter()
        .map(|layer| {
            let mut layer = layer.clone();
            if let Some(&visible) = states.get(&layer.id) {
                layer.is_visible = visible;
            }
            layer
        })
        .collect()
}

/// Visibility of every layer after applying `preset`, as a compositor override.
///
/// Keyed by id, so layers sharing an id collapse to the last one. Export renders the
/// result of [`apply`] instead.
pub fn effective_visibility(preset: &LayerPreset, layers: &[Layer]) -> HashMap<String, bool> {
    apply(preset, layers)
        .into_iter()
        .map(|layer| (layer.id, layer.is_visible))
        .collect()
}

pub fn summary(preset: &LayerPreset) -> PresetSummary {
    match &preset.layer_states {
        Some(states) => PresetSummary::Valid {
            visible_count: states.values().filter(|v| **v).count(),
            total_count: states.len(),
        },
        None => PresetSummary::Invalid,
    }
}

/// Moves the item with `dragged` id to the index of the item with `target` id.
///
/// No-op when either is absent or both are the same.
pub(crate) fn move_to_target<T>(
    items: &mut Vec<T>,
    id_of: impl Fn(&T) -> &str,
    dragged: &str,
    target: &str,
) {
    if dragged == target {
        return;
    }
    let from = items.iter().position(|item| id_of(item) == dragged);
    let to = items.iter().position(|item| id_of(item) == target);
    if let (Some(from), Some(to)) = (from, to) {
        let item = items.remove(from);
        items.insert(to, item);
    }
}

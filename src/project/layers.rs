//! Edits to the layer stack triggered by the layer list UI.

use tracing::debug;
use uuid::Uuid;

use crate::core::{Layer, SourceRef};
use crate::project::presets::move_to_target;

/// Input for [`add_layer`].
#[derive(Debug, Clone)]
pub struct NewLayer {
    pub name: String,
    pub file_path: String,
    pub source: SourceRef,
    pub width: u32,
    pub height: u32,
}

/// Appends a visible layer on top of the stack and returns it.
pub fn add_layer(layers: &mut Vec<Layer>, new: NewLayer) -> Layer {
    let z_index = layers.iter().map(|l| l.z_index).max().map_or(0, |z| z + 1);
    let layer = Layer {
        id: Uuid::new_v4().to_string(),
        name: new.name,
        source_reference: new.source,
        original_file_path: new.file_path,
        width: new.width.max(1),
        height: new.height.max(1),
        is_visible: true,
        z_index,
    };
    debug!("Added layer '{}' at z {}", layer.name, z_index);
    layers.push(layer.clone());
    layer
}

/// Removes the first layer with `id`. Presets that mention it are left alone.
pub fn remove_layer(layers: &mut Vec<Layer>, id: &str) -> Option<Layer> {
    let index = layers.iter().position(|l| l.id == id)?;
    Some(layers.remove(index))
}

/// Flips visibility of the layer and returns the new value.
pub fn toggle_visibility(layers: &mut [Layer], id: &str) -> Option<bool> {
    let layer = layers.iter_mut().find(|l| l.id == id)?;
    layer.is_visible = !layer.is_visible;
    Some(layer.is_visible)
}

/// Stable ascending copy by `z_index`.
pub fn sorted_by_z(layers: &[Layer]) -> Vec<Layer> {
    let mut sorted = layers.to_vec();
    sorted.sort_by_key(|l| l.z_index);
    sorted
}

/// Moves `dragged_id` to the stack position of `target_id` and renumbers `z_index`
/// to `0..n` in the new order.
pub fn move_layer(layers: &mut Vec<Layer>, dragged_id: &str, target_id: &str) {
    let mut sorted = sorted_by_z(layers);
    move_to_target(&mut sorted, |l| l.id.as_str(), dragged_id, target_id);
    for (z, layer) in sorted.iter_mut().enumerate() {
        layer.z_index = z as i64;
    }
    *layers = sorted;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn new_layer(name: &str) -> NewLayer {
        NewLayer {
            name: name.into(),
            file_path: format!("{name}.png"),
            source: SourceRef::Path(format!("{name}.png")),
            width: 64,
            height: 32,
        }
    }

    fn names(layers: &[Layer]) -> Vec<String> {
        layers.iter().map(|l| l.name.clone()).collect()
    }

    #[test]
    fn add_stacks_on_top() {
        let mut layers = Vec::new();
        let a = add_layer(&mut layers, new_layer("a"));
        layers[0].z_index = 10;
        let b = add_layer(&mut layers, new_layer("b"));

        assert_eq!(a.z_index, 0);
        assert_eq!(b.z_index, 11);
        assert!(b.is_visible);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn toggle_and_remove() {
        let mut layers = Vec::new();
        let a = add_layer(&mut layers, new_layer("a"));
        assert_eq!(toggle_visibility(&mut layers, &a.id), Some(false));
        assert_eq!(toggle_visibility(&mut layers, "missing"), None);
        assert_eq!(remove_layer(&mut layers, &a.id).map(|l| l.name), Some("a".to_string()));
        assert!(layers.is_empty());
    }

    #[test]
    fn move_renumbers_in_paint_order() {
        let mut layers = Vec::new();
        for name in ["a", "b", "c"] {
            add_layer(&mut layers, new_layer(name));
        }
        let (a, c) = (layers[0].id.clone(), layers[2].id.clone());

        move_layer(&mut layers, &c, &a);
        assert_eq!(names(&layers), ["c", "a", "b"]);
        let z: Vec<i64> = layers.iter().map(|l| l.z_index).collect();
        assert_eq!(z, [0, 1, 2]);
    }
}

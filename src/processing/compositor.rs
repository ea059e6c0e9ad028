//! Layer compositing.
//!
//! A composite runs in two phases. *Gather*: every selected layer is decoded and scaled on
//! its own blocking task, all at once. *Apply*: the tasks are joined in paint order and
//! each result is blended onto the canvas as soon as it and every layer below it have
//! settled, so a slow decode can delay painting but never reorder it. The call returns
//! only after every decode task has finished.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::{Background, Layer, ProjectCanvas, MAX_CANVAS_DIMENSION};
use crate::processing::decode::ImageDecoder;
use crate::utils::{DecodeError, EditorError, EditorResult};

/// A layer that was skipped because it could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerFailure {
    pub layer_id: String,
    pub layer_name: String,
    pub error: DecodeError,
}

/// Result of one composite: the canvas plus what went into it.
#[derive(Debug, Clone)]
pub struct CompositeOutcome {
    pub image: RgbaImage,
    /// Ids of painted layers, in paint order
    pub painted: Vec<String>,
    pub failures: Vec<LayerFailure>,
}

/// Where a layer lands on the canvas after aspect-fit scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub width: u32,
    pub height: u32,
    pub x: i64,
    pub y: i64,
}

/// Anything that can composite a layer snapshot onto a canvas.
pub trait Renderer: Send + Sync {
    /// `visibility`, when given, decides which layers are drawn instead of `is_visible`.
    fn render(
        &self,
        layers: &[Layer],
        canvas: ProjectCanvas,
        visibility: Option<&HashMap<String, bool>>,
        background: Background,
    ) -> impl Future<Output = EditorResult<CompositeOutcome>> + Send;
}

/// Compositor backed by an [`ImageDecoder`].
pub struct Compositor<D> {
    decoder: Arc<D>,
}

impl<D> Clone for Compositor<D> {
    fn clone(&self) -> Self {
        Self { decoder: Arc::clone(&self.decoder) }
    }
}

impl<D: ImageDecoder> Compositor<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder: Arc::new(decoder) }
    }

    pub async fn composite(
        &self,
        layers: &[Layer],
        canvas: ProjectCanvas,
        visibility: Option<&HashMap<String, bool>>,
        background: Background,
    ) -> EditorResult<CompositeOutcome> {
        if !canvas.is_valid() {
            return Err(EditorError::composite(format!(
                "Canvas {}x{} is outside 1..={MAX_CANVAS_DIMENSION}",
                canvas.width, canvas.height
            )));
        }

        let selected = select_layers(layers, visibility);
        let mut image = blank_canvas(canvas, background);
        let mut painted = Vec::with_capacity(selected.len());
        let mut failures = Vec::new();

        if selected.is_empty() {
            debug!("No layers to draw, returning blank {}x{} canvas", canvas.width, canvas.height);
            return Ok(CompositeOutcome { image, painted, failures });
        }

        debug!("Compositing {} layers onto {}x{}", selected.len(), canvas.width, canvas.height);

        // Gather: start every decode before waiting on any of them.
        let pending: Vec<_> = selected
            .iter()
            .map(|layer| {
                let decoder = Arc::clone(&self.decoder);
                let source = layer.source_reference.clone();
                let placement = fit_within(layer.width, layer.height, canvas);
                tokio::task::spawn_blocking(move || {
                    decoder
                        .decode(&source)
                        .map(|pixels| scale_to(pixels, placement))
                })
            })
            .collect();

        // Apply: join in paint order.
        let mut jobs = selected.iter().zip(pending);
        while let Some((layer, handle)) = jobs.next() {
            let decoded = handle
                .await
                .unwrap_or_else(|e| Err(DecodeError::Task(e.to_string())));

            match decoded {
                Ok(scaled) => {
                    let placement = fit_within(layer.width, layer.height, canvas);
                    let blended = tokio::task::spawn_blocking(move || {
                        imageops::overlay(&mut image, &scaled, placement.x, placement.y);
                        image
                    })
                    .await;
                    image = match blended {
                        Ok(image) => image,
                        Err(e) => {
                            settle(jobs.by_ref().map(|(_, handle)| handle).collect::<Vec<_>>()).await;
                            return Err(EditorError::composite(format!("Paint task failed: {e}")));
                        }
                    };
                    debug!("Painted layer '{}' (z {})", layer.name, layer.z_index);
                    painted.push(layer.id.clone());
                }
                Err(error) => {
                    warn!("Skipping layer '{}': {}", layer.name, error);
                    failures.push(LayerFailure {
                        layer_id: layer.id.clone(),
                        layer_name: layer.name.clone(),
                        error,
                    });
                }
            }
        }

        Ok(CompositeOutcome { image, painted, failures })
    }
}

impl<D: ImageDecoder> Renderer for Compositor<D> {
    fn render(
        &self,
        layers: &[Layer],
        canvas: ProjectCanvas,
        visibility: Option<&HashMap<String, bool>>,
        background: Background,
    ) -> impl Future<Output = EditorResult<CompositeOutcome>> + Send {
        self.composite(layers, canvas, visibility, background)
    }
}

/// Waits out every remaining decode, so none is still running once a composite returns.
async fn settle<T>(handles: impl IntoIterator<Item = JoinHandle<T>>) {
    for handle in handles {
        let _ = handle.await;
    }
}

/// Layers to draw, as an owned snapshot in stable ascending `z_index` order.
pub fn select_layers(layers: &[Layer], visibility: Option<&HashMap<String, bool>>) -> Vec<Layer> {
    let mut selected: Vec<Layer> = layers
        .iter()
        .filter(|layer| match visibility {
            Some(map) => map.get(&layer.id).copied().unwrap_or(false),
            None => layer.is_visible,
        })
        .cloned()
        .collect();
    selected.sort_by_key(|layer| layer.z_index);
    selected
}

/// Scales `width × height` to fit inside the canvas, keeping aspect ratio, centered.
pub fn fit_within(width: u32, height: u32, canvas: ProjectCanvas) -> Placement {
    let (lw, lh) = (f64::from(width.max(1)), f64::from(height.max(1)));
    let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
    let scale = (cw / lw).min(ch / lh);

    let scaled_w = ((lw * scale).round() as u32).clamp(1, canvas.width);
    let scaled_h = ((lh * scale).round() as u32).clamp(1, canvas.height);

    Placement {
        width: scaled_w,
        height: scaled_h,
        x: (i64::from(canvas.width) - i64::from(scaled_w)) / 2,
        y: (i64::from(canvas.height) - i64::from(scaled_h)) / 2,
    }
}

fn scale_to(pixels: RgbaImage, placement: Placement) -> RgbaImage {
    if pixels.dimensions() == (placement.width, placement.height) {
        pixels
    } else {
        imageops::resize(&pixels, placement.width, placement.height, FilterType::Triangle)
    }
}

fn blank_canvas(canvas: ProjectCanvas, background: Background) -> RgbaImage {
    let fill = match background {
        Background::White => Rgba([255, 255, 255, 255]),
        Background::Transparent => Rgba([0, 0, 0, 0]),
    };
    RgbaImage::from_pixel(canvas.width, canvas.height, fill)
}

//! Core application types and state management.
//!
//! This module contains the fundamental types used throughout the application:
//! - [`Layer`], [`LayerPreset`], [`ProjectCanvas`]: the runtime editing model
//! - [`EditorConfig`]: defaults for new projects and exports
//! - [`ExportProgress`]: progress tracking for bulk exports
//! - `AppState`: application state managed by Tauri (`desktop` feature)

mod config;
mod progress;
#[cfg(feature = "desktop")]
mod state;
mod types;

pub use config::{EditorConfig, ExportConfig};
pub use progress::{ExportProgress, ProgressType};
#[cfg(feature = "desktop")]
pub use state::AppState;
pub use types::{Background, Layer, LayerPreset, LayerStates, MAX_CANVAS_DIMENSION, ProjectCanvas, SourceRef};

// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod project;
pub mod processing;
pub mod sink;
pub mod tasks;
#[cfg(feature = "desktop")]
pub mod commands;
#[cfg(feature = "desktop")]
pub mod app;

// Public exports for external consumers
pub use core::{EditorConfig, ExportProgress, Layer, LayerPreset, ProjectCanvas, SourceRef};
pub use processing::{Compositor, ExportItem, ExportOrchestrator, ExportReport, SourceDecoder};
pub use project::{FsResolver, PresetStore, ProjectFile};
pub use sink::{DirectorySink, MemorySink, PlatformSink};
pub use tasks::{TaskContext, TaskKind, TaskManager, TaskOutcome, TaskRequest};
pub use utils::{EditorError, EditorResult};
#[cfg(feature = "desktop")]
pub use app::run;

// The desktop entry point lives in main.rs; everything else is usable headless.

//! Image processing: decoding layer sources, compositing, encoding and export.

pub mod compositor;
pub mod decode;
pub mod encode;
pub mod export;

pub use compositor::{CompositeOutcome, Compositor, LayerFailure, Placement, Renderer};
pub use decode::{ImageDecoder, SourceDecoder};
pub use export::{ExportItem, ExportItemReport, ExportOrchestrator, ExportReport, ItemStatus, export_items};

//! Single and bulk export.
//!
//! Bulk export walks the queue strictly one item at a time: each item composites a transient
//! copy of the layers with its preset applied, is encoded, and is written through the sink
//! before the next one starts. A failing item is recorded and the walk continues.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::{Background, ExportConfig, ExportProgress, Layer, LayerPreset, ProgressType, ProjectCanvas};
use crate::processing::compositor::Renderer;
use crate::processing::encode::encode_blocking;
use crate::project::presets;
use crate::sink::{PlatformSink, WriteReceipt, WriteRequest};
use crate::utils::{effective_quality, sanitize_file_stem, EditorResult, ExportFormat};

/// One row of the bulk-export queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportItem {
    pub id: String,
    /// Output file stem
    pub name: String,
    pub preset: LayerPreset,
    pub format: ExportFormat,
    /// 1-100, only meaningful for jpg
    pub quality: u8,
    pub enabled: bool,
}

impl ExportItem {
    /// Queue row for `preset` with the configured default format and quality.
    pub fn from_preset(preset: &LayerPreset, config: &ExportConfig) -> Self {
        Self {
            id: preset.id.clone(),
            name: preset.name.clone(),
            preset: preset.clone(),
            format: config.default_format,
            quality: config.default_quality(config.default_format),
            enabled: true,
        }
    }
}

/// Builds the initial export queue, one enabled item per preset.
pub fn export_items(presets: &[LayerPreset], config: &ExportConfig) -> Vec<ExportItem> {
    presets.iter().map(|p| ExportItem::from_preset(p, config)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ItemStatus {
    Succeeded { location: Option<String> },
    Failed { error: String },
}

/// What happened to one enabled item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportItemReport {
    pub id: String,
    pub name: String,
    pub format: ExportFormat,
    #[serde(flatten)]
    pub status: ItemStatus,
    /// Layers that could not be decoded and were left out of the image
    pub skipped_layers: Vec<String>,
}

impl ExportItemReport {
    pub fn is_success(&self) -> bool {
        matches!(self.status, ItemStatus::Succeeded { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    /// Enabled items in queue order
    pub items: Vec<ExportItemReport>,
    pub enabled_count: usize,
}

impl ExportReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }
}

/// Background a format composites onto.
fn background_for(format: ExportFormat) -> Background {
    if format.supports_transparency() {
        Background::Transparent
    } else {
        Background::White
    }
}

pub struct ExportOrchestrator<'a, R, S> {
    renderer: &'a R,
    sink: &'a S,
    config: &'a ExportConfig,
    directory: Option<String>,
}

impl<'a, R: Renderer, S: PlatformSink> ExportOrchestrator<'a, R, S> {
    pub fn new(renderer: &'a R, sink: &'a S, config: &'a ExportConfig) -> Self {
        Self { renderer, sink, config, directory: None }
    }

    /// Folder every bulk item is written into, as chosen through
    /// [`PlatformSink::batch_directory`].
    pub fn in_directory(mut self, directory: Option<String>) -> Self {
        self.directory = directory;
        self
    }

    /// Composites the visible layers and writes them as one file.
    pub async fn export_one(
        &self,
        layers: &[Layer],
        canvas: ProjectCanvas,
        format: ExportFormat,
        quality: Option<u8>,
        filename: &str,
    ) -> EditorResult<WriteReceipt> {
        let quality = effective_quality(format, quality);
        info!("Exporting '{}' as {} (quality {})", filename, format, quality);

        let outcome = self.renderer.render(layers, canvas, None, background_for(format)).await?;
        for failure in &outcome.failures {
            warn!("Layer '{}' left out of export: {}", failure.layer_name, failure.error);
        }

        let bytes = encode_blocking(outcome.image, format, quality).await?;
        let stem = sanitize_file_stem(filename, "export");
        self.sink
            .write(bytes, WriteRequest::new(stem, format.primary_extension()))
            .await
    }

    /// Exports every enabled item in order, reporting progress before each one.
    pub async fn export_many(
        &self,
        items: &[ExportItem],
        layers: &[Layer],
        canvas: ProjectCanvas,
        on_progress: impl Fn(&ExportProgress) + Send + Sync,
    ) -> ExportReport {
        let enabled: Vec<&ExportItem> = items.iter().filter(|i| i.enabled).collect();
        let total = enabled.len();
        info!("Starting bulk export of {} items ({} disabled)", total, items.len() - total);

        on_progress(&ExportProgress::new(ProgressType::Start, 0, total, "Starting export"));

        let mut report = ExportReport {
            items: Vec::with_capacity(total),
            enabled_count: total,
        };

        for (index, item) in enabled.iter().enumerate() {
            if index > 0 && self.config.inter_item_delay_ms > 0 {
                tokio::time::sleep(self.config.inter_item_delay()).await;
            }

            on_progress(
                &ExportProgress::new(ProgressType::Progress, index, total, &format!("Exporting {}", item.name))
                    .with_current_item(&item.name),
            );

            let (status, skipped_layers) = match self.export_item(item, layers, canvas).await {
                Ok((receipt, skipped)) => {
                    debug!("Exported '{}' to {:?}", item.name, receipt.location);
                    (ItemStatus::Succeeded { location: receipt.location }, skipped)
                }
                Err(e) => {
                    warn!("Export of '{}' failed: {}", item.name, e);
                    on_progress(
                        &ExportProgress::new(ProgressType::Error, index + 1, total, &format!("Failed to export {}", item.name))
                            .with_current_item(&item.name)
                            .with_error(e.to_string()),
                    );
                    (ItemStatus::Failed { error: e.to_string() }, Vec::new())
                }
            };

            report.items.push(ExportItemReport {
                id: item.id.clone(),
                name: item.name.clone(),
                format: item.format,
                status,
                skipped_layers,
            });
        }

        info!(
            "Bulk export finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        on_progress(&ExportProgress::new(ProgressType::Complete, total, total, "Export complete"));
        report
    }

    async fn export_item(
        &self,
        item: &ExportItem,
        layers: &[Layer],
        canvas: ProjectCanvas,
    ) -> EditorResult<(WriteReceipt, Vec<String>)> {
        // Visibility is applied per layer, so duplicate ids keep their own result.
        let staged = presets::apply(&item.preset, layers);
        let outcome = self
            .renderer
            .render(&staged, canvas, None, background_for(item.format))
            .await?;

        let quality = effective_quality(item.format, Some(item.quality));
        let bytes = encode_blocking(outcome.image, item.format, quality).await?;
        let stem = sanitize_file_stem(&item.name, "export");
        let request = WriteRequest::new(stem, item.format.primary_extension()).in_directory(self.directory.clone());
        let receipt = self.sink.write(bytes, request).await?;

        let skipped = outcome.failures.into_iter().map(|f| f.layer_id).collect();
        Ok((receipt, skipped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::future::Future;
    use std::sync::Mutex;
    use chrono::Utc;
    use image::{Rgba, RgbaImage};
    use pretty_assertions::assert_eq;

    use crate::core::SourceRef;
    use crate::processing::compositor::CompositeOutcome;
    use crate::sink::MemorySink;
    use crate::utils::EditorError;

    /// Renders a 2x2 canvas and records the names of the layers each call would draw.
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<(Vec<String>, Background)>>,
        fail_when_drawing: Option<String>,
    }

    impl Renderer for RecordingRenderer {
        fn render(
            &self,
            layers: &[Layer],
            _canvas: ProjectCanvas,
            visibility: Option<&HashMap<String, bool>>,
            background: Background,
        ) -> impl Future<Output = EditorResult<CompositeOutcome>> + Send {
            let selected = crate::processing::compositor::select_layers(layers, visibility);
            let drawn: Vec<String> = selected.iter().map(|l| l.id.clone()).collect();
            let names: Vec<String> = selected.into_iter().map(|l| l.name).collect();
            let failed = self
                .fail_when_drawing
                .as_ref()
                .is_some_and(|id| drawn.contains(id));
            self.calls.lock().unwrap().push((names, background));

            async move {
                if failed {
                    return Err(EditorError::composite("renderer blew up"));
                }
                Ok(CompositeOutcome {
                    image: RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255])),
                    painted: drawn,
                    failures: Vec::new(),
                })
            }
        }
    }

    fn layer(id: &str, z_index: i64) -> Layer {
        Layer {
            id: id.into(),
            name: id.into(),
            source_reference: SourceRef::Path(format!("{id}.png")),
            original_file_path: format!("{id}.png"),
            width: 2,
            height: 2,
            is_visible: true,
            z_index,
        }
    }

    fn preset(name: &str, visible: &[&str]) -> LayerPreset {
        let states: BTreeMap<String, bool> = ["a", "b", "c"]
            .iter()
            .map(|id| (id.to_string(), visible.contains(id)))
            .collect();
        LayerPreset {
            id: format!("preset-{name}"),
            name: name.into(),
            layer_states: Some(states),
            created_at: Utc::now(),
        }
    }

    fn no_delay() -> ExportConfig {
        ExportConfig { inter_item_delay_ms: 0, ..ExportConfig::default() }
    }

    fn item(name: &str, visible: &[&str], format: ExportFormat) -> ExportItem {
        let config = no_delay();
        ExportItem {
            format,
            quality: 80,
            ..ExportItem::from_preset(&preset(name, visible), &config)
        }
    }

    #[tokio::test]
    async fn failing_middle_item_does_not_stop_the_rest() {
        let renderer = RecordingRenderer::default();
        let sink = MemorySink::new().fail_writes_named("Second");
        let config = no_delay();
        let orchestrator = ExportOrchestrator::new(&renderer, &sink, &config);

        let layers = vec![layer("a", 0), layer("b", 1), layer("c", 2)];
        let items = vec![
            item("First", &["a"], ExportFormat::Png),
            item("Second", &["b"], ExportFormat::Png),
            item("Third", &["a", "c"], ExportFormat::Jpg),
        ];

        let events = Mutex::new(Vec::new());
        let report = orchestrator
            .export_many(&items, &layers, ProjectCanvas::new(2, 2), |p| {
                events.lock().unwrap().push(p.clone())
            })
            .await;

        assert_eq!(report.enabled_count, 3);
        assert_eq!((report.succeeded(), report.failed()), (2, 1));
        assert!(matches!(report.items[1].status, ItemStatus::Failed { .. }));
        assert_eq!(sink.written_names(), ["First.png", "Third.jpg"]);

        let calls = renderer.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            [
                (vec!["a".to_string()], Background::Transparent),
                (vec!["b".to_string()], Background::Transparent),
                (vec!["a".to_string(), "c".to_string()], Background::White),
            ]
        );

        let events = events.into_inner().unwrap();
        let kinds: Vec<_> = events.iter().map(|e| e.progress_type).collect();
        assert_eq!(
            kinds,
            [
                ProgressType::Start,
                ProgressType::Progress,
                ProgressType::Progress,
                ProgressType::Error,
                ProgressType::Progress,
                ProgressType::Complete,
            ]
        );
        assert_eq!(events[2].current_item.as_deref(), Some("Second"));
        assert_eq!(events[2].completed_items, 1);
        let last = events.last().unwrap();
        assert_eq!((last.completed_items, last.total_items, last.progress_percentage), (3, 3, 100));
    }

    #[tokio::test]
    async fn render_failure_is_recorded_per_item() {
        let renderer = RecordingRenderer {
            fail_when_drawing: Some("b".into()),
            ..Default::default()
        };
        let sink = MemorySink::new();
        let config = no_delay();
        let orchestrator = ExportOrchestrator::new(&renderer, &sink, &config);

        let layers = vec![layer("a", 0), layer("b", 1)];
        let items = vec![
            item("one", &["a"], ExportFormat::Png),
            item("two", &["b"], ExportFormat::Png),
            item("three", &["a"], ExportFormat::Jpg),
        ];

        let last = Mutex::new(None);
        let report = orchestrator
            .export_many(&items, &layers, ProjectCanvas::new(2, 2), |p| {
                *last.lock().unwrap() = Some(p.clone())
            })
            .await;
        assert!(report.items[0].is_success());
        assert_eq!(
            report.items[1].status,
            ItemStatus::Failed { error: "Composite error: renderer blew up".into() }
        );
        assert!(report.items[2].is_success());
        assert_eq!(sink.written_names(), ["one.png", "three.jpg"]);
        assert_eq!(last.into_inner().unwrap().map(|p| p.progress_percentage), Some(100));
    }

    #[tokio::test]
    async fn disabled_items_are_skipped_and_empty_queue_completes() {
        let renderer = RecordingRenderer::default();
        let sink = MemorySink::new();
        let config = no_delay();
        let orchestrator = ExportOrchestrator::new(&renderer, &sink, &config);

        let mut off = item("off", &["a"], ExportFormat::Png);
        off.enabled = false;
        let events = Mutex::new(Vec::new());
        let report = orchestrator
            .export_many(&[off], &[layer("a", 0)], ProjectCanvas::new(2, 2), |p| {
                events.lock().unwrap().push(p.progress_type)
            })
            .await;

        assert_eq!(report, ExportReport::default());
        assert!(sink.written().is_empty());
        assert_eq!(events.into_inner().unwrap(), [ProgressType::Start, ProgressType::Complete]);
    }

    #[tokio::test]
    async fn quick_export_uses_current_visibility() {
        let renderer = RecordingRenderer::default();
        let sink = MemorySink::new();
        let config = no_delay();
        let orchestrator = ExportOrchestrator::new(&renderer, &sink, &config);

        let mut hidden = layer("b", 1);
        hidden.is_visible = false;
        let receipt = orchestrator
            .export_one(&[layer("a", 0), hidden], ProjectCanvas::new(2, 2), ExportFormat::Jpg, None, "My: Project")
            .await
            .unwrap();

        assert_eq!(receipt.file_name, "My_ Project.jpg");
        let calls = renderer.calls.lock().unwrap().clone();
        assert_eq!(calls, [(vec!["a".to_string()], Background::White)]);
        let bytes = &sink.written()[0].bytes;
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn duplicate_ids_render_what_apply_leaves_visible() {
        let renderer = RecordingRenderer::default();
        let sink = MemorySink::new();
        let config = no_delay();
        let orchestrator = ExportOrchestrator::new(&renderer, &sink, &config);

        let first = Layer { name: "first".into(), ..layer("x", 0) };
        let second = Layer { name: "second".into(), is_visible: false, ..layer("x", 1) };
        let other = Layer { name: "other".into(), ..layer("y", 2) };
        let layers = vec![first, second, other];

        let mut only_y = preset("Only y", &[]);
        only_y.layer_states = Some(BTreeMap::from([("y".to_string(), true)]));
        let expected: Vec<String> = presets::apply(&only_y, &layers)
            .into_iter()
            .filter(|l| l.is_visible)
            .map(|l| l.name)
            .collect();
        assert_eq!(expected, ["first", "other"]);

        let items = vec![ExportItem { format: ExportFormat::Png, ..ExportItem::from_preset(&only_y, &config) }];
        let report = orchestrator
            .export_many(&items, &layers, ProjectCanvas::new(2, 2), |_| {})
            .await;

        assert_eq!(report.succeeded(), 1);
        let calls = renderer.calls.lock().unwrap().clone();
        assert_eq!(calls, [(expected, Background::Transparent)]);
    }

    #[tokio::test]
    async fn bulk_items_share_the_chosen_folder() {
        let renderer = RecordingRenderer::default();
        let sink = MemorySink::new();
        let config = no_delay();
        let orchestrator =
            ExportOrchestrator::new(&renderer, &sink, &config).in_directory(Some("looks".into()));

        let items = vec![
            item("one", &["a"], ExportFormat::Png),
            item("two", &["a"], ExportFormat::Jpg),
        ];
        orchestrator
            .export_many(&items, &[layer("a", 0)], ProjectCanvas::new(2, 2), |_| {})
            .await;

        let locations: Vec<_> = sink.written().into_iter().filter_map(|f| f.location).collect();
        assert_eq!(locations, ["memory://looks/one.png", "memory://looks/two.jpg"]);
    }

    #[test]
    fn queue_defaults_come_from_config() {
        let config = ExportConfig {
            default_format: ExportFormat::Jpg,
            default_jpeg_quality: 75,
            ..ExportConfig::default()
        };
        let items = export_items(&[preset("p", &["a"])], &config);
        assert_eq!(items.len(), 1);
        assert_eq!((items[0].format, items[0].quality, items[0].enabled), (ExportFormat::Jpg, 75, true));
        assert_eq!(items[0].name, "p");
    }
}

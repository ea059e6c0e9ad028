//! Task manager: the single entry point hosts use for file-level operations.
//!
//! Every request names one [`TaskKind`]. The manager holds no editing state of its own;
//! the caller passes the current layers, presets and canvas with each request. The only
//! thing remembered between calls is where the project was last opened or saved.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::core::{EditorConfig, ExportProgress, Layer, LayerPreset, ProjectCanvas};
use crate::processing::compositor::Renderer;
use crate::processing::export::{ExportItem, ExportOrchestrator, ExportReport};
use crate::project::{
    ensure_supported_version, presets_to_runtime, to_runtime, AssetResolver, ProjectFile, ResolveContext,
};
use crate::sink::{PlatformSink, WriteReceipt, WriteRequest};
use crate::utils::{sanitize_file_stem, AssetResolutionError, EditorError, EditorResult, ExportFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    Open,
    Save,
    SaveAs,
    QuickExportPng,
    QuickExportJpg,
    BulkExport,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Save => "save",
            Self::SaveAs => "save-as",
            Self::QuickExportPng => "quick-export-png",
            Self::QuickExportJpg => "quick-export-jpg",
            Self::BulkExport => "bulk-export",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "save" => Ok(Self::Save),
            "save-as" => Ok(Self::SaveAs),
            "quick-export-png" => Ok(Self::QuickExportPng),
            "quick-export-jpg" => Ok(Self::QuickExportJpg),
            "bulk-export" => Ok(Self::BulkExport),
            other => Err(EditorError::UnsupportedTask(other.to_string())),
        }
    }
}

/// A request and its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TaskRequest {
    /// `handle` names the file for sinks that cannot prompt
    Open {
        #[serde(default)]
        handle: Option<String>,
    },
    Save,
    SaveAs,
    QuickExportPng {
        #[serde(default)]
        filename: Option<String>,
    },
    QuickExportJpg {
        #[serde(default)]
        filename: Option<String>,
        #[serde(default)]
        quality: Option<u8>,
    },
    BulkExport {
        items: Vec<ExportItem>,
    },
}

impl TaskRequest {
    /// Parses a request, checking the `kind` before anything else.
    pub fn from_value(value: Value) -> EditorResult<Self> {
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| EditorError::parse("Task request has no kind"))?;
        let kind: TaskKind = kind.parse()?;

        serde_json::from_value(value)
            .map_err(|e| EditorError::parse(format!("Invalid arguments for {kind}: {e}")))
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Self::Open { .. } => TaskKind::Open,
            Self::Save => TaskKind::Save,
            Self::SaveAs => TaskKind::SaveAs,
            Self::QuickExportPng { .. } => TaskKind::QuickExportPng,
            Self::QuickExportJpg { .. } => TaskKind::QuickExportJpg,
            Self::BulkExport { .. } => TaskKind::BulkExport,
        }
    }
}

/// Snapshot of the editor a request operates on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskContext {
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub presets: Vec<LayerPreset>,
    pub canvas: ProjectCanvas,
    /// Used to name saved projects and quick exports
    #[serde(default)]
    pub project_name: String,
}

/// A project as handed back to the host after open or new.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedProject {
    pub version: String,
    pub canvas: ProjectCanvas,
    pub layers: Vec<Layer>,
    pub presets: Vec<LayerPreset>,
    /// Layers whose assets were replaced by placeholders
    pub asset_failures: Vec<AssetResolutionError>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "camelCase")]
pub enum TaskOutcome {
    Opened(LoadedProject),
    Saved(WriteReceipt),
    Exported(WriteReceipt),
    BulkExported(ExportReport),
}

pub struct TaskManager<R, S, A> {
    renderer: R,
    sink: S,
    resolver: A,
    config: EditorConfig,
    save_location: Option<String>,
}

impl<R, S, A> TaskManager<R, S, A>
where
    R: Renderer,
    S: PlatformSink,
    A: AssetResolver,
{
    pub fn new(renderer: R, sink: S, resolver: A, config: EditorConfig) -> Self {
        Self {
            renderer,
            sink,
            resolver,
            config,
            save_location: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Where the next plain save will go, if known.
    pub fn save_location(&self) -> Option<&str> {
        self.save_location.as_deref()
    }

    /// Forgets the save location.
    pub fn reset(&mut self) {
        self.save_location = None;
    }

    /// Starts over with an empty project on the configured default canvas.
    pub fn new_project(&mut self) -> LoadedProject {
        self.reset();
        let file = ProjectFile::new_empty(&self.config);
        info!("New project ({}x{})", file.canvas.width, file.canvas.height);
        LoadedProject {
            version: file.version,
            canvas: file.canvas,
            layers: Vec::new(),
            presets: Vec::new(),
            asset_failures: Vec::new(),
            location: None,
        }
    }

    pub async fn dispatch(
        &mut self,
        request: TaskRequest,
        ctx: &TaskContext,
        on_progress: impl Fn(&ExportProgress) + Send + Sync,
    ) -> EditorResult<TaskOutcome> {
        debug!("Dispatching task {}", request.kind());

        match request {
            TaskRequest::Open { handle } => self.open(handle.as_deref()).await.map(TaskOutcome::Opened),
            TaskRequest::Save => match self.save_location.clone() {
                Some(location) => self.write_project(ctx, Some(location)).await.map(TaskOutcome::Saved),
                None => {
                    debug!("No save location yet, saving as");
                    self.write_project(ctx, None).await.map(TaskOutcome::Saved)
                }
            },
            TaskRequest::SaveAs => self.write_project(ctx, None).await.map(TaskOutcome::Saved),
            TaskRequest::QuickExportPng { filename } => self
                .quick_export(ctx, ExportFormat::Png, None, filename)
                .await
                .map(TaskOutcome::Exported),
            TaskRequest::QuickExportJpg { filename, quality } => {
                let quality = quality.unwrap_or(self.config.export.default_jpeg_quality);
                self.quick_export(ctx, ExportFormat::Jpg, Some(quality), filename)
                    .await
                    .map(TaskOutcome::Exported)
            }
            TaskRequest::BulkExport { items } => {
                let directory = if items.iter().any(|i| i.enabled) {
                    self.sink.batch_directory().await?
                } else {
                    None
                };
                let orchestrator = ExportOrchestrator::new(&self.renderer, &self.sink, &self.config.export)
                    .in_directory(directory);
                let report = orchestrator
                    .export_many(&items, &ctx.layers, ctx.canvas, on_progress)
                    .await;
                Ok(TaskOutcome::BulkExported(report))
            }
        }
    }

    async fn open(&mut self, handle: Option<&str>) -> EditorResult<LoadedProject> {
        let read = self.sink.read(handle).await?;
        let file = ProjectFile::parse(&read.contents, self.config.default_layer_size)?;
        ensure_supported_version(&file.version)?;

        let ctx = ResolveContext::for_project_file(read.location.as_deref());
        let conversion = to_runtime(&file.layers, &self.resolver, &ctx);
        let presets = presets_to_runtime(&file.presets);

        info!(
            "Opened project {:?}: {} layers, {} presets",
            read.location,
            conversion.layers.len(),
            presets.len()
        );
        self.save_location = read.location.clone();

        Ok(LoadedProject {
            version: file.version,
            canvas: file.canvas,
            layers: conversion.layers,
            presets,
            asset_failures: conversion.asset_failures,
            location: read.location,
        })
    }

    async fn write_project(&mut self, ctx: &TaskContext, location: Option<String>) -> EditorResult<WriteReceipt> {
        let file = ProjectFile::from_runtime(ctx.canvas, &ctx.layers, &ctx.presets);
        let json = file.to_json_pretty()?;

        let request = WriteRequest::new(
            sanitize_file_stem(&ctx.project_name, "project"),
            self.config.project_extension.clone(),
        )
        .at(location);
        let receipt = self.sink.write(json.into_bytes(), request).await?;

        info!("Saved project as {}", receipt.file_name);
        if receipt.location.is_some() {
            self.save_location = receipt.location.clone();
        }
        Ok(receipt)
    }

    async fn quick_export(
        &self,
        ctx: &TaskContext,
        format: ExportFormat,
        quality: Option<u8>,
        filename: Option<String>,
    ) -> EditorResult<WriteReceipt> {
        let filename = filename.unwrap_or_else(|| ctx.project_name.clone());
        ExportOrchestrator::new(&self.renderer, &self.sink, &self.config.export)
            .export_one(&ctx.layers, ctx.canvas, format, quality, &filename)
            .await
    }
}

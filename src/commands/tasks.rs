//! Tauri command handlers for project and export tasks.

use serde_json::Value;
use tauri::{Emitter, State};
use tracing::{debug, warn};

use crate::core::{AppState, ExportProgress};
use crate::tasks::{LoadedProject, TaskContext, TaskOutcome, TaskRequest};
use crate::utils::EditorResult;

/// Event carrying [`ExportProgress`] during a bulk export.
pub const EXPORT_PROGRESS_EVENT: &str = "bulk-export-progress";

/// Starts an empty project and forgets the current save location.
#[tauri::command]
pub async fn new_project(state: State<'_, AppState>) -> EditorResult<LoadedProject> {
    Ok(state.manager().lock().await.new_project())
}

/// Runs one task against the frontend's current editor snapshot.
///
/// # Arguments
/// * `request` - Task request; its `kind` selects the operation
/// * `context` - Layers, presets, canvas and project name at the time of the request
///
/// # Events Emitted
/// * `bulk-export-progress` - Before each bulk-export item and once on completion
#[tauri::command]
pub async fn run_task(
    app: tauri::AppHandle,
    state: State<'_, AppState>,
    request: Value,
    context: TaskContext,
) -> EditorResult<TaskOutcome> {
    let request = TaskRequest::from_value(request)?;
    debug!("Received run_task command: {}", request.kind());

    let mut manager = state.manager().lock().await;
    manager
        .dispatch(request, &context, |progress: &ExportProgress| {
            if let Err(e) = app.emit(EXPORT_PROGRESS_EVENT, progress) {
                warn!("Failed to emit export progress: {}", e);
            }
        })
        .await
}

use std::future::Future;
use std::path::{Path, PathBuf};
use tauri::AppHandle;
use tauri_plugin_dialog::{DialogExt, FilePath};
use tokio::fs;
use tracing::debug;

use super::directory::unique_target;
use super::{PlatformSink, ReadResult, WriteReceipt, WriteRequest};
use crate::utils::{file_name_with_extension, EditorError, EditorResult};

/// Sink backed by the native save/open dialogs.
///
/// A write with a known `location` goes straight to disk, and a batch write goes into the
/// folder picked once for the batch; otherwise the user picks the destination. Dismissing a
/// dialog yields [`EditorError::Cancelled`].
#[derive(Clone)]
pub struct DialogSink {
    app: AppHandle,
}

impl DialogSink {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    async fn ask_save_path(&self, request: &WriteRequest) -> EditorResult<PathBuf> {
        let app = self.app.clone();
        let file_name = file_name_with_extension(&request.suggested_name, &request.extension);
        let extension = request.extension.clone();

        let picked = tokio::task::spawn_blocking(move || {
            app.dialog()
                .file()
                .set_file_name(file_name)
                .add_filter(extension.to_uppercase(), &[extension.as_str()])
                .blocking_save_file()
        })
        .await
        .map_err(|e| EditorError::sink(format!("Save dialog failed: {e}")))?;

        into_path(picked)
    }

    async fn ask_folder(&self) -> EditorResult<PathBuf> {
        let app = self.app.clone();
        let picked = tokio::task::spawn_blocking(move || app.dialog().file().blocking_pick_folder())
            .await
            .map_err(|e| EditorError::sink(format!("Folder dialog failed: {e}")))?;

        into_path(picked)
    }

    async fn ask_open_path(&self) -> EditorResult<PathBuf> {
        let app = self.app.clone();
        let picked = tokio::task::spawn_blocking(move || {
            app.dialog()
                .file()
                .add_filter("Project", &["json"])
                .blocking_pick_file()
        })
        .await
        .map_err(|e| EditorError::sink(format!("Open dialog failed: {e}")))?;

        into_path(picked)
    }
}

fn into_path(picked: Option<FilePath>) -> EditorResult<PathBuf> {
    picked
        .ok_or(EditorError::Cancelled)?
        .into_path()
        .map_err(|e| EditorError::sink(format!("Unusable path from dialog: {e}")))
}

impl PlatformSink for DialogSink {
    fn write(
        &self,
        bytes: Vec<u8>,
        request: WriteRequest,
    ) -> impl Future<Output = EditorResult<WriteReceipt>> + Send {
        async move {
            let path = match (&request.location, &request.directory) {
                (Some(location), _) => PathBuf::from(location),
                (None, Some(directory)) => unique_target(Path::new(directory), &request).await?,
                (None, None) => self.ask_save_path(&request).await?,
            };

            fs::write(&path, &bytes)
                .await
                .map_err(|e| EditorError::sink(format!("Failed to write {}: {e}", path.display())))?;
            debug!("Wrote {} bytes to {}", bytes.len(), path.display());

            Ok(WriteReceipt {
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                location: Some(path.to_string_lossy().to_string()),
                bytes_written: bytes.len(),
            })
        }
    }

    fn batch_directory(&self) -> impl Future<Output = EditorResult<Option<String>>> + Send {
        async move {
            let folder = self.ask_folder().await?;
            debug!("Bulk export folder: {}", folder.display());
            Ok(Some(folder.to_string_lossy().to_string()))
        }
    }

    fn read(&self, handle: Option<&str>) -> impl Future<Output = EditorResult<ReadResult>> + Send {
        let handle = handle.map(PathBuf::from);
        async move {
            let path = match handle {
                Some(path) => path,
                None => self.ask_open_path().await?,
            };
            let contents = fs::read_to_string(&path)
                .await
                .map_err(|e| EditorError::sink(format!("Failed to read {}: {e}", path.display())))?;
            Ok(ReadResult {
                contents,
                location: Some(path.to_string_lossy().to_string()),
            })
        }
    }
}

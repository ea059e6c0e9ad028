use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::{PlatformSink, ReadResult, WriteReceipt, WriteRequest};
use crate::utils::fs::ensure_parent_dir;
use crate::utils::{file_name_with_extension, sanitize_file_stem, unique_path, EditorError, EditorResult};

/// Writes into a fixed directory, numbering names that already exist.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Creates `dir` if needed and picks a free `name (n).ext` path inside it.
pub(super) async fn unique_target(dir: &Path, request: &WriteRequest) -> EditorResult<PathBuf> {
    fs::create_dir_all(dir).await?;
    let stem = sanitize_file_stem(&request.suggested_name, "untitled");
    Ok(unique_path(dir, &file_name_with_extension(&stem, &request.extension)).await)
}

impl PlatformSink for DirectorySink {
    fn write(
        &self,
        bytes: Vec<u8>,
        request: WriteRequest,
    ) -> impl Future<Output = EditorResult<WriteReceipt>> + Send {
        async move {
            let path = match (&request.location, &request.directory) {
                (Some(location), _) => PathBuf::from(location),
                (None, Some(directory)) => unique_target(Path::new(directory), &request).await?,
                (None, None) => unique_target(&self.dir, &request).await?,
            };

            ensure_parent_dir(&path).await?;
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
        let dir = self.dir.to_string_lossy().to_string();
        async move { Ok(Some(dir)) }
    }

    fn read(&self, handle: Option<&str>) -> impl Future<Output = EditorResult<ReadResult>> + Send {
        let path = handle.map(|h| {
            let p = Path::new(h);
            if p.is_relative() { self.dir.join(p) } else { p.to_path_buf() }
        });

        async move {
            let path = path.ok_or_else(|| EditorError::sink("No file selected"))?;
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

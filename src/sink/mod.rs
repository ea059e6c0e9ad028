//! Platform sinks: where exported images and saved projects go, and where opened
//! projects come from.
//!
//! The core never asks which platform it runs on. A host picks one sink when it wires
//! up the [`TaskManager`](crate::tasks::TaskManager):
//! - [`DirectorySink`]: download-folder semantics on the local filesystem
//! - [`MemorySink`]: keeps everything in memory (headless hosts, tests)
//! - `DialogSink`: native save/open dialogs (`desktop` feature)

mod directory;
mod memory;
#[cfg(feature = "desktop")]
mod dialog;

use std::future::Future;
use serde::{Deserialize, Serialize};
use crate::utils::EditorResult;

pub use directory::DirectorySink;
pub use memory::{MemorySink, WrittenFile};
#[cfg(feature = "desktop")]
pub use dialog::DialogSink;

/// What the core wants written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteRequest {
    /// File stem to suggest, already sanitized
    pub suggested_name: String,
    /// Extension without the dot
    pub extension: String,
    /// Known destination (e.g. the current project file); skips any prompt
    #[serde(default)]
    pub location: Option<String>,
    /// Folder chosen once for a whole batch; the file gets a unique name inside it
    #[serde(default)]
    pub directory: Option<String>,
}

impl WriteRequest {
    pub fn new(suggested_name: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            suggested_name: suggested_name.into(),
            extension: extension.into(),
            location: None,
            directory: None,
        }
    }

    pub fn at(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    pub fn in_directory(mut self, directory: Option<String>) -> Self {
        self.directory = directory;
        self
    }
}

/// Where a write ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteReceipt {
    /// Reusable location for later writes, when the platform has one
    pub location: Option<String>,
    pub file_name: String,
    pub bytes_written: usize,
}

/// Contents of a file the user opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResult {
    pub contents: String,
    pub location: Option<String>,
}

/// Platform file capability consumed by the core.
pub trait PlatformSink: Send + Sync {
    fn write(
        &self,
        bytes: Vec<u8>,
        request: WriteRequest,
    ) -> impl Future<Output = EditorResult<WriteReceipt>> + Send;

    /// Reads the file identified by `handle`; `None` lets the platform ask the user.
    fn read(&self, handle: Option<&str>) -> impl Future<Output = EditorResult<ReadResult>> + Send;

    /// Asked once before a bulk export. A folder returned here is passed to every write of
    /// the batch as [`WriteRequest::directory`], so the platform never prompts per item.
    fn batch_directory(&self) -> impl Future<Output = EditorResult<Option<String>>> + Send {
        async { Ok(None) }
    }
}

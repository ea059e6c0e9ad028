use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{PlatformSink, ReadResult, WriteReceipt, WriteRequest};
use crate::utils::{file_name_with_extension, EditorError, EditorResult};

/// One write recorded by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub file_name: String,
    pub location: Option<String>,
    pub bytes: Vec<u8>,
}

/// Sink that keeps files in memory.
///
/// Files can be pre-seeded for reading, and writes for particular stems can be made to
/// fail, which is how hosts without a filesystem (and the tests) drive the exporter.
#[derive(Debug, Default)]
pub struct MemorySink {
    written: Mutex<Vec<WrittenFile>>,
    files: Mutex<HashMap<String, String>>,
    failing: Mutex<HashSet<String>>,
    batch_directory: Option<String>,
    batch_cancelled: bool,
    batch_prompts: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes a file readable under `handle`.
    pub fn with_file(self, handle: impl Into<String>, contents: impl Into<String>) -> Self {
        self.lock_files().insert(handle.into(), contents.into());
        self
    }

    /// Makes every write whose suggested name is `stem` fail.
    pub fn fail_writes_named(self, stem: impl Into<String>) -> Self {
        self.failing.lock().unwrap_or_else(|e| e.into_inner()).insert(stem.into());
        self
    }

    /// Folder handed out when a bulk export asks for one.
    pub fn with_batch_directory(mut self, directory: impl Into<String>) -> Self {
        self.batch_directory = Some(directory.into());
        self
    }

    /// Behaves like a dismissed folder picker.
    pub fn cancel_batches(mut self) -> Self {
        self.batch_cancelled = true;
        self
    }

    /// How many times a bulk export asked for a folder.
    pub fn batch_prompts(&self) -> usize {
        self.batch_prompts.load(Ordering::SeqCst)
    }

    pub fn written(&self) -> Vec<WrittenFile> {
        self.written.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn written_names(&self) -> Vec<String> {
        self.written().into_iter().map(|f| f.file_name).collect()
    }

    fn record(&self, bytes: Vec<u8>, request: WriteRequest) -> EditorResult<WriteReceipt> {
        if self
            .failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&request.suggested_name)
        {
            return Err(EditorError::sink(format!("Write refused for '{}'", request.suggested_name)));
        }

        let file_name = file_name_with_extension(&request.suggested_name, &request.extension);
        let location = match (request.location, request.directory) {
            (Some(location), _) => location,
            (None, Some(directory)) => format!("memory://{directory}/{file_name}"),
            (None, None) => format!("memory://{file_name}"),
        };

        if let Ok(text) = std::str::from_utf8(&bytes) {
            self.lock_files().insert(location.clone(), text.to_string());
        }
        let receipt = WriteReceipt {
            location: Some(location.clone()),
            file_name: file_name.clone(),
            bytes_written: bytes.len(),
        };
        self.written
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(WrittenFile { file_name, location: Some(location), bytes });
        Ok(receipt)
    }

    fn lock_files(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PlatformSink for MemorySink {
    fn write(
        &self,
        bytes: Vec<u8>,
        request: WriteRequest,
    ) -> impl Future<Output = EditorResult<WriteReceipt>> + Send {
        let result = self.record(bytes, request);
        async move { result }
    }

    fn batch_directory(&self) -> impl Future<Output = EditorResult<Option<String>>> + Send {
        self.batch_prompts.fetch_add(1, Ordering::SeqCst);
        let result = if self.batch_cancelled {
            Err(EditorError::Cancelled)
        } else {
            Ok(self.batch_directory.clone())
        };
        async move { result }
    }

    fn read(&self, handle: Option<&str>) -> impl Future<Output = EditorResult<ReadResult>> + Send {
        let result = match handle {
            None => Err(EditorError::sink("No file selected")),
            Some(handle) => self
                .lock_files()
                .get(handle)
                .map(|contents| ReadResult {
                    contents: contents.clone(),
                    location: Some(handle.to_string()),
                })
                .ok_or_else(|| EditorError::sink(format!("No such file: {handle}"))),
        };

        async move { result }
    }
}

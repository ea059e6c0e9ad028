use serde::{Deserialize, Serialize};

/// Progress message type
#[derive(Debug, Deserialize, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProgressType {
    Start,
    Progress,
    Complete,
    Error,
}

/// Bulk-export progress, reported before each item starts and once at the end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportProgress {
    /// Progress type (start, progress, complete, error)
    pub progress_type: ProgressType,
    /// Number of items finished, successfully or not
    pub completed_items: usize,
    /// Number of enabled items in the session
    pub total_items: usize,
    /// Progress percentage (0-100)
    pub progress_percentage: usize,
    /// Current status message
    pub status: String,
    /// Name of the item about to be processed
    #[serde(default)]
    pub current_item: Option<String>,
    /// Error of the item that just failed
    #[serde(default)]
    pub error: Option<String>,
}

impl ExportProgress {
    pub fn new(
        progress_type: ProgressType,
        completed_items: usize,
        total_items: usize,
        status: &str,
    ) -> Self {
        let progress_percentage = if total_items > 0 {
            (completed_items * 100) / total_items
        } else {
            100
        };

        Self {
            progress_type,
            completed_items,
            total_items,
            progress_percentage,
            status: status.to_string(),
            current_item: None,
            error: None,
        }
    }

    pub fn with_current_item(mut self, name: impl Into<String>) -> Self {
        self.current_item = Some(name.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Completed over total, 1.0 for an empty session
    pub fn fraction(&self) -> f64 {
        if self.total_items == 0 {
            1.0
        } else {
            self.completed_items as f64 / self.total_items as f64
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::utils::EditorError;

/// Raster formats the exporter can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpg,
}

impl ExportFormat {
    /// Get the default quality value for this format
    pub fn default_quality(&self) -> u8 {
        match self {
            Self::Png => 100, // lossless, quality is ignored
            Self::Jpg => 92,
        }
    }

    /// Validate quality value for this format
    pub fn validate_quality(&self, quality: u8) -> bool {
        (1..=100).contains(&quality)
    }

    /// Whether the encoded output keeps an alpha channel
    pub fn supports_transparency(&self) -> bool {
        matches!(self, Self::Png)
    }

    /// Get file extensions associated with this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::Png => &["png"],
            Self::Jpg => &["jpg", "jpeg"],
        }
    }

    /// Check if the extension matches this format
    pub fn matches_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.extensions().contains(&ext.as_str())
    }

    /// Get the primary extension for this format
    pub fn primary_extension(&self) -> &str {
        self.extensions()[0]
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.primary_extension())
    }
}

impl FromStr for ExportFormat {
    type Err = EditorError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            _ => Err(EditorError::encode(format!(
                "Unsupported export format: {}", ext
            ))),
        }
    }
}

/// Clamp a requested quality into the range the format accepts.
pub fn effective_quality(format: ExportFormat, requested: Option<u8>) -> u8 {
    match requested {
        Some(q) if format.validate_quality(q) => q,
        Some(q) => q.clamp(1, 100),
        None => format.default_quality(),
    }
}

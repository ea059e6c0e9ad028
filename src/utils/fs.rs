use std::path::{Path, PathBuf};
use tokio::fs;
use crate::utils::EditorResult;

/// Characters that are invalid in a filename on at least one desktop platform.
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Turns a display name (layer, preset, export item) into a safe file stem.
///
/// Reserved characters and control characters become `_`; surrounding whitespace and dots
/// are dropped. An empty result falls back to `fallback`.
pub fn sanitize_file_stem(name: &str, fallback: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) || c.is_control() { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim().trim_matches('.').trim();

    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Returns `stem.ext`, unless `stem` already ends in `.ext` (case-insensitive).
pub fn file_name_with_extension(stem: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    let has_extension = Path::new(stem)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension));

    if has_extension || extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    }
}

/// Get the file stem of a path, lossy
pub fn file_stem(path: &str) -> Option<String> {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
}

/// Picks `dir/name`, or `dir/name (n).ext` if that already exists, like a browser download.
pub async fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !path_exists(&candidate).await {
        return candidate;
    }

    let path = Path::new(file_name);
    let stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().to_string());

    let mut n = 1;
    loop {
        let name = match &ext {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        let candidate = dir.join(name);
        if !path_exists(&candidate).await {
            return candidate;
        }
        n += 1;
    }
}

/// Check if path exists
pub async fn path_exists(path: impl AsRef<Path>) -> bool {
    fs::try_exists(path.as_ref()).await.unwrap_or(false)
}

/// Creates the parent directory of `path` if needed
pub async fn ensure_parent_dir(path: impl AsRef<Path>) -> EditorResult<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

pub mod error;
pub mod formats;
pub mod fs;
pub mod logging;

pub use error::{
    AssetResolutionError,
    DecodeError,
    EditorError,
    EditorResult,
    ValidationError,
};
pub use formats::{ExportFormat, effective_quality};
pub use fs::{file_name_with_extension, file_stem, sanitize_file_stem, unique_path};
pub use logging::init_logging;

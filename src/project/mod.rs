//! Project model: file schema, runtime conversion, presets and layer editing.

pub mod convert;
pub mod layers;
pub mod presets;
pub mod schema;

pub use convert::{
    AssetResolver,
    Conversion,
    FsResolver,
    IdentityResolver,
    ResolveContext,
    presets_to_project,
    presets_to_runtime,
    to_project,
    to_runtime,
};
pub use layers::{NewLayer, add_layer, move_layer, remove_layer, sorted_by_z, toggle_visibility};
pub use presets::{PresetStore, PresetSummary};
pub use schema::{
    CURRENT_VERSION,
    ProjectFile,
    ProjectLayer,
    ProjectPreset,
    ensure_supported_version,
    validate,
    validate_with,
};

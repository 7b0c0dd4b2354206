//! Stable constants describing the bundle layout.

/// Closed vocabulary of merge-supported data kinds, each mapped to its
/// canonical output filename under `data/`.
pub const DATA_FILE_NAMES: [(&str, &str); 5] = [
    ("HANDLING_FILE", "handling.meta"),
    ("VEHICLE_METADATA_FILE", "vehicles.meta"),
    ("CARCOLS_FILE", "carcols.meta"),
    ("VEHICLE_VARIATION_FILE", "carvariations.meta"),
    ("VEHICLE_LAYOUTS_FILE", "vehiclelayouts.meta"),
];

/// Current-generation manifest filename.
pub const MANIFEST_NAME: &str = "fxmanifest.lua";

/// Legacy manifest filename, accepted with a deprecation warning.
pub const LEGACY_MANIFEST_NAME: &str = "__resource.lua";

/// Streamed-asset directory name inside a bundle.
pub const STREAM_DIR: &str = "stream";

/// Extensions subject to logical-asset grouping.
pub const ASSET_EXTENSIONS: [&str; 2] = ["yft", "ytd"];

/// High-detail markers stripped ahead of a recognized extension.
pub const HI_SUFFIXES: [&str; 2] = ["_hi", "+hi"];

/// Node names whose values always accumulate into a list when merging,
/// regardless of instance count.
pub const RESERVED_REPEATABLE_NAMES: [&str; 1] = ["Item"];

/// Returns the canonical output filename for a data kind, or `None` when the
/// kind is outside the supported vocabulary.
pub fn canonical_data_file(kind: &str) -> Option<&'static str> {
    DATA_FILE_NAMES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, name)| *name)
}

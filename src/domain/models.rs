use crate::domain::constants::RESERVED_REPEATABLE_NAMES;
use serde::Serialize;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum MergeError {
    #[error("an output path is required")]
    MissingOutput,
    #[error("output path already exists: {0}")]
    OutputExists(PathBuf),
    #[error("path does not exist: {0}")]
    NotFound(PathBuf),
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("cannot merge to an ambiguous output directory; pass an explicit output path")]
    AmbiguousOutput,
    #[error("manifest syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// Options threaded into the orchestrator's entry point. No process-wide
/// mutable defaults; callers construct and pass this explicitly.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub output_path: Option<PathBuf>,
    pub temp_path: PathBuf,
    pub verbose: bool,
    /// Pretty-print merged documents. Formatting only, never semantics.
    pub lint_output: bool,
    /// Node names that always accumulate into a list when merging.
    pub reserved_names: Vec<String>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            output_path: None,
            temp_path: std::env::temp_dir(),
            verbose: false,
            lint_output: true,
            reserved_names: RESERVED_REPEATABLE_NAMES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Typed view over an extracted manifest table. Both singular and plural
/// group spellings feed the same field (`file`/`files`, etc.).
#[derive(Debug, Clone, Default)]
pub struct ManifestModel {
    pub files: Vec<String>,
    /// Declared (kind, relative path) pairs, in manifest order. Kinds outside
    /// the supported vocabulary are kept here and filtered by the caller.
    pub data_files: Vec<(String, String)>,
    pub client_scripts: Vec<String>,
    pub server_scripts: Vec<String>,
}

impl ManifestModel {
    pub fn has_scripts(&self) -> bool {
        !self.client_scripts.is_empty() || !self.server_scripts.is_empty()
    }
}

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// Per-run summary returned by the orchestrator.
#[derive(Debug, Serialize)]
pub struct MergeReport {
    pub output: PathBuf,
    pub bundles: Vec<BundleReport>,
}

#[derive(Debug, Serialize)]
pub struct BundleReport {
    pub name: String,
    /// Data kinds merged or copied from this bundle.
    pub data_files: Vec<String>,
    /// Flat stream files placed into logical asset groups.
    pub grouped_assets: usize,
    pub skipped: bool,
}

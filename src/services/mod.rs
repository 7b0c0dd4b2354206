//! Service layer containing the merge engine and side-effect helpers.
//!
//! ## Service map
//! - `extract.rs` — restricted-grammar manifest extractor.
//! - `meta.rs` — document tree, XML codec, merge combinator.
//! - `manifest.rs` — manifest model + canonical re-emission.
//! - `assets.rs` — logical-asset grouping for streamed files.
//! - `merger.rs` — the orchestrator sequencing bundles over staging.
//! - `fsx.rs` — narrow recursive copy/remove/hash helpers.
//! - `output.rs` — reporter and JSON/text report printing.
//!
//! ## Conventions
//! - Prefer pure helpers where possible; the core engine never touches the
//!   filesystem directly.
//! - Side effects should be explicit and localized (`merger.rs`, `fsx.rs`).

pub mod assets;
pub mod extract;
pub mod fsx;
pub mod manifest;
pub mod merger;
pub mod meta;
pub mod output;

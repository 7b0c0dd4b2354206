//! Shared data model layer (structs/constants only).
//!
//! ## Purpose
//! - Keep option/report/error types in one place.
//! - Avoid cyclic imports and duplicated type definitions.
//! - Make `--json` output schema changes explicit and reviewable.
//!
//! ## Files
//! - `models.rs` — merge options, error taxonomy, manifest view, reports.
//! - `constants.rs` — the closed data-kind vocabulary and bundle layout names.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem side effects.

pub mod constants;
pub mod models;

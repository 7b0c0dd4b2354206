//! Merge orchestrator: sequences bundles over the staging area.
//!
//! Bundles are processed strictly in input order; later bundles merge
//! against the staged state left by earlier ones, so the run is a left fold
//! by design. Any unrecoverable error aborts the whole run — a half-merged
//! resource is not a usable one. Side effects staged before a failure are
//! not rolled back (known limitation).

use crate::domain::constants::{
    canonical_data_file, LEGACY_MANIFEST_NAME, MANIFEST_NAME, STREAM_DIR,
};
use crate::domain::models::{BundleReport, MergeError, MergeOptions, MergeReport};
use crate::services::output::Reporter;
use crate::services::{assets, extract, fsx, manifest, meta};
use anyhow::Context;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

struct Staging {
    root: PathBuf,
    data: PathBuf,
    stream: PathBuf,
}

/// Merges the bundles at `paths` into one resource at the configured output
/// location, returning a per-bundle report.
pub fn merge(paths: &[PathBuf], options: &MergeOptions) -> anyhow::Result<MergeReport> {
    let reporter = Reporter::new(options.verbose);
    let paths = absolutize(paths)?;
    let output = resolve_output(&paths, options)?;

    if output.exists() {
        return Err(MergeError::OutputExists(output).into());
    }
    if !options.temp_path.exists() {
        return Err(MergeError::NotFound(options.temp_path.clone()).into());
    }
    if !options.temp_path.is_dir() {
        return Err(MergeError::NotADirectory(options.temp_path.clone()).into());
    }
    for path in &paths {
        if !path.exists() {
            return Err(MergeError::NotFound(path.clone()).into());
        }
    }

    let mut work: VecDeque<PathBuf> = paths.into_iter().collect();
    let mut staging: Option<Staging> = None;
    let mut bundles = Vec::new();

    while let Some(path) = work.pop_front() {
        let name = bundle_name(&path);
        reporter.info(format!("tasking '{}'", path.display()));

        let Some((manifest_path, deprecated)) = find_manifest(&path) else {
            let subdirs = fsx::list_subdirs(&path)?;
            if subdirs.is_empty() {
                reporter.warn(format!(
                    "the resource '{}' has no manifest and no subdirectories, skipping",
                    name
                ));
                bundles.push(BundleReport {
                    name,
                    data_files: Vec::new(),
                    grouped_assets: 0,
                    skipped: true,
                });
            } else {
                reporter.info(format!(
                    "'{}' has no manifest, unwrapping {} subdirectories",
                    name,
                    subdirs.len()
                ));
                for dir in subdirs.into_iter().rev() {
                    work.push_front(dir);
                }
            }
            continue;
        };
        if deprecated {
            reporter.warn(format!(
                "'{}' uses a deprecated FXv1 manifest; support may be dropped in the future",
                name
            ));
        }

        if staging.is_none() {
            staging = Some(create_staging(&path, options, &reporter)?);
        }
        if let Some(staging) = staging.as_ref() {
            let report = process_bundle(staging, &path, &manifest_path, options, &reporter)?;
            bundles.push(report);
        }
    }

    let staging = staging
        .ok_or_else(|| anyhow::anyhow!("none of the given paths contained a mergeable resource"))?;
    reporter.info(format!("moving staged resource to '{}'", output.display()));
    fsx::move_tree(&staging.root, &output)?;
    Ok(MergeReport { output, bundles })
}

fn absolutize(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let cwd = std::env::current_dir()?;
    Ok(paths
        .iter()
        .map(|p| if p.is_absolute() { p.clone() } else { cwd.join(p) })
        .collect())
}

fn resolve_output(paths: &[PathBuf], options: &MergeOptions) -> Result<PathBuf, MergeError> {
    if let Some(output) = &options.output_path {
        return Ok(output.clone());
    }
    // without an explicit output there is nowhere unambiguous to put the
    // result; differing parents make that doubly so
    let mut parents = paths.iter().map(|p| p.parent());
    let first = parents.next().flatten();
    if parents.all(|p| p == first) {
        Err(MergeError::MissingOutput)
    } else {
        Err(MergeError::AmbiguousOutput)
    }
}

fn bundle_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn find_manifest(path: &Path) -> Option<(PathBuf, bool)> {
    let current = path.join(MANIFEST_NAME);
    if current.exists() {
        return Some((current, false));
    }
    let legacy = path.join(LEGACY_MANIFEST_NAME);
    if legacy.exists() {
        return Some((legacy, true));
    }
    None
}

/// Staging identity comes from a content hash of the first mergeable bundle,
/// so retries over the same inputs land on (and first clear out) the same
/// directory.
fn create_staging(
    first_bundle: &Path,
    options: &MergeOptions,
    reporter: &Reporter,
) -> anyhow::Result<Staging> {
    let id = fsx::hash_tree(first_bundle)?;
    let root = options.temp_path.join(format!("vmerge-{}", &id[..16]));
    reporter.info(format!("creating staging directory at '{}'", root.display()));
    if root.exists() {
        fsx::remove_tree(&root)?;
    }
    let data = root.join("data");
    let stream = root.join(STREAM_DIR);
    fs::create_dir(&root)?;
    fs::create_dir(&data)?;
    fs::create_dir(&stream)?;
    Ok(Staging { root, data, stream })
}

fn process_bundle(
    staging: &Staging,
    path: &Path,
    manifest_path: &Path,
    options: &MergeOptions,
    reporter: &Reporter,
) -> anyhow::Result<BundleReport> {
    let name = bundle_name(path);
    let src = fs::read_to_string(manifest_path)
        .with_context(|| format!("failed to read manifest '{}'", manifest_path.display()))?;
    let table = extract::extract(&src)?;
    let model = manifest::model_from_table(&table);

    if model.has_scripts() {
        reporter.warn(format!(
            "client/server scripts are not merged automatically; re-add them by hand for '{}'",
            name
        ));
    }

    let mut merged_kinds = Vec::new();
    let mut staged_files = Vec::new();
    let mut staged_decls = Vec::new();
    for (kind, rel_path) in &model.data_files {
        let Some(canonical) = canonical_data_file(kind) else {
            reporter.warn(format!(
                "unsupported data kind '{}' in '{}', skipping its data file",
                kind, name
            ));
            continue;
        };
        let source = path.join(rel_path);
        if !source.exists() {
            reporter.info(format!(
                "declared data file '{}' is missing from '{}', skipping",
                rel_path, name
            ));
            continue;
        }
        let staged = staging.data.join(canonical);
        if staged.exists() {
            reporter.info(format!("merging data file '{}' from '{}'", kind, name));
            let base = meta::parse_document(&fs::read_to_string(&staged)?)
                .with_context(|| format!("failed to parse staged '{}'", staged.display()))?;
            let incoming = meta::parse_document(&fs::read_to_string(&source)?)
                .with_context(|| format!("failed to parse '{}'", source.display()))?;
            let merged = meta::merge(&base, &incoming, &options.reserved_names);
            fs::write(&staged, meta::serialize_document(&merged, options.lint_output)?)?;
        } else {
            reporter.info(format!("copying data file '{}' from '{}'", kind, name));
            fs::copy(&source, &staged)?;
        }
        merged_kinds.push(kind.clone());
        staged_files.push(format!("data/{}", canonical));
        staged_decls.push((kind.clone(), format!("data/{}", canonical)));
    }

    // re-emit the staged manifest, chained against whatever an earlier
    // bundle left behind
    let staged_manifest = staging.root.join(MANIFEST_NAME);
    let existing = if staged_manifest.exists() {
        let staged_src = fs::read_to_string(&staged_manifest)?;
        Some(manifest::model_from_table(&extract::extract(&staged_src)?))
    } else {
        None
    };
    fs::write(
        &staged_manifest,
        manifest::emit_manifest(&staged_files, &staged_decls, existing.as_ref()),
    )?;

    let grouped_assets = stage_assets(staging, path, reporter)?;
    Ok(BundleReport {
        name,
        data_files: merged_kinds,
        grouped_assets,
        skipped: false,
    })
}

fn stage_assets(staging: &Staging, path: &Path, reporter: &Reporter) -> anyhow::Result<usize> {
    let stream_src = path.join(STREAM_DIR);
    if !stream_src.exists() {
        reporter.warn(format!(
            "the resource '{}' doesn't have any streamed assets, continuing",
            bundle_name(path)
        ));
        return Ok(0);
    }
    let mut grouped = 0;
    for entry in fs::read_dir(&stream_src)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            fsx::copy_tree(&entry.path(), &staging.stream.join(&file_name))?;
        } else {
            match assets::logical_asset_name(&file_name) {
                Some(group) => {
                    let dir = staging.stream.join(&group);
                    if !dir.exists() {
                        fs::create_dir(&dir)?;
                    }
                    fsx::copy_if_absent(&entry.path(), &dir.join(&file_name))?;
                    grouped += 1;
                }
                None => {
                    fsx::copy_if_absent(&entry.path(), &staging.stream.join(&file_name))?;
                }
            }
        }
    }
    Ok(grouped)
}

//! Manifest model derivation and canonical re-emission.

use crate::domain::models::ManifestModel;
use crate::services::extract::{ExtractedTable, Group};

/// Derives the typed manifest view from an extracted table. Singular group
/// names shadow their plural spellings, as the upstream manifests allow both.
pub fn model_from_table(table: &ExtractedTable) -> ManifestModel {
    ManifestModel {
        files: group_values(table, "file", "files"),
        data_files: group_pairs(table, "data_file", "data_files"),
        client_scripts: group_values(table, "client_script", "client_scripts"),
        server_scripts: group_values(table, "server_script", "server_scripts"),
    }
}

fn pick<'a>(table: &'a ExtractedTable, singular: &str, plural: &str) -> Option<&'a Group> {
    table.get(singular).or_else(|| table.get(plural))
}

fn group_values(table: &ExtractedTable, singular: &str, plural: &str) -> Vec<String> {
    match pick(table, singular, plural) {
        None => Vec::new(),
        Some(Group::Indexed(items)) => items.clone(),
        Some(Group::Keyed(map)) => map.values().cloned().collect(),
    }
}

fn group_pairs(table: &ExtractedTable, singular: &str, plural: &str) -> Vec<(String, String)> {
    match pick(table, singular, plural) {
        None => Vec::new(),
        // a one-argument declaration leaves only an index for a key; it will
        // fall out later as an unsupported kind
        Some(Group::Indexed(items)) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect(),
        Some(Group::Keyed(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
    }
}

/// Emits the canonical manifest text for the staged bundle.
///
/// Entries from a previously staged manifest are kept ahead of the current
/// bundle's own, in their original order, each included once. Output is
/// byte-deterministic: iteration follows list order throughout.
pub fn emit_manifest(
    files: &[String],
    data_files: &[(String, String)],
    existing: Option<&ManifestModel>,
) -> String {
    let mut all_files: Vec<String> = Vec::new();
    if let Some(model) = existing {
        for file in &model.files {
            if !files.contains(file) && !all_files.contains(file) {
                all_files.push(file.clone());
            }
        }
    }
    for file in files {
        if !all_files.contains(file) {
            all_files.push(file.clone());
        }
    }

    let mut all_data: Vec<(String, String)> = Vec::new();
    if let Some(model) = existing {
        for pair in &model.data_files {
            if !data_files.contains(pair) && !all_data.contains(pair) {
                all_data.push(pair.clone());
            }
        }
    }
    for pair in data_files {
        if !all_data.contains(pair) {
            all_data.push(pair.clone());
        }
    }

    let mut out = String::from("fx_version 'cerulean'\ngame 'gta5'\n\n");
    if !all_files.is_empty() {
        out.push_str("files {\n");
        let entries: Vec<String> = all_files.iter().map(|f| format!("  '{}'", f)).collect();
        out.push_str(&entries.join(",\n"));
        out.push_str("\n}\n");
    }
    for (kind, path) in &all_data {
        out.push_str(&format!("data_file '{}' '{}'\n", kind, path));
    }
    out
}

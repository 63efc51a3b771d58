//! Record loading and saving
//!
//! Generic helpers shared by the commands: scan a record directory, find a
//! record by (partial) ID, load it with located diagnostics, and write it
//! back.

use miette::{IntoDiagnostic, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::entity::Entity;
use crate::core::project::{Project, RECORD_SUFFIX};
use crate::entities::standard::{default_catalog, IsoStandard, StandardCatalog};
use crate::yaml::parse_yaml_file;

/// Load all records of type T from a directory
///
/// Files that fail to parse are logged and skipped.
pub fn load_all<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut records = Vec::new();

    if !dir.exists() {
        return Ok(records);
    }

    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.into_diagnostic()?;
        let path = entry.path();
        if !entry.file_type().is_file() || !path.to_string_lossy().ends_with(RECORD_SUFFIX) {
            continue;
        }

        match parse_yaml_file::<T>(path) {
            Ok(record) => records.push(record),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable record"),
        }
    }

    Ok(records)
}

/// Find a record file by ID
///
/// An exact match wins; otherwise the first file whose name starts with the
/// given text (case-insensitive) is returned.
pub fn find_record_file(dir: &Path, id: &str) -> Option<PathBuf> {
    if !dir.exists() {
        return None;
    }

    let exact = dir.join(format!("{}{}", id.to_uppercase(), RECORD_SUFFIX));
    if exact.is_file() {
        return Some(exact);
    }

    let wanted = id.to_uppercase();
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.ends_with(RECORD_SUFFIX) && name.to_uppercase().starts_with(&wanted))
        })
        .collect();
    matches.sort();
    matches.into_iter().next()
}

/// Load a single record by ID
///
/// Returns the path and record if found; a file that exists but does not
/// parse is an error carrying the source location.
pub fn load_record<T: DeserializeOwned>(dir: &Path, id: &str) -> Result<Option<(PathBuf, T)>> {
    if let Some(path) = find_record_file(dir, id) {
        let record: T = parse_yaml_file(&path)?;
        return Ok(Some((path, record)));
    }
    Ok(None)
}

/// Write a record to its canonical location, returning the path
pub fn save_record<T: Entity>(project: &Project, record: &T) -> Result<PathBuf> {
    let path = project.record_path(record.id());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(record).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;
    Ok(path)
}

/// Load the project's standards catalog, or the seeded one when the project
/// has none
pub fn load_catalog(project: &Project) -> Result<StandardCatalog> {
    let path = project.catalog_path();
    if !path.exists() {
        warn!(path = %path.display(), "no standards catalog, using seeded rows");
        return Ok(StandardCatalog::new(default_catalog()));
    }
    let rows: Vec<IsoStandard> = parse_yaml_file(&path)?;
    Ok(StandardCatalog::new(rows))
}

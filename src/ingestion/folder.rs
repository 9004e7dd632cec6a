//! Folder-level batch assembly.
//!
//! Discovers files under a root by glob pattern(s), runs the single-file
//! pipeline per file, re-expands every per-file result to the schema's column
//! order, appends a provenance column and concatenates everything. Discovery
//! output is sorted lexicographically before any reading, so the concatenated
//! row order never depends on filesystem enumeration order or on parallel
//! completion order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::cast::CastReport;
use crate::error::{IngestError, IngestResult};
use crate::logging::Logger;
use crate::types::{Schema, TypedTable, Value};

use super::unified::{self, FileFormat, ReadOptions};

/// Default provenance column name, kept from the source platform's layout.
pub const DEFAULT_PROVENANCE_COLUMN: &str = "NM_SOURCE_FILE";

/// Options controlling folder batch assembly.
#[derive(Clone)]
pub struct FolderOptions {
    /// Glob patterns matched against file names; a file is eligible when any
    /// pattern matches.
    pub patterns: Vec<String>,
    /// Traverse subdirectories.
    pub recursive: bool,
    /// Match patterns case- and diacritic-insensitively.
    pub normalize_names: bool,
    /// Name of the appended provenance column.
    pub provenance_column: String,
    /// Record the full resolved path instead of the bare file name.
    pub provenance_full_path: bool,
    /// Per-file read options (delimiter/sheet/encoding overrides, validation
    /// toggle, logger).
    pub read: ReadOptions,
}

impl Default for FolderOptions {
    fn default() -> Self {
        Self {
            patterns: vec!["*".to_string()],
            recursive: false,
            normalize_names: false,
            provenance_column: DEFAULT_PROVENANCE_COLUMN.to_string(),
            provenance_full_path: false,
            read: ReadOptions::default(),
        }
    }
}

impl FolderOptions {
    /// Convenience constructor for the common single-pattern call.
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        Self {
            patterns: vec![pattern.into()],
            ..Self::default()
        }
    }

    fn logger(&self) -> Option<&Arc<dyn Logger>> {
        self.read.logger.as_ref()
    }

    fn log_warning(&self, message: &str) {
        if let Some(logger) = self.logger() {
            logger.warning(message);
        }
    }

    fn log_info(&self, message: &str) {
        if let Some(logger) = self.logger() {
            logger.info(message);
        }
    }
}

/// Tie-break rule for [`pick_file_from_folder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickBy {
    /// Most recently modified file wins.
    #[default]
    Latest,
    /// Largest file wins.
    Largest,
}

/// Case- and diacritic-insensitive comparison key for name matching.
fn fold_name(s: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    use unicode_normalization::char::is_combining_mark;
    s.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Enumerate files under `root` and filter them by glob patterns.
///
/// Pure with respect to any retained state: `(root, patterns, flags)` map to
/// a lexicographically sorted path list. Distinct failure modes:
/// [`IngestError::InvalidFolder`] (root absent or not a directory),
/// [`IngestError::NoFilesFound`] (empty drop location) and
/// [`IngestError::NoEligibleFiles`] (files exist, none match).
pub fn discover_files(
    root: impl AsRef<Path>,
    patterns: &[String],
    recursive: bool,
    normalize_names: bool,
) -> IngestResult<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(IngestError::InvalidFolder {
            path: root.to_path_buf(),
        });
    }

    let mut files: Vec<PathBuf> = Vec::new();
    if recursive {
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| {
                std::io::Error::other(format!("walk failed under {}: {e}", root.display()))
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    } else {
        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
    }

    if files.is_empty() {
        return Err(IngestError::NoFilesFound {
            path: root.to_path_buf(),
        });
    }

    let compiled: Vec<glob::Pattern> = patterns
        .iter()
        .map(|p| {
            let source = if normalize_names { fold_name(p) } else { p.clone() };
            glob::Pattern::new(&source)
                .map_err(|e| IngestError::invalid_input(format!("bad glob pattern '{p}': {e}")))
        })
        .collect::<IngestResult<_>>()?;

    let mut selected: Vec<PathBuf> = files
        .into_iter()
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let candidate = if normalize_names { fold_name(&name) } else { name };
            compiled.iter().any(|p| p.matches(&candidate))
        })
        .collect();

    if selected.is_empty() {
        return Err(IngestError::NoEligibleFiles {
            path: root.to_path_buf(),
            patterns: patterns.to_vec(),
            normalize_names,
            recursive,
        });
    }

    selected.sort();
    Ok(selected)
}

/// Pick a single file from a folder, narrowing multiple candidates by
/// modification time or size.
///
/// Logs a warning when several candidates matched and one had to be chosen.
pub fn pick_file_from_folder(
    root: impl AsRef<Path>,
    pattern: &str,
    recursive: bool,
    prefer: PickBy,
    logger: Option<&Arc<dyn Logger>>,
) -> IngestResult<PathBuf> {
    let root = root.as_ref();
    let files = discover_files(root, &[pattern.to_string()], recursive, false)?;
    if files.len() == 1 {
        if let Some(logger) = logger {
            logger.info(&format!("file found: {}", files[0].display()));
        }
        return Ok(files[0].clone());
    }

    let chosen = match prefer {
        PickBy::Latest => files
            .iter()
            .max_by_key(|p| p.metadata().and_then(|m| m.modified()).ok()),
        PickBy::Largest => files.iter().max_by_key(|p| {
            p.metadata().map(|m| m.len()).unwrap_or(0)
        }),
    }
    .cloned()
    // discover_files guarantees a non-empty list.
    .unwrap_or_else(|| files[0].clone());

    if let Some(logger) = logger {
        logger.warning(&format!(
            "{} files matched '{pattern}' under {}; picking {:?}: {}",
            files.len(),
            root.display(),
            prefer,
            chosen.display()
        ));
    }
    Ok(chosen)
}

/// Read every eligible file under `root` and concatenate the results.
///
/// - Files with unsupported extensions are skipped with a warning.
/// - Per-file read errors are collected and warned, not fatal; one malformed
///   file never discards the batch.
/// - Zero successfully read files fail with [`IngestError::NoReadableFiles`].
/// - Each per-file table already follows schema column order; the provenance
///   column is appended last.
///
/// Per-file reads run in parallel; results are stitched back in discovery
/// (sorted) order.
pub fn read_folder(
    root: impl AsRef<Path>,
    schema: &Schema,
    options: &FolderOptions,
) -> IngestResult<TypedTable> {
    read_folder_with_report(root, schema, options).map(|(table, _)| table)
}

/// [`read_folder`], also returning the merged coercion diagnostics.
pub fn read_folder_with_report(
    root: impl AsRef<Path>,
    schema: &Schema,
    options: &FolderOptions,
) -> IngestResult<(TypedTable, CastReport)> {
    let root = root.as_ref();
    let selected = discover_files(
        root,
        &options.patterns,
        options.recursive,
        options.normalize_names,
    )?;

    let mut readable: Vec<&PathBuf> = Vec::with_capacity(selected.len());
    for path in &selected {
        if FileFormat::from_path(path).is_ok() {
            readable.push(path);
        } else {
            options.log_warning(&format!("skipping unsupported format: {}", path.display()));
        }
    }

    // Each file read is side-effect-free with respect to the others and the
    // schema is shared read-only, so the fan-out is safe; collecting over the
    // sorted list keeps output order deterministic.
    let outcomes: Vec<(&PathBuf, IngestResult<(TypedTable, CastReport)>)> = readable
        .par_iter()
        .map(|path| (*path, unified::read_from_path_with_report(path, schema, &options.read)))
        .collect();

    let mut combined: Option<TypedTable> = None;
    let mut report = CastReport::default();
    let mut failures = 0usize;
    let mut successes = 0usize;
    for (path, outcome) in outcomes {
        match outcome {
            Ok((mut table, file_report)) => {
                let provenance = if options.provenance_full_path {
                    path.display().to_string()
                } else {
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string())
                };
                table.push_column(&options.provenance_column, Value::Text(provenance));
                successes += 1;
                match &mut combined {
                    None => combined = Some(table),
                    Some(acc) => acc.extend_rows(table)?,
                }
                for (column, count) in file_report.coerced {
                    *report.coerced.entry(column).or_insert(0) += count;
                }
            }
            Err(err) => {
                failures += 1;
                options.log_warning(&format!("failed to read {}: {err}", path.display()));
            }
        }
    }

    match combined {
        Some(table) => {
            options.log_info(&format!(
                "assembled {} rows from {successes} file(s) under {}",
                table.row_count(),
                root.display()
            ));
            Ok((table, report))
        }
        None => Err(IngestError::NoReadableFiles {
            path: root.to_path_buf(),
            patterns: options.patterns.clone(),
            failures,
        }),
    }
}

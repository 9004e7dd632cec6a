//! Schema descriptor loading.
//!
//! A descriptor is a JSON file declaring the expected columns, their types and
//! read configuration. Two shapes are accepted:
//!
//! - an array of column objects under `columns` (or `fields`):
//!   `{"name": "ID_USUARIO", "type": "int", "aliases": ["ID Usuário"]}`
//! - a flat mapping of column name to type string, excluding the reserved
//!   configuration keys.
//!
//! Reserved top-level keys: `delimiter`, `encoding`, `excel_has_header`,
//! `excel_start_row`, `excel_fill_empty_with`, `excel_read_all_as_str`,
//! `excel_index_col`, `sheet_name`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value as Json;

use crate::error::{IngestError, IngestResult};
use crate::types::{ColumnSpec, ColumnType, Encoding, Schema, SheetOptions};

const RESERVED_KEYS: &[&str] = &[
    "delimiter",
    "encoding",
    "excel_has_header",
    "excel_start_row",
    "excel_fill_empty_with",
    "excel_read_all_as_str",
    "excel_index_col",
    "sheet_name",
];

/// One column object from an array-shaped descriptor.
#[derive(Debug, Deserialize)]
struct RawColumnDef {
    name: Option<String>,
    #[serde(rename = "type")]
    type_name: Option<String>,
    #[serde(default)]
    aliases: Option<OneOrMany>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    source_name: Option<String>,
}

/// Descriptors may declare `aliases` as a single string or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

/// Load a schema descriptor from `path`.
///
/// Equivalent to [`load_with_root`] with no root: relative paths resolve
/// against the current directory only.
pub fn load(path: impl AsRef<Path>) -> IngestResult<Schema> {
    load_with_root(path, None::<&Path>)
}

/// Load a schema descriptor, retrying relative paths under `root`.
///
/// A relative `path` that does not exist as given is looked up under `root`
/// before failing with [`IngestError::MissingSchema`].
pub fn load_with_root(
    path: impl AsRef<Path>,
    root: Option<impl AsRef<Path>>,
) -> IngestResult<Schema> {
    let path = resolve_descriptor_path(path.as_ref(), root.as_ref().map(|r| r.as_ref()))?;
    let text = fs::read_to_string(&path)?;
    let blob: Json = serde_json::from_str(&text)?;
    schema_from_blob(&blob, &path)
}

fn resolve_descriptor_path(path: &Path, root: Option<&Path>) -> IngestResult<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if path.is_relative() {
        if let Some(root) = root {
            let candidate = root.join(path);
            if candidate.exists() {
                return Ok(candidate);
            }
        }
    }
    Err(IngestError::MissingSchema {
        path: path.to_path_buf(),
    })
}

fn schema_from_blob(blob: &Json, path: &Path) -> IngestResult<Schema> {
    let (columns, positional_names) = extract_columns(blob)?;
    if columns.is_empty() {
        return Err(IngestError::EmptySchema {
            path: path.to_path_buf(),
        });
    }

    Ok(Schema {
        columns,
        positional_names,
        delimiter: extract_delimiter(blob),
        encoding: extract_encoding(blob)?,
        sheet: extract_sheet_options(blob),
    })
}

/// Returns the columns plus whether they may name spreadsheet columns
/// positionally (array shape yes, flat mapping no).
fn extract_columns(blob: &Json) -> IngestResult<(Vec<ColumnSpec>, bool)> {
    for key in ["columns", "fields"] {
        if let Some(array) = blob.get(key).filter(|v| v.is_array()) {
            let defs: Vec<RawColumnDef> = serde_json::from_value(array.clone())?;
            return Ok((columns_from_defs(defs)?, true));
        }
    }

    // Flat mapping fallback: every non-reserved string-valued key is a column,
    // in document order (serde_json's preserve_order keeps key insertion
    // order).
    let mut columns = Vec::new();
    if let Some(map) = blob.as_object() {
        for (name, value) in map {
            if RESERVED_KEYS.contains(&name.as_str()) {
                continue;
            }
            let Some(type_name) = value.as_str() else {
                continue;
            };
            columns.push(ColumnSpec::new(name, resolve_type(name, type_name)?));
        }
    }
    Ok((columns, false))
}

fn columns_from_defs(defs: Vec<RawColumnDef>) -> IngestResult<Vec<ColumnSpec>> {
    let mut columns = Vec::with_capacity(defs.len());
    for def in defs {
        let Some(name) = def.name.filter(|n| !n.is_empty()) else {
            continue;
        };
        let column_type = match def.type_name.as_deref() {
            Some(t) => resolve_type(&name, t)?,
            None => ColumnType::Text,
        };
        let mut aliases: Vec<String> = Vec::new();
        for src in [def.source, def.source_name].into_iter().flatten() {
            aliases.push(src);
        }
        if let Some(more) = def.aliases {
            aliases.extend(more.into_vec());
        }
        columns.push(ColumnSpec {
            name,
            column_type,
            aliases,
        });
    }
    Ok(columns)
}

fn resolve_type(column: &str, type_name: &str) -> IngestResult<ColumnType> {
    ColumnType::parse(type_name).ok_or_else(|| IngestError::UnknownColumnType {
        column: column.to_string(),
        type_name: type_name.to_string(),
    })
}

fn extract_delimiter(blob: &Json) -> Option<u8> {
    blob.get("delimiter")
        .and_then(|v| v.as_str())
        .and_then(|s| s.bytes().next())
}

fn extract_encoding(blob: &Json) -> IngestResult<Encoding> {
    match blob.get("encoding").and_then(|v| v.as_str()) {
        None => Ok(Encoding::default()),
        Some(label) => Encoding::parse(label)
            .ok_or_else(|| IngestError::invalid_input(format!("unknown encoding '{label}'"))),
    }
}

fn extract_sheet_options(blob: &Json) -> SheetOptions {
    let defaults = SheetOptions::default();
    SheetOptions {
        has_header: blob
            .get("excel_has_header")
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.has_header),
        start_row: blob
            .get("excel_start_row")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(defaults.start_row),
        fill_empty_with: blob
            .get("excel_fill_empty_with")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        read_all_as_str: blob
            .get("excel_read_all_as_str")
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.read_all_as_str),
        index_col: blob
            .get("excel_index_col")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize),
        sheet_name: blob
            .get("sheet_name")
            .and_then(|v| v.as_str())
            .map(str::to_string),
    }
}

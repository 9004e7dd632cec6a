//! Single-file read pipeline.
//!
//! Composes the stages for one physical file: pick the reader by extension,
//! read an untyped [`crate::types::RawTable`], reconcile headers against the
//! schema, validate the reconciled column set, then cast into a
//! [`crate::types::TypedTable`]. The schema is loaded by the caller (see
//! [`crate::schema`]) and shared read-only; types are never inferred.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::cast::{self, CastReport};
use crate::error::{IngestError, IngestResult};
use crate::headers;
use crate::logging::Logger;
use crate::types::{Encoding, RawTable, Schema, TypedTable};

use super::{delimited, json, spreadsheet, yaml};

/// Supported physical file formats, keyed by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Delimited text (`.csv`, `.txt`).
    Delimited,
    /// Workbook formats (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`).
    Spreadsheet,
    /// JSON array-of-objects, single object, or JSON-Lines (`.json`, `.ndjson`).
    Json,
    /// YAML sequence or mapping (`.yml`, `.yaml`).
    Yaml,
}

impl FileFormat {
    /// Resolve a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Some(Self::Delimited),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Spreadsheet),
            "json" | "ndjson" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Resolve a format from a path, failing with
    /// [`IngestError::UnsupportedFormat`] for unknown extensions.
    pub fn from_path(path: &Path) -> IngestResult<Self> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        Self::from_extension(&extension).ok_or_else(|| IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        })
    }
}

/// Options controlling a single-file read.
///
/// Use [`Default`] for common cases; per-call values override the schema
/// descriptor's configuration.
#[derive(Clone, Default)]
pub struct ReadOptions {
    /// Delimiter override for delimited text (schema's, else detection).
    pub delimiter: Option<u8>,
    /// Sheet override for spreadsheets (schema's default, else first sheet).
    pub sheet_name: Option<String>,
    /// Force JSON-Lines parsing on/off; `None` auto-detects.
    pub json_lines: Option<bool>,
    /// Encoding override (schema's, else UTF-8).
    pub encoding: Option<Encoding>,
    /// Skip header validation against the schema (validation runs by
    /// default).
    pub skip_validation: bool,
    /// Optional logger collaborator.
    pub logger: Option<Arc<dyn Logger>>,
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("delimiter", &self.delimiter)
            .field("sheet_name", &self.sheet_name)
            .field("json_lines", &self.json_lines)
            .field("encoding", &self.encoding)
            .field("skip_validation", &self.skip_validation)
            .field("logger_set", &self.logger.is_some())
            .finish()
    }
}

impl ReadOptions {
    fn log_info(&self, message: &str) {
        if let Some(logger) = &self.logger {
            logger.info(message);
        }
    }
}

/// Read one file into a schema-conformant [`TypedTable`].
///
/// See [`read_from_path_with_report`] for the coercion diagnostics.
pub fn read_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    options: &ReadOptions,
) -> IngestResult<TypedTable> {
    read_from_path_with_report(path, schema, options).map(|(table, _)| table)
}

/// Read one file, also returning the per-column count of cells that were
/// coerced to null by the casting stage.
pub fn read_from_path_with_report(
    path: impl AsRef<Path>,
    schema: &Schema,
    options: &ReadOptions,
) -> IngestResult<(TypedTable, CastReport)> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;
    let encoding = options.encoding.unwrap_or(schema.encoding);

    let mut raw: RawTable = match format {
        FileFormat::Delimited => {
            let delimiter = options.delimiter.or(schema.delimiter);
            delimited::read_delimited(path, delimiter, encoding)?
        }
        FileFormat::Spreadsheet => {
            // Array-shaped descriptors name sheet columns positionally; flat
            // mappings match the physical header row instead.
            let names = schema.positional_names.then(|| schema.ordered_names());
            spreadsheet::read_spreadsheet(
                path,
                options.sheet_name.as_deref(),
                names.as_deref(),
                &schema.sheet,
            )?
        }
        FileFormat::Json => json::read_json(path, options.json_lines, encoding)?,
        FileFormat::Yaml => yaml::read_yaml(path, encoding)?,
    };

    let renames = headers::build_rename_map(&raw.headers, schema);
    raw.rename_headers(&renames);

    if !options.skip_validation {
        headers::validate_columns(&raw.headers, &schema.ordered_names())?;
    }

    let (table, report) = cast::apply_schema(&raw, schema);
    options.log_info(&format!(
        "read {} rows from {} ({format:?})",
        table.row_count(),
        path.display()
    ));
    if report.total() > 0 {
        options.log_info(&format!(
            "{}: {} cell(s) coerced to null ({:?})",
            path.display(),
            report.total(),
            report.coerced
        ));
    }
    Ok((table, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_resolution_by_extension() {
        assert_eq!(FileFormat::from_extension("CSV"), Some(FileFormat::Delimited));
        assert_eq!(FileFormat::from_extension("txt"), Some(FileFormat::Delimited));
        assert_eq!(FileFormat::from_extension("xlsx"), Some(FileFormat::Spreadsheet));
        assert_eq!(FileFormat::from_extension("yml"), Some(FileFormat::Yaml));
        assert_eq!(FileFormat::from_extension("parquet"), None);
    }

    #[test]
    fn unknown_extension_is_unsupported_format() {
        let err = FileFormat::from_path(Path::new("dump.parquet")).unwrap_err();
        match err {
            IngestError::UnsupportedFormat { extension, .. } => {
                assert_eq!(extension, "parquet");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

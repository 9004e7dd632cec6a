//! Core data model types for ingestion.
//!
//! This crate ingests supported formats into a strictly typed [`TypedTable`],
//! driven entirely by a [`Schema`] loaded from an external descriptor file.
//! The intermediate [`RawTable`] is text-only: no numeric or date inference
//! ever happens inside a reader, only in the casting stage.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{IngestError, IngestResult};

/// Logical data type declared for a schema column.
///
/// A closed enumeration: unrecognized descriptor type strings are rejected at
/// schema load time instead of silently defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// UTF-8 text (the default when a column declares no type).
    Text,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit floating point number.
    Float,
    /// Boolean.
    Bool,
    /// Calendar date (day-first parsing preference).
    Date,
    /// Date and time, full timestamp precision.
    DateTime,
    /// Text tagged for downstream low-cardinality encoding.
    Category,
}

impl ColumnType {
    /// Resolve a descriptor type string (case- and synonym-tolerant).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "str" | "text" | "utf8" => Some(Self::Text),
            "int" | "int64" | "integer" => Some(Self::Integer),
            "float" | "float64" | "number" => Some(Self::Float),
            "bool" | "boolean" => Some(Self::Bool),
            "date" => Some(Self::Date),
            "datetime" | "datetime64" => Some(Self::DateTime),
            "category" => Some(Self::Category),
            _ => None,
        }
    }
}

/// A single named, typed column in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Canonical column name.
    pub name: String,
    /// Declared type, driving the cast for every cell in this column.
    pub column_type: ColumnType,
    /// Alternate header spellings that should resolve to this column.
    pub aliases: Vec<String>,
}

impl ColumnSpec {
    /// Create a column spec without aliases.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            aliases: Vec::new(),
        }
    }
}

/// Text encoding used to decode raw file bytes.
///
/// Threaded explicitly into every reader; there is no hidden process-wide
/// default beyond [`Encoding::Utf8`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Strict UTF-8.
    #[default]
    Utf8,
    /// ISO-8859-1; also accepted for `windows-1252` descriptors.
    Latin1,
}

impl Encoding {
    /// Resolve an encoding label from a schema descriptor.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" | "utf-8-sig" => Some(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" | "cp1252" | "windows-1252" => Some(Self::Latin1),
            _ => None,
        }
    }

    /// Decode file bytes into text.
    ///
    /// UTF-8 decoding is strict: undecodable bytes are an error rather than
    /// replacement characters, so a mis-declared encoding surfaces early.
    pub fn decode(&self, bytes: &[u8]) -> IngestResult<String> {
        match self {
            Self::Utf8 => {
                let text = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    IngestError::invalid_input(format!("file is not valid utf-8: {e}"))
                })?;
                // Leading BOM is part of the encoding, not the data.
                Ok(match text.strip_prefix('\u{feff}') {
                    Some(rest) => rest.to_string(),
                    None => text,
                })
            }
            Self::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

/// Spreadsheet-specific configuration carried by a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetOptions {
    /// Whether the sheet carries a header row.
    pub has_header: bool,
    /// Zero-based row index of the header (or of the first data row when
    /// `has_header` is false).
    pub start_row: usize,
    /// Placeholder token written into empty cells, if any.
    pub fill_empty_with: Option<String>,
    /// Descriptor compatibility flag. Readers always produce text cells, so
    /// this carries no behavior of its own.
    pub read_all_as_str: bool,
    /// Positional column to drop (a source-side index column).
    pub index_col: Option<usize>,
    /// Default sheet to read when the caller does not pick one.
    pub sheet_name: Option<String>,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            start_row: 0,
            fill_empty_with: None,
            read_all_as_str: true,
            index_col: None,
            sheet_name: None,
        }
    }
}

/// A loaded schema descriptor: ordered typed columns plus read configuration.
///
/// Loaded once per read operation (see [`crate::schema`]) and immutable
/// afterwards; the folder assembler shares one instance read-only across all
/// per-file reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of expected columns.
    pub columns: Vec<ColumnSpec>,
    /// Assign column names to spreadsheet columns positionally. True for
    /// array-shaped descriptors and programmatic schemas; flat-mapping
    /// descriptors match the physical header row instead.
    pub positional_names: bool,
    /// Delimiter for delimited-text files, if the descriptor fixes one.
    pub delimiter: Option<u8>,
    /// Text encoding for byte-oriented formats.
    pub encoding: Encoding,
    /// Spreadsheet read configuration.
    pub sheet: SheetOptions,
}

impl Schema {
    /// Create a schema from columns with default configuration.
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns,
            positional_names: true,
            delimiter: None,
            encoding: Encoding::default(),
            sheet: SheetOptions::default(),
        }
    }

    /// Iterate column names in schema order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Ordered column names as owned strings.
    pub fn ordered_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Returns the declared type of a column by name, if present.
    pub fn type_of(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.column_type)
    }
}

/// A single typed cell value in a [`TypedTable`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value, or a cell that failed its cast.
    Null,
    /// UTF-8 text (also used for `Category` columns).
    Text(String),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time.
    DateTime(NaiveDateTime),
}

impl Value {
    /// True for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Untyped tabular buffer produced by a format reader.
///
/// Every cell is text or null. `headers` holds the original (or reconciled)
/// column labels; `rows[i][j]` belongs to `headers[j]`. Transient: consumed by
/// renaming/validation/casting and then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    /// Column labels, in file order.
    pub headers: Vec<String>,
    /// Row-major text cells; `None` is a missing cell.
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Create a raw table from headers and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { headers, rows }
    }

    /// Position of a column label, if present.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == label)
    }

    /// Rewrite headers through a rename mapping, leaving unmapped labels
    /// untouched.
    pub fn rename_headers(&mut self, renames: &std::collections::BTreeMap<String, String>) {
        for header in &mut self.headers {
            if let Some(target) = renames.get(header) {
                *header = target.clone();
            }
        }
    }
}

/// Schema-conformant, fully cast tabular result.
///
/// Column set and order match the schema's ordered column list; the folder
/// assembler may append a provenance column after the schema columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedTable {
    /// Column names, schema order first.
    pub columns: Vec<String>,
    /// Row-major typed cells, one [`Value`] per column.
    pub rows: Vec<Vec<Value>>,
}

impl TypedTable {
    /// Create a typed table.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a constant-valued column at the end of every row.
    pub fn push_column(&mut self, name: impl Into<String>, value: Value) {
        self.columns.push(name.into());
        for row in &mut self.rows {
            row.push(value.clone());
        }
    }

    /// Append another table's rows to this one.
    ///
    /// Both tables must share the same column list; the folder assembler
    /// guarantees that by re-expanding every per-file result to schema order
    /// before concatenation.
    pub fn extend_rows(&mut self, other: TypedTable) -> IngestResult<()> {
        if self.columns != other.columns {
            return Err(IngestError::invalid_input(format!(
                "cannot concatenate tables with diverging columns: {:?} vs {:?}",
                self.columns, other.columns
            )));
        }
        self.rows.extend(other.rows);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_type_synonyms_resolve() {
        for s in ["int", "INT64", " integer "] {
            assert_eq!(ColumnType::parse(s), Some(ColumnType::Integer));
        }
        assert_eq!(ColumnType::parse("number"), Some(ColumnType::Float));
        assert_eq!(ColumnType::parse("datetime64"), Some(ColumnType::DateTime));
        assert_eq!(ColumnType::parse("varchar"), None);
    }

    #[test]
    fn latin1_decodes_every_byte() {
        let bytes: Vec<u8> = vec![0x41, 0xE7, 0xE3, 0x6F];
        let text = Encoding::Latin1.decode(&bytes).unwrap();
        assert_eq!(text, "Ação");
    }

    #[test]
    fn utf8_decode_strips_leading_bom() {
        let bytes = [0xEF, 0xBB, 0xBF, b'o', b'k'];
        assert_eq!(Encoding::Utf8.decode(&bytes).unwrap(), "ok");
    }

    #[test]
    fn strict_utf8_rejects_latin1_bytes() {
        let err = Encoding::Utf8.decode(&[0x41, 0xE7]).unwrap_err();
        assert!(err.to_string().contains("not valid utf-8"));
    }

    #[test]
    fn push_column_extends_every_row() {
        let mut t = TypedTable::new(
            vec!["a".into()],
            vec![vec![Value::Int(1)], vec![Value::Int(2)]],
        );
        t.push_column("src", Value::Text("f.csv".into()));
        assert_eq!(t.columns, vec!["a", "src"]);
        assert_eq!(t.rows[1][1], Value::Text("f.csv".into()));
    }
}

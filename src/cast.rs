//! Strict, schema-driven type casting.
//!
//! Converts a renamed [`RawTable`] into a [`TypedTable`] whose columns are
//! exactly the schema's ordered column list. Casting never raises per cell:
//! a malformed cell degrades to [`Value::Null`]. That policy is load-bearing
//! for messy real-world files, so it is observable rather than silent: the
//! [`CastReport`] counts coerced-to-null cells per column.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::types::{ColumnType, RawTable, Schema, TypedTable, Value};

/// Per-column counts of non-empty cells that failed their cast and were
/// coerced to null. Empty/missing cells are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastReport {
    /// Column name to coerced-cell count; only columns with at least one
    /// coercion appear.
    pub coerced: BTreeMap<String, usize>,
}

impl CastReport {
    /// Total coerced cells across all columns.
    pub fn total(&self) -> usize {
        self.coerced.values().sum()
    }

    fn record(&mut self, column: &str) {
        *self.coerced.entry(column.to_string()).or_insert(0) += 1;
    }
}

/// Cast a raw table into the schema's typed, ordered column layout.
///
/// - Columns missing from the raw table are materialized as all-null.
/// - Raw columns not named by the schema are dropped (validation flags them
///   before this stage unless explicitly disabled).
/// - Each cell is cast per the column's [`ColumnType`]; failures become null
///   and are counted in the returned [`CastReport`].
pub fn apply_schema(raw: &RawTable, schema: &Schema) -> (TypedTable, CastReport) {
    let mut report = CastReport::default();

    // Schema column -> raw column position, if the file carried it.
    let projection: Vec<Option<usize>> = schema
        .columns
        .iter()
        .map(|c| raw.column_index(&c.name))
        .collect();

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(raw.rows.len());
    for raw_row in &raw.rows {
        let mut row: Vec<Value> = Vec::with_capacity(schema.columns.len());
        for (column, idx) in schema.columns.iter().zip(&projection) {
            let cell = idx
                .and_then(|i| raw_row.get(i))
                .and_then(|c| c.as_deref());
            let (value, coerced) = cast_cell(column.column_type, cell);
            if coerced {
                report.record(&column.name);
            }
            row.push(value);
        }
        rows.push(row);
    }

    (TypedTable::new(schema.ordered_names(), rows), report)
}

/// Cast one cell. Returns the value and whether a non-empty input was
/// coerced to null.
fn cast_cell(column_type: ColumnType, raw: Option<&str>) -> (Value, bool) {
    let Some(raw) = raw else {
        return (Value::Null, false);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return (Value::Null, false);
    }

    let value = match column_type {
        ColumnType::Text | ColumnType::Category => Some(Value::Text(trimmed.to_string())),
        ColumnType::Integer => parse_integer(trimmed).map(Value::Int),
        ColumnType::Float => parse_float(trimmed).map(Value::Float),
        ColumnType::Bool => parse_bool(trimmed).map(Value::Bool),
        ColumnType::Date => parse_datetime_dayfirst(trimmed).map(|dt| Value::Date(dt.date())),
        ColumnType::DateTime => parse_datetime_dayfirst(trimmed).map(Value::DateTime),
    };

    match value {
        Some(v) => (v, false),
        None => (Value::Null, true),
    }
}

/// Normalize a Brazilian-locale numeric string to a parseable form.
///
/// `"1.234,56"` becomes `"1234.56"`; the degenerate `"84;51"` (decimal comma
/// typed as semicolon) becomes `"84.51"`. Steps: strip spaces, map `,` and
/// `;` to `.`, then drop every `.` that reads as a thousands separator (a
/// digit before it, exactly three digits after it up to a non-digit or the
/// end of the string).
fn normalize_decimal(s: &str) -> String {
    let swapped: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' || c == ';' { '.' } else { c })
        .collect();

    let chars: Vec<char> = swapped.chars().collect();
    let mut out = String::with_capacity(chars.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == '.' && is_thousands_separator(&chars, i) {
            continue;
        }
        out.push(c);
    }
    out
}

fn is_thousands_separator(chars: &[char], dot: usize) -> bool {
    if dot == 0 || !chars[dot - 1].is_ascii_digit() {
        return false;
    }
    let digits_after = chars[dot + 1..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    digits_after == 3
}

fn parse_float(s: &str) -> Option<f64> {
    normalize_decimal(s).parse::<f64>().ok()
}

fn parse_integer(s: &str) -> Option<i64> {
    let v = parse_float(s)?;
    let rounded = v.round();
    // Tolerate ordinary float noise but reject genuinely fractional values.
    if (v - rounded).abs() < 1e-9 && rounded >= i64::MIN as f64 && rounded <= i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "t" | "1" | "sim" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "nao" | "não" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Day-first datetime formats, most specific first.
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
];

/// Parse with day-before-month disambiguation preference.
///
/// ISO year-first forms are still accepted; ambiguous `a/b/Y` input is always
/// read as day/month/year.
fn parse_datetime_dayfirst(s: &str) -> Option<NaiveDateTime> {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

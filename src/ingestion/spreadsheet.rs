//! Spreadsheet (Excel/ODS) raw reader.
//!
//! Reads one worksheet into a text-only [`RawTable`]. Header and data-start
//! rows are configurable (defaults: header on the first used row, data from
//! the next). When the schema declares column names they are assigned
//! positionally; surplus physical columns keep synthetic `col_N` names and
//! missing ones are left for the casting stage to materialize.

use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};

use crate::error::{IngestError, IngestResult};
use crate::types::{RawTable, SheetOptions};

/// Read one sheet of a workbook into a [`RawTable`].
///
/// Sheet precedence: explicit `sheet_name` argument, then the descriptor's
/// default sheet, then the first sheet in the workbook.
pub fn read_spreadsheet(
    path: impl AsRef<Path>,
    sheet_name: Option<&str>,
    schema_names: Option<&[String]>,
    opts: &SheetOptions,
) -> IngestResult<RawTable> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet = match sheet_name.or(opts.sheet_name.as_deref()) {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| IngestError::invalid_input("workbook has no sheets"))?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    sheet_range_to_raw(&range, schema_names, opts)
}

/// Convert a worksheet cell range into a text-only [`RawTable`].
pub fn sheet_range_to_raw(
    range: &Range<Data>,
    schema_names: Option<&[String]>,
    opts: &SheetOptions,
) -> IngestResult<RawTable> {
    let all_rows: Vec<&[Data]> = range.rows().collect();
    if all_rows.len() <= opts.start_row {
        return Ok(RawTable::default());
    }

    let width = range.get_size().1;

    let (mut headers, data_from) = if opts.has_header {
        let header_cells = all_rows[opts.start_row];
        let headers: Vec<String> = (0..width)
            .map(|i| {
                header_cells
                    .get(i)
                    .map(|c| cell_to_string(c).trim().to_string())
                    .unwrap_or_default()
            })
            .collect();
        (headers, opts.start_row + 1)
    } else {
        (synthetic_names(width), opts.start_row)
    };

    let mut rows: Vec<Vec<Option<String>>> = Vec::with_capacity(all_rows.len() - data_from);
    for cells in &all_rows[data_from..] {
        let row: Vec<Option<String>> = (0..width)
            .map(|i| {
                let cell = cells.get(i).unwrap_or(&Data::Empty);
                match cell {
                    Data::Empty => opts.fill_empty_with.clone(),
                    other => Some(cell_to_string(other)),
                }
            })
            .collect();
        rows.push(row);
    }

    // A source-side index column is dropped before positional naming.
    if let Some(index_col) = opts.index_col {
        if index_col < headers.len() {
            headers.remove(index_col);
            for row in &mut rows {
                row.remove(index_col);
            }
        }
    }

    if let Some(names) = schema_names {
        headers = reconcile_positional_names(names, headers.len());
    }

    Ok(RawTable::new(headers, rows))
}

/// Assign schema-declared names positionally to `width` physical columns.
///
/// More physical columns than declared names: the surplus keeps synthetic
/// names. More declared names than physical columns: the excess names are not
/// invented here (the casting stage materializes them as all-null columns).
fn reconcile_positional_names(names: &[String], width: usize) -> Vec<String> {
    let mut out: Vec<String> = names.iter().take(width).cloned().collect();
    for i in out.len()..width {
        out.push(format!("col_{}", i + 1));
    }
    out
}

fn synthetic_names(width: usize) -> Vec<String> {
    (0..width).map(|i| format!("col_{}", i + 1)).collect()
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // Whole-valued floats print without the trailing ".0" so integer
            // columns survive the text round-trip.
            if f.fract() == 0.0 && f.abs() < 1e15 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => naive.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_from(rows: Vec<Vec<Data>>) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height.saturating_sub(1), width.saturating_sub(1)));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), cell);
            }
        }
        range
    }

    #[test]
    fn header_row_and_text_cells() {
        let range = range_from(vec![
            vec![Data::String("ID".into()), Data::String("NM".into())],
            vec![Data::Float(1.0), Data::String("Ada".into())],
            vec![Data::Float(2.5), Data::Empty],
        ]);
        let raw = sheet_range_to_raw(&range, None, &SheetOptions::default()).unwrap();
        assert_eq!(raw.headers, vec!["ID", "NM"]);
        assert_eq!(raw.rows[0][0].as_deref(), Some("1"));
        assert_eq!(raw.rows[1][0].as_deref(), Some("2.5"));
        assert_eq!(raw.rows[1][1], None);
    }

    #[test]
    fn fill_token_replaces_empty_cells() {
        let opts = SheetOptions {
            fill_empty_with: Some(String::new()),
            ..SheetOptions::default()
        };
        let range = range_from(vec![
            vec![Data::String("A".into())],
            vec![Data::Empty],
        ]);
        let raw = sheet_range_to_raw(&range, None, &opts).unwrap();
        assert_eq!(raw.rows[0][0].as_deref(), Some(""));
    }

    #[test]
    fn positional_schema_names_with_surplus_physical_columns() {
        let names = vec!["ID".to_string()];
        let range = range_from(vec![
            vec![Data::String("a".into()), Data::String("b".into())],
            vec![Data::Int(1), Data::Int(2)],
        ]);
        let raw = sheet_range_to_raw(&range, Some(&names), &SheetOptions::default()).unwrap();
        assert_eq!(raw.headers, vec!["ID", "col_2"]);
    }

    #[test]
    fn headerless_sheet_gets_synthetic_names() {
        let opts = SheetOptions {
            has_header: false,
            ..SheetOptions::default()
        };
        let range = range_from(vec![vec![Data::Int(1), Data::Int(2)]]);
        let raw = sheet_range_to_raw(&range, None, &opts).unwrap();
        assert_eq!(raw.headers, vec!["col_1", "col_2"]);
        assert_eq!(raw.rows.len(), 1);
    }

    #[test]
    fn index_column_is_dropped() {
        let opts = SheetOptions {
            index_col: Some(0),
            ..SheetOptions::default()
        };
        let range = range_from(vec![
            vec![Data::String("idx".into()), Data::String("NM".into())],
            vec![Data::Int(0), Data::String("Ada".into())],
        ]);
        let raw = sheet_range_to_raw(&range, None, &opts).unwrap();
        assert_eq!(raw.headers, vec!["NM"]);
        assert_eq!(raw.rows[0], vec![Some("Ada".to_string())]);
    }

    #[test]
    fn start_row_past_data_yields_empty_table() {
        let opts = SheetOptions {
            start_row: 5,
            ..SheetOptions::default()
        };
        let range = range_from(vec![vec![Data::Int(1)]]);
        let raw = sheet_range_to_raw(&range, None, &opts).unwrap();
        assert!(raw.headers.is_empty());
        assert!(raw.rows.is_empty());
    }
}

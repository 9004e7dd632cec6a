use std::path::Path;

use rust_xlsxwriter::Workbook;

use schema_ingest::IngestError;
use schema_ingest::ingestion::{ReadOptions, read_from_path};
use schema_ingest::schema;
use schema_ingest::types::{ColumnSpec, ColumnType, Schema, Value};

fn saldos_schema() -> Schema {
    Schema::new(vec![
        ColumnSpec::new("ID_CONTA", ColumnType::Integer),
        ColumnSpec::new("NM_TITULAR", ColumnType::Text),
        ColumnSpec::new("VL_SALDO", ColumnType::Float),
    ])
}

fn write_saldos_xlsx(path: &Path, extra_column: bool) {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Plan1").unwrap();

    ws.write_string(0, 0, "id da conta").unwrap();
    ws.write_string(0, 1, "titular").unwrap();
    ws.write_string(0, 2, "saldo").unwrap();
    if extra_column {
        ws.write_string(0, 3, "observação").unwrap();
    }

    ws.write_number(1, 0, 1.0).unwrap();
    ws.write_string(1, 1, "Ada").unwrap();
    ws.write_number(1, 2, 98.5).unwrap();
    if extra_column {
        ws.write_string(1, 3, "vip").unwrap();
    }

    ws.write_number(2, 0, 2.0).unwrap();
    ws.write_string(2, 1, "Grace").unwrap();
    ws.write_number(2, 2, 87.25).unwrap();
    if extra_column {
        ws.write_string(2, 3, "").unwrap();
    }

    wb.save(path).unwrap();
}

#[test]
fn workbook_columns_take_schema_names_positionally() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saldos.xlsx");
    write_saldos_xlsx(&path, false);

    let table = read_from_path(&path, &saldos_schema(), &ReadOptions::default()).unwrap();
    assert_eq!(table.columns, vec!["ID_CONTA", "NM_TITULAR", "VL_SALDO"]);
    assert_eq!(table.row_count(), 2);
    // Whole-valued floats survive the text round-trip as integers.
    assert_eq!(table.rows[0][0], Value::Int(1));
    assert_eq!(table.rows[1][2], Value::Float(87.25));
}

#[test]
fn surplus_physical_columns_fail_validation_with_synthetic_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saldos_extra.xlsx");
    write_saldos_xlsx(&path, true);

    let err = read_from_path(&path, &saldos_schema(), &ReadOptions::default()).unwrap_err();
    match err {
        IngestError::HeaderMismatch { missing, extra } => {
            assert!(missing.is_empty());
            assert_eq!(extra, vec!["col_4"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn surplus_columns_are_dropped_when_validation_is_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saldos_extra2.xlsx");
    write_saldos_xlsx(&path, true);

    let opts = ReadOptions {
        skip_validation: true,
        ..Default::default()
    };
    let table = read_from_path(&path, &saldos_schema(), &opts).unwrap();
    assert_eq!(table.columns, vec!["ID_CONTA", "NM_TITULAR", "VL_SALDO"]);
    assert_eq!(table.row_count(), 2);
}

#[test]
fn flat_descriptor_matches_headers_not_positions() {
    let dir = tempfile::tempdir().unwrap();
    let schema_path = dir.path().join("colunas.json");
    std::fs::write(&schema_path, r#"{"B_COL": "int", "A_COL": "int"}"#).unwrap();

    // Physical header order matches the descriptor's declaration order here,
    // but the values must land under their header names either way.
    let path = dir.path().join("colunas.xlsx");
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.write_string(0, 0, "B_COL").unwrap();
    ws.write_string(0, 1, "A_COL").unwrap();
    ws.write_number(1, 0, 1.0).unwrap();
    ws.write_number(1, 1, 2.0).unwrap();
    wb.save(&path).unwrap();

    let descriptor = schema::load(&schema_path).unwrap();
    assert_eq!(descriptor.ordered_names(), vec!["B_COL", "A_COL"]);

    let table = read_from_path(&path, &descriptor, &ReadOptions::default()).unwrap();
    assert_eq!(table.columns, vec!["B_COL", "A_COL"]);
    assert_eq!(table.rows[0][0], Value::Int(1));
    assert_eq!(table.rows[0][1], Value::Int(2));
}

#[test]
fn flat_descriptor_follows_reordered_headers() {
    let dir = tempfile::tempdir().unwrap();
    let schema_path = dir.path().join("colunas.json");
    std::fs::write(&schema_path, r#"{"B_COL": "int", "A_COL": "int"}"#).unwrap();

    // Header row in the opposite order of the descriptor: values must still
    // follow their headers, never their positions.
    let path = dir.path().join("invertido.xlsx");
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.write_string(0, 0, "A_COL").unwrap();
    ws.write_string(0, 1, "B_COL").unwrap();
    ws.write_number(1, 0, 2.0).unwrap();
    ws.write_number(1, 1, 1.0).unwrap();
    wb.save(&path).unwrap();

    let descriptor = schema::load(&schema_path).unwrap();
    let table = read_from_path(&path, &descriptor, &ReadOptions::default()).unwrap();
    assert_eq!(table.columns, vec!["B_COL", "A_COL"]);
    assert_eq!(table.rows[0][0], Value::Int(1));
    assert_eq!(table.rows[0][1], Value::Int(2));
}

#[test]
fn named_sheet_is_selected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("duas_abas.xlsx");

    let mut wb = Workbook::new();
    let vazia = wb.add_worksheet();
    vazia.set_name("Vazia").unwrap();
    vazia.write_string(0, 0, "nada").unwrap();
    let ws = wb.add_worksheet();
    ws.set_name("Dados").unwrap();
    ws.write_string(0, 0, "a").unwrap();
    ws.write_string(0, 1, "b").unwrap();
    ws.write_string(0, 2, "c").unwrap();
    ws.write_number(1, 0, 5.0).unwrap();
    ws.write_string(1, 1, "x").unwrap();
    ws.write_number(1, 2, 1.25).unwrap();
    wb.save(&path).unwrap();

    let opts = ReadOptions {
        sheet_name: Some("Dados".to_string()),
        ..Default::default()
    };
    let table = read_from_path(&path, &saldos_schema(), &opts).unwrap();
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.rows[0][0], Value::Int(5));
}

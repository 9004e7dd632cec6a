use chrono::NaiveDate;

use schema_ingest::IngestError;
use schema_ingest::ingestion::{ReadOptions, read_from_path, read_from_path_with_report};
use schema_ingest::schema;
use schema_ingest::types::{Schema, TypedTable, Value};

fn acesso_schema() -> Schema {
    schema::load("tests/fixtures/acesso_basico.json").unwrap()
}

#[test]
fn read_csv_with_accented_headers_happy_path() {
    let schema = acesso_schema();
    let table = read_from_path(
        "tests/fixtures/dados_site_a.csv",
        &schema,
        &ReadOptions::default(),
    )
    .unwrap();

    assert_eq!(table.columns, vec![
        "ID_USUARIO",
        "NM_USUARIO",
        "VL_SALDO",
        "FL_ATIVO",
        "DT_ACESSO",
    ]);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.rows[0], vec![
        Value::Int(1),
        Value::Text("Ada".to_string()),
        Value::Float(1234.56),
        Value::Bool(true),
        Value::Date(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()),
    ]);
    // The quoted "84;51" cell is a decimal comma typed as semicolon.
    assert_eq!(table.rows[1][2], Value::Float(84.51));
    assert_eq!(table.rows[1][3], Value::Bool(false));
    assert_eq!(
        table.rows[1][4],
        Value::Date(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
    );
}

#[test]
fn aliases_close_header_mismatches() {
    let schema = acesso_schema();
    let table = read_from_path(
        "tests/fixtures/dados_site_b.csv",
        &schema,
        &ReadOptions::default(),
    )
    .unwrap();
    assert_eq!(table.rows[0][0], Value::Int(7));
    assert_eq!(table.rows[0][1], Value::Text("Katherine".to_string()));
    assert_eq!(table.rows[0][2], Value::Float(10.5));
}

#[test]
fn missing_column_is_a_header_mismatch_naming_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("faltando.csv");
    std::fs::write(&path, "ID_USUARIO;NM_USUARIO;VL_SALDO;FL_ATIVO\n1;Ada;1;sim\n").unwrap();

    let err = read_from_path(&path, &acesso_schema(), &ReadOptions::default()).unwrap_err();
    match err {
        IngestError::HeaderMismatch { missing, extra } => {
            assert_eq!(missing, vec!["DT_ACESSO"]);
            assert!(extra.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn skipping_validation_materializes_missing_columns_as_null() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parcial.csv");
    std::fs::write(&path, "ID_USUARIO\n1\n").unwrap();

    let opts = ReadOptions {
        skip_validation: true,
        ..Default::default()
    };
    let table = read_from_path(&path, &acesso_schema(), &opts).unwrap();
    assert_eq!(table.columns.len(), 5);
    assert_eq!(table.rows[0][0], Value::Int(1));
    assert!(table.rows[0][1..].iter().all(Value::is_null));
}

#[test]
fn malformed_cells_degrade_to_null_with_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sujo.csv");
    std::fs::write(
        &path,
        "ID_USUARIO;NM_USUARIO;VL_SALDO;FL_ATIVO;DT_ACESSO\nabc;Ada;talvez;quem sabe;ontem\n",
    )
    .unwrap();

    let (table, report) =
        read_from_path_with_report(&path, &acesso_schema(), &ReadOptions::default()).unwrap();
    assert_eq!(table.rows[0][0], Value::Null);
    assert_eq!(table.rows[0][1], Value::Text("Ada".to_string()));
    assert!(table.rows[0][2..].iter().all(Value::is_null));
    assert_eq!(report.total(), 4);
    assert_eq!(report.coerced.get("DT_ACESSO"), Some(&1));
}

fn to_csv_text(table: &TypedTable) -> String {
    let mut out = table.columns.join(";");
    out.push('\n');
    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|v| match v {
                Value::Null => String::new(),
                Value::Text(s) => s.clone(),
                Value::Int(i) => i.to_string(),
                Value::Float(f) => format!("{f}"),
                Value::Bool(b) => b.to_string(),
                Value::Date(d) => d.format("%d/%m/%Y").to_string(),
                Value::DateTime(dt) => dt.format("%d/%m/%Y %H:%M:%S").to_string(),
            })
            .collect();
        out.push_str(&cells.join(";"));
        out.push('\n');
    }
    out
}

#[test]
fn round_trip_preserves_row_count_and_column_order() {
    let schema = acesso_schema();
    let table = read_from_path(
        "tests/fixtures/dados_site_a.csv",
        &schema,
        &ReadOptions::default(),
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reescrito.csv");
    std::fs::write(&path, to_csv_text(&table)).unwrap();

    let again = read_from_path(&path, &schema, &ReadOptions::default()).unwrap();
    assert_eq!(again.row_count(), table.row_count());
    assert_eq!(again.columns, table.columns);
    assert_eq!(again.rows[0][0], Value::Int(1));
}

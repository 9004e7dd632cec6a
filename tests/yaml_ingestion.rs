use schema_ingest::ingestion::{ReadOptions, read_from_path};
use schema_ingest::types::{ColumnSpec, ColumnType, Schema, Value};

fn inventario_schema() -> Schema {
    Schema::new(vec![
        ColumnSpec::new("NM_HOST", ColumnType::Text),
        ColumnSpec::new("QT_CPU", ColumnType::Integer),
        ColumnSpec::new("FL_PRODUCAO", ColumnType::Bool),
    ])
}

#[test]
fn yaml_sequence_reads_row_wise() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventario.yaml");
    std::fs::write(
        &path,
        "- nm_host: web01\n  qt_cpu: 8\n  fl_producao: sim\n\
         - nm_host: db01\n  qt_cpu: 16\n  fl_producao: nao\n",
    )
    .unwrap();

    let table = read_from_path(&path, &inventario_schema(), &ReadOptions::default()).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.rows[0], vec![
        Value::Text("web01".to_string()),
        Value::Int(8),
        Value::Bool(true),
    ]);
    assert_eq!(table.rows[1][2], Value::Bool(false));
}

#[test]
fn yaml_single_mapping_flattens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("host.yml");
    std::fs::write(
        &path,
        "nm_host: web01\nspec:\n  qt_cpu: 4\n",
    )
    .unwrap();

    let schema = Schema::new(vec![
        ColumnSpec::new("NM_HOST", ColumnType::Text),
        ColumnSpec::new("SPEC_QT_CPU", ColumnType::Integer),
    ]);
    let table = read_from_path(&path, &schema, &ReadOptions::default()).unwrap();
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.rows[0][1], Value::Int(4));
}

#[test]
fn yaml_missing_keys_become_nulls_per_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parcial.yml");
    std::fs::write(
        &path,
        "- nm_host: web01\n  qt_cpu: 8\n  fl_producao: sim\n- nm_host: db01\n  qt_cpu: 16\n",
    )
    .unwrap();

    let table = read_from_path(&path, &inventario_schema(), &ReadOptions::default()).unwrap();
    assert_eq!(table.rows[1][2], Value::Null);
}

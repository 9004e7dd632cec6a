//! YAML raw reader.
//!
//! Same shape rules as JSON: a sequence of mappings reads row-wise, a single
//! mapping flattens into one row. Implemented by converting the parsed YAML
//! document to a JSON value and reusing the JSON row assembly, so both
//! formats share one set of cell/flattening rules.

use std::fs;
use std::path::Path;

use crate::error::{IngestError, IngestResult};
use crate::ingestion::json::raw_from_value;
use crate::types::{Encoding, RawTable};

/// Read a YAML file into a [`RawTable`].
pub fn read_yaml(path: impl AsRef<Path>, encoding: Encoding) -> IngestResult<RawTable> {
    let bytes = fs::read(path)?;
    let text = encoding.decode(&bytes)?;
    read_yaml_from_str(&text)
}

/// Read YAML from an in-memory string.
pub fn read_yaml_from_str(text: &str) -> IngestResult<RawTable> {
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    let json = serde_json::to_value(&value)
        .map_err(|e| IngestError::invalid_input(format!("yaml is not tabular: {e}")))?;
    raw_from_value(json)
}

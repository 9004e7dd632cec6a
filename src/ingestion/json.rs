//! JSON raw reader.
//!
//! Supported inputs:
//! - a JSON array of objects: `[{"a":1}, {"a":2}]` (one row per object)
//! - a single object, flattened into one row with dot-path keys
//! - JSON-Lines (`{"a":1}\n{"a":2}\n`), auto-detected unless forced
//!
//! Every cell comes back as text or null: scalars are rendered to their
//! literal text, nested arrays/objects to their JSON text. Typing is the
//! casting stage's job.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value as Json};

use crate::error::{IngestError, IngestResult};
use crate::types::{Encoding, RawTable};

/// Sampled line budget for JSON-Lines detection.
const NDJSON_SAMPLE_LINES: usize = 20;
const NDJSON_MIN_LINES: usize = 3;
const NDJSON_MIN_RATIO: f64 = 0.6;

/// Read a JSON file into a [`RawTable`].
///
/// `json_lines` forces JSON-Lines parsing on/off; `None` auto-detects.
pub fn read_json(
    path: impl AsRef<Path>,
    json_lines: Option<bool>,
    encoding: Encoding,
) -> IngestResult<RawTable> {
    let bytes = fs::read(path)?;
    let text = encoding.decode(&bytes)?;
    read_json_from_str(&text, json_lines)
}

/// Read JSON from an in-memory string.
pub fn read_json_from_str(text: &str, json_lines: Option<bool>) -> IngestResult<RawTable> {
    let json_lines = json_lines.unwrap_or_else(|| looks_like_ndjson(text));

    if json_lines {
        let mut objects: Vec<Map<String, Json>> = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: Json = serde_json::from_str(line).map_err(|e| {
                IngestError::invalid_input(format!("invalid json-lines at line {}: {e}", i + 1))
            })?;
            match value {
                Json::Object(map) => objects.push(map),
                _ => {
                    return Err(IngestError::invalid_input(format!(
                        "json-lines line {} is not an object",
                        i + 1
                    )));
                }
            }
        }
        return Ok(rows_from_objects(objects));
    }

    let value: Json = serde_json::from_str(text.trim())?;
    raw_from_value(value)
}

/// Assemble a [`RawTable`] from a parsed top-level JSON value.
pub(crate) fn raw_from_value(value: Json) -> IngestResult<RawTable> {
    match value {
        Json::Array(items) => {
            let mut objects = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                match item {
                    Json::Object(map) => objects.push(map),
                    _ => {
                        return Err(IngestError::invalid_input(format!(
                            "array element {} is not an object",
                            i + 1
                        )));
                    }
                }
            }
            Ok(rows_from_objects(objects))
        }
        Json::Object(map) => {
            // A single object flattens into one row with dot-path keys.
            let mut flat = Map::new();
            flatten_into(&mut flat, String::new(), Json::Object(map));
            Ok(rows_from_objects(vec![flat]))
        }
        _ => Err(IngestError::invalid_input(
            "json must be an object, an array of objects, or json-lines",
        )),
    }
}

/// Build headers as the union of keys in first-seen order; rows align to that
/// union, missing keys become null cells.
fn rows_from_objects(objects: Vec<Map<String, Json>>) -> RawTable {
    let mut headers: Vec<String> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            headers
                .iter()
                .map(|key| obj.get(key).and_then(scalar_to_text))
                .collect()
        })
        .collect();

    RawTable::new(headers, rows)
}

fn scalar_to_text(value: &Json) -> Option<String> {
    match value {
        Json::Null => None,
        Json::String(s) => Some(s.clone()),
        Json::Bool(b) => Some(b.to_string()),
        Json::Number(n) => Some(n.to_string()),
        // Nested structures keep their JSON text; the schema decides whether
        // that is acceptable for the column.
        other => Some(other.to_string()),
    }
}

fn flatten_into(out: &mut Map<String, Json>, prefix: String, value: Json) {
    match value {
        Json::Object(map) => {
            for (key, v) in map {
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(out, path, v);
            }
        }
        other => {
            out.insert(prefix, other);
        }
    }
}

/// Sniff JSON-Lines: of the first 20 non-blank lines, at least 3 sampled and
/// at least 60% starting and ending with object delimiters.
pub fn looks_like_ndjson(text: &str) -> bool {
    let mut total = 0usize;
    let mut objects = 0usize;
    for line in text.lines().take(NDJSON_SAMPLE_LINES) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        total += 1;
        if line.starts_with('{') && line.ends_with('}') {
            objects += 1;
        }
    }
    total >= NDJSON_MIN_LINES && objects as f64 / total.max(1) as f64 >= NDJSON_MIN_RATIO
}

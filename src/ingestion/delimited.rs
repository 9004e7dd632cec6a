//! Delimited-text (CSV/TXT) raw reader.
//!
//! Header is always row 1. If no delimiter is configured, it is detected by
//! sampling the first 64 KiB and picking the most frequent candidate among
//! `, ; | TAB`, defaulting to `;` when none appears. Every cell comes back as
//! text; no numeric or date inference happens here.

use std::fs;
use std::path::Path;

use crate::error::IngestResult;
use crate::types::{Encoding, RawTable};

/// Candidate delimiters, checked by frequency in the sampled prefix.
const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'|', b'\t'];

const DETECTION_SAMPLE_BYTES: usize = 64 * 1024;

/// Read a delimited text file into a [`RawTable`].
pub fn read_delimited(
    path: impl AsRef<Path>,
    delimiter: Option<u8>,
    encoding: Encoding,
) -> IngestResult<RawTable> {
    let bytes = fs::read(path)?;
    let text = encoding.decode(&bytes)?;
    read_delimited_from_str(&text, delimiter)
}

/// Read delimited text from an in-memory string.
pub fn read_delimited_from_str(text: &str, delimiter: Option<u8>) -> IngestResult<RawTable> {
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(text));

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut row: Vec<Option<String>> = Vec::with_capacity(headers.len());
        for i in 0..headers.len() {
            row.push(record.get(i).map(str::to_string));
        }
        rows.push(row);
    }

    Ok(RawTable::new(headers, rows))
}

/// Pick the delimiter by frequency analysis over the first 64 KiB.
pub fn detect_delimiter(text: &str) -> u8 {
    let sample = &text.as_bytes()[..text.len().min(DETECTION_SAMPLE_BYTES)];
    let best = DELIMITER_CANDIDATES
        .into_iter()
        .map(|d| (d, sample.iter().filter(|&&b| b == d).count()))
        .max_by_key(|&(_, count)| count);
    match best {
        Some((d, count)) if count > 0 => d,
        _ => b';',
    }
}

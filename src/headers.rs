//! Header normalization, reconciliation and validation.
//!
//! File producers spell headers inconsistently (case, accents, spacing,
//! punctuation). Reconciliation normalizes both the raw headers and the
//! schema's expected names to a canonical form, then maps raw labels onto
//! schema names; whatever stays unmapped is the validator's problem, never
//! silently dropped.

use std::collections::BTreeMap;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::error::{IngestError, IngestResult};
use crate::types::Schema;

/// Mapping from raw-file column label to schema column name.
///
/// Built fresh per file; deterministic iteration order for stable logging.
pub type RenameMap = BTreeMap<String, String>;

/// Normalize a header string for comparison.
///
/// Trim, NFKD-decompose and drop combining marks (and any remaining non-ASCII
/// character), replace every non-alphanumeric character with `_`, upper-case,
/// collapse consecutive underscores, trim leading/trailing underscores.
/// Idempotent: normalizing an already-normalized name is a no-op.
pub fn normalize_header(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_underscore = false;
    for ch in name.trim().nfkd() {
        if is_combining_mark(ch) || !ch.is_ascii() {
            continue;
        }
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_uppercase());
            last_was_underscore = false;
        } else if !last_was_underscore {
            out.push('_');
            last_was_underscore = true;
        }
    }
    out.trim_matches('_').to_string()
}

/// Build a [`RenameMap`] from a file's raw headers onto schema column names.
///
/// Matching precedence per raw header:
///
/// 1. normalized raw header equals a normalized expected name
/// 2. normalized raw header equals a normalized alias (or declared
///    `source`/`source_name`) of some expected name
/// 3. no match: the header is left out of the map and passes through
///    unchanged, to be flagged by [`validate_columns`]
pub fn build_rename_map(raw_headers: &[String], schema: &Schema) -> RenameMap {
    let mut expected_by_norm: BTreeMap<String, &str> = BTreeMap::new();
    for column in &schema.columns {
        expected_by_norm
            .entry(normalize_header(&column.name))
            .or_insert(column.name.as_str());
    }

    let mut alias_by_norm: BTreeMap<String, &str> = BTreeMap::new();
    for column in &schema.columns {
        for alias in &column.aliases {
            alias_by_norm
                .entry(normalize_header(alias))
                .or_insert(column.name.as_str());
        }
    }

    let mut renames = RenameMap::new();
    for raw in raw_headers {
        let norm = normalize_header(raw);
        let target = expected_by_norm
            .get(&norm)
            .or_else(|| alias_by_norm.get(&norm));
        if let Some(&target) = target {
            if raw != target {
                renames.insert(raw.clone(), target.to_string());
            }
        }
    }
    renames
}

/// Compare reconciled headers against the expected column list.
///
/// Runs strictly after renaming and before casting, so alias resolution has
/// already closed purely cosmetic mismatches. Fails closed with
/// [`IngestError::HeaderMismatch`] enumerating both the missing expected
/// columns and the unexpected extras, each in their declaration/file order.
pub fn validate_columns(got: &[String], expected: &[String]) -> IngestResult<()> {
    if expected.is_empty() {
        return Ok(());
    }
    let missing: Vec<String> = expected
        .iter()
        .filter(|e| !got.contains(e))
        .cloned()
        .collect();
    let extra: Vec<String> = got
        .iter()
        .filter(|g| !expected.contains(g))
        .cloned()
        .collect();
    if missing.is_empty() && extra.is_empty() {
        Ok(())
    } else {
        Err(IngestError::HeaderMismatch { missing, extra })
    }
}

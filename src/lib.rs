//! `schema-ingest` ingests heterogeneous tabular files (delimited text,
//! spreadsheets, JSON, YAML) into a uniform, strictly typed
//! [`types::TypedTable`], driven entirely by an externally supplied schema
//! descriptor. File producers are inconsistent in encodings, delimiters,
//! header spellings and locale conventions; downstream consumers need a fixed
//! column set, fixed order and fixed types, with zero silent type inference.
//!
//! The primary entrypoints are [`ingestion::read_from_path`] (one file) and
//! [`ingestion::read_folder`] (batch-assemble a drop folder, with a
//! provenance column recording each row's source file).
//!
//! ## Pipeline
//!
//! 1. [`schema`]: load the descriptor into a [`types::Schema`] (ordered typed
//!    columns + read configuration). Loaded once, shared read-only.
//! 2. [`ingestion`]: a format reader turns the physical file into a text-only
//!    [`types::RawTable`]; no numeric or date inference happens here.
//! 3. [`headers`]: raw headers are normalized (case, accents, punctuation)
//!    and reconciled onto schema names, honoring declared aliases; the
//!    reconciled set is validated against the schema and fails closed on
//!    mismatch.
//! 4. [`cast`]: every cell is cast per its column's declared type. Malformed
//!    cells degrade to null; the [`cast::CastReport`] counts them per column.
//!
//! ## Quick example
//!
//! ```no_run
//! use schema_ingest::ingestion::{read_folder, FolderOptions, read_from_path, ReadOptions};
//! use schema_ingest::schema;
//!
//! # fn main() -> Result<(), schema_ingest::IngestError> {
//! let descriptor = schema::load("schemas/csv/acesso_basico.json")?;
//!
//! // One file, format picked by extension.
//! let table = read_from_path("in/dados_2024.csv", &descriptor, &ReadOptions::default())?;
//! println!("rows={}", table.row_count());
//!
//! // A whole drop folder, concatenated in deterministic order.
//! let batch = read_folder("in", &descriptor, &FolderOptions::with_pattern("*dados*"))?;
//! println!("rows={}", batch.row_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`schema`]: descriptor loading and normalization
//! - [`headers`]: header normalization, rename maps, column validation
//! - [`ingestion`]: per-format raw readers, single-file pipeline, folder
//!   batch assembly
//! - [`cast`]: schema-driven type casting with coercion diagnostics
//! - [`types`]: schema + table data model
//! - [`logging`]: the logger collaborator interface
//! - [`error`]: the shared error taxonomy

pub mod cast;
pub mod error;
pub mod headers;
pub mod ingestion;
pub mod logging;
pub mod schema;
pub mod types;

pub use error::{IngestError, IngestResult};

//! Ingestion entrypoints and format-specific readers.
//!
//! Most callers should use [`read_from_path`] for one file (format picked by
//! extension) or [`read_folder`] for a whole drop folder. Format-specific raw
//! readers are also available under:
//!
//! - [`delimited`]
//! - [`spreadsheet`]
//! - [`json`]
//! - [`yaml`]

pub mod delimited;
pub mod folder;
pub mod json;
pub mod spreadsheet;
pub mod unified;
pub mod yaml;

pub use folder::{
    DEFAULT_PROVENANCE_COLUMN, FolderOptions, PickBy, discover_files, pick_file_from_folder,
    read_folder, read_folder_with_report,
};
pub use unified::{FileFormat, ReadOptions, read_from_path, read_from_path_with_report};

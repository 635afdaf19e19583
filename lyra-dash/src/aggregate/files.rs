//! File name helpers

use lyra_common::db::Table;
use lyra_common::Result;
use serde_json::Value;

use super::derive_column;

/// Lowercased text after the last `.` of a file name
///
/// A name without any `.` is returned whole (lowercased). A name ending in
/// `.` yields the empty string.
pub fn file_extension(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or(filename)
        .to_lowercase()
}

/// Add an `extension` column derived from `filename`
///
/// NULL file names and empty extensions become NULL so they drop out of
/// every count.
pub fn with_extension_column(files: &Table) -> Result<Table> {
    derive_column(files, "filename", "extension", |value| {
        match value.as_str().map(file_extension) {
            Some(ext) if !ext.is_empty() => Value::String(ext),
            _ => Value::Null,
        }
    })
}

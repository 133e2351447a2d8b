//! Reading the CSV exports of the legacy workbook.

use super::ImportError;
use std::path::{Path, PathBuf};

/// Locate a sheet: `path` is either the sheet's CSV file or a directory holding
/// `<sheet>.csv`.
pub fn resolve(path: &Path, sheet: &str) -> Result<PathBuf, ImportError> {
    if path.is_dir() {
        let candidate = path.join(format!("{sheet}.csv"));
        if candidate.is_file() {
            Ok(candidate)
        } else {
            Err(ImportError::MissingSheet {
                sheet: sheet.to_string(),
                path: path.to_path_buf(),
            })
        }
    } else if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(ImportError::Unreadable {
            path: path.to_path_buf(),
            source: csv::Error::from(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such file or directory",
            )),
        })
    }
}

/// Read every data row of a sheet (the header row is dropped), cells trimmed.
///
/// Rows may have any length; column checks belong to the caller. Cells that are not valid
/// UTF-8 (legacy exports are often Windows-1252) are decoded lossily instead of failing the
/// sheet; only I/O and framing errors are fatal.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>, ImportError> {
    let unreadable = |source: csv::Error| ImportError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(unreadable)?;

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(unreadable)?;
        rows.push(record.iter().map(decode_cell).collect());
    }
    if !rows.is_empty() {
        rows.remove(0);
    }
    Ok(rows)
}

fn decode_cell(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim().to_string()
}

/// Trimmed cell `idx`, or `""` past the end of the row.
pub fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

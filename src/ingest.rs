use csv::{ReaderBuilder, Trim};
use pivot::{Record, Value};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// `*.csv` files directly inside `folder`, sorted by path.
pub fn csv_files(folder: &Path) -> Result<Vec<PathBuf>> {
  if !folder.is_dir() {
    return Err(Error::IOError(format!("{} is not a folder", folder.display())));
  }

  let mut files = vec![];
  for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
    let entry = entry?;
    let path = entry.path();
    let is_csv = path.extension().and_then(|e| e.to_str()).map(|e| e.eq_ignore_ascii_case("csv")).unwrap_or(false);
    if entry.file_type().is_file() && is_csv {
      files.push(path.to_path_buf());
    }
  }
  files.sort();
  Ok(files)
}

/// Reads one export. Every row becomes a record keyed by header; empty cells are blank.
/// The header must contain each of `required`.
pub fn read_csv(path: &Path, required: &[&str]) -> Result<Vec<Record>> {
  let mut reader = ReaderBuilder::new().delimiter(b',').trim(Trim::All).from_path(path)?;

  let headers: Vec<String> =
    reader.headers()?.iter().map(|h| h.trim_start_matches('\u{feff}').to_string()).collect();

  if let Some(column) = required.iter().find(|c| !headers.iter().any(|h| h == *c)) {
    return Err(Error::Schema(path.display().to_string(), column.to_string()));
  }

  let mut records = vec![];
  for row in reader.records() {
    let row = row?;
    let record: Record = headers
      .iter()
      .zip(row.iter())
      .map(|(h, v)| (h.as_str(), if v.is_empty() { Value::Blank } else { Value::text(v) }))
      .collect();
    records.push(record);
  }
  Ok(records)
}

/// Concatenates the rows of all `files`, in file order.
pub fn read_files(files: &[PathBuf], required: &[&str]) -> Result<Vec<Record>> {
  let mut records = vec![];
  for file in files {
    let rows = read_csv(file, required)?;
    log::info!("{} rows read from {}", rows.len(), file.display());
    records.extend(rows);
  }
  Ok(records)
}

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::Result;
use crate::ingest::csv_files;
use crate::settings::Settings;

fn output_files(folder: &Path) -> Result<Vec<PathBuf>> {
  let mut files = vec![];
  for entry in WalkDir::new(folder).min_depth(1).max_depth(1).sort_by_file_name() {
    let entry = entry?;
    if entry.file_type().is_file() {
      files.push(entry.into_path());
    }
  }
  Ok(files)
}

/// Removes yesterday's reports and the exports they were built from.
pub fn clean_up(settings: &Settings) -> Result<Vec<PathBuf>> {
  let report = &settings.report;
  let mut targets = vec![];

  if report.output.is_dir() {
    targets.extend(output_files(&report.output)?);
  } else {
    log::warn!("Output folder {} not found", report.output.display());
  }

  if report.input.is_dir() {
    targets.extend(csv_files(&report.input)?);
  } else {
    log::warn!("Input folder {} not found", report.input.display());
  }

  for path in &targets {
    fs::remove_file(path)?;
    log::info!("Deleted file: {}", path.display());
  }
  Ok(targets)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deletes_reports_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::in_folder(dir.path());
    fs::create_dir_all(&settings.report.output).unwrap();
    fs::create_dir_all(&settings.report.input).unwrap();

    let report = settings.report.output.join("Formated Table 08-01-2024.xlsx");
    let export = settings.report.input.join("orders-1.csv");
    let readme = settings.report.input.join("README.txt");
    fs::write(&report, "x").unwrap();
    fs::write(&export, "x").unwrap();
    fs::write(&readme, "x").unwrap();

    let deleted = clean_up(&settings).unwrap();

    assert_eq!(deleted, vec![report.clone(), export.clone()]);
    assert!(!report.exists());
    assert!(!export.exists());
    assert!(readme.exists());
  }

  #[test]
  fn missing_folders_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    assert!(clean_up(&Settings::in_folder(dir.path())).unwrap().is_empty());
  }
}

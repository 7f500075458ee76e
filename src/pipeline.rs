use chrono::NaiveDate;
use pivot::{aggregate, inject_totals, AnnotatedTable, Record};
use std::path::PathBuf;

use crate::cleaning::{clean_for_report, transform};
use crate::error::Result;
use crate::ingest::{csv_files, read_files};
use crate::persistence::OrdersDb;
use crate::report::{write_report, ReportFormat};
use crate::settings::Settings;
use crate::sources::{detect, SourceKind};

/// Cleans, groups and totals the rows of one source.
pub fn build_report(kind: SourceKind, records: Vec<Record>) -> Result<AnnotatedTable> {
  let schema = kind.schema();
  let cleaned = clean_for_report(kind, records)?;

  let table = aggregate(&cleaned, schema.key_fields, &kind.measures())?;
  log::info!("{} rows grouped into {}", cleaned.len(), table.len());

  let annotated = inject_totals(&table, &kind.totals())?;
  log::info!("Subtotals and grand total added, {} rows in the report", annotated.len());
  Ok(annotated)
}

/// Turns the exports in the input folder into the daily report and returns its path.
pub fn daily_report(settings: &Settings, format: ReportFormat, today: NaiveDate) -> Result<PathBuf> {
  let input = &settings.report.input;
  log::info!("Looking for csv files in {}", input.display());

  let files = csv_files(input)?;
  let (kind, files) = detect(input, &files)?;

  let records = read_files(&files, kind.schema().report_columns)?;
  log::info!("{} {} rows read from {} files", records.len(), kind, files.len());

  let table = build_report(kind, records)?;
  write_report(&table, &settings.report.output, format, today)
}

/// Rebuilds the sqlite tables from the per-source export folders. Returns the rows
/// written per source; a source without files is skipped.
pub fn load(settings: &Settings) -> Result<Vec<(SourceKind, usize)>> {
  let mut db = OrdersDb::open(&settings.load.sqlite)?;
  db.drop_tables()?;

  let mut loaded = vec![];
  for kind in [SourceKind::Shopify, SourceKind::Square] {
    let folder = settings.load.input(kind);
    if !folder.is_dir() {
      log::warn!("{} folder {} not found, skipping", kind, folder.display());
      continue;
    }

    let files = csv_files(folder)?;
    if files.is_empty() {
      log::info!("No {} csv files in {}, skipping", kind, folder.display());
      continue;
    }

    let schema = kind.schema();
    let records = read_files(&files, schema.attributes)?;
    let rows = transform(kind, records)?;
    let written = db.replace_table(schema.table, &rows)?;
    loaded.push((kind, written));
  }

  log::info!("Data loaded successfully");
  Ok(loaded)
}

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

use daily_orders::{Settings, SourceKind};

pub fn init() -> (TempDir, Settings) {
  std::env::set_var("RUST_LOG", "daily_orders=debug,pivot=debug");
  let _ = env_logger::builder().is_test(true).try_init();

  let tmp_dir = tempdir().unwrap();
  let settings = Settings::in_folder(tmp_dir.path());

  (tmp_dir, settings)
}

/// Writes an export with every column of the source; cells not given stay empty.
pub fn write_export(folder: &Path, name: &str, kind: SourceKind, rows: &[Vec<(&str, &str)>]) -> PathBuf {
  fs::create_dir_all(folder).unwrap();
  let path = folder.join(name);
  let attributes = kind.schema().attributes;

  let mut writer = csv::Writer::from_path(&path).unwrap();
  writer.write_record(attributes).unwrap();
  for row in rows {
    let cells = attributes.iter().map(|a| row.iter().find(|(k, _)| k == a).map(|(_, v)| *v).unwrap_or(""));
    writer.write_record(cells).unwrap();
  }
  writer.flush().unwrap();

  path
}

pub fn square_item<'a>(order: &'a str, item: &'a str, variation: &'a str, qty: &'a str, price: &'a str) -> Vec<(&'a str, &'a str)> {
  vec![
    ("Order", "1"),
    ("Order Name", order),
    ("Order Date", "2024-08-01 10:15:00"),
    ("Item Quantity", qty),
    ("Item Name", item),
    ("Item Variation", variation),
    ("Item Price", price),
  ]
}

use chrono::NaiveDate;
use pivot::{AnnotatedRow, AnnotatedTable, RowKind, Value};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::utils::time::report_stamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
  #[default]
  Xlsx,
  Csv,
}

impl ReportFormat {
  pub fn extension(&self) -> &'static str {
    match self {
      ReportFormat::Xlsx => "xlsx",
      ReportFormat::Csv => "csv",
    }
  }
}

impl FromStr for ReportFormat {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "xlsx" => Ok(ReportFormat::Xlsx),
      "csv" => Ok(ReportFormat::Csv),
      _ => Err(format!("unknown report format {:?}, expected xlsx or csv", s)),
    }
  }
}

impl fmt::Display for ReportFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.extension())
  }
}

/// `Formated Table MM-DD-YYYY.<ext>`
pub fn file_name(date: NaiveDate, format: ReportFormat) -> String {
  format!("Formated Table {}.{}", report_stamp(date), format.extension())
}

fn header(table: &AnnotatedTable) -> Vec<&str> {
  table
    .key_fields()
    .iter()
    .map(String::as_str)
    .chain(table.measures().iter().map(|m| m.field.as_str()))
    .collect()
}

fn cells(row: &AnnotatedRow) -> impl Iterator<Item = &Value> {
  row.key.iter().chain(row.measures.iter())
}

/// Writes the annotated table into `folder` and returns the file path.
pub fn write_report(table: &AnnotatedTable, folder: &Path, format: ReportFormat, date: NaiveDate) -> Result<PathBuf> {
  fs::create_dir_all(folder)?;
  let path = folder.join(file_name(date, format));

  match format {
    ReportFormat::Xlsx => write_xlsx(table, &path)?,
    ReportFormat::Csv => write_csv(table, &path)?,
  }

  log::info!("Report saved to {}", path.display());
  Ok(path)
}

struct Styles {
  plain: Format,
  money: Format,
  bold: Format,
  bold_money: Format,
}

impl Styles {
  fn new() -> Self {
    Styles {
      plain: Format::new(),
      money: Format::new().set_num_format("0.00"),
      bold: Format::new().set_bold(),
      bold_money: Format::new().set_bold().set_num_format("0.00"),
    }
  }
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &Value, total: bool, styles: &Styles) -> Result<()> {
  match value {
    Value::Blank => {},
    Value::Text(s) => {
      let style = if total { &styles.bold } else { &styles.plain };
      sheet.write_string_with_format(row, col, s, style)?;
    },
    Value::Number(n) => {
      let number = n.to_f64().ok_or_else(|| Error::parse("number", n))?;
      let style = match (total, n.scale() > 0) {
        (false, false) => &styles.plain,
        (false, true) => &styles.money,
        (true, false) => &styles.bold,
        (true, true) => &styles.bold_money,
      };
      sheet.write_number_with_format(row, col, number, style)?;
    },
  }
  Ok(())
}

fn write_xlsx(table: &AnnotatedTable, path: &Path) -> Result<()> {
  let styles = Styles::new();
  let mut workbook = Workbook::new();
  let sheet = workbook.add_worksheet();

  for (col, name) in header(table).into_iter().enumerate() {
    sheet.write_string_with_format(0, col as u16, name, &styles.bold)?;
  }

  for (i, row) in table.rows().iter().enumerate() {
    let total = row.kind != RowKind::Detail;
    for (col, value) in cells(row).enumerate() {
      write_cell(sheet, i as u32 + 1, col as u16, value, total, &styles)?;
    }
  }

  sheet.autofit();
  workbook.save(path)?;
  Ok(())
}

fn write_csv(table: &AnnotatedTable, path: &Path) -> Result<()> {
  let mut writer = csv::Writer::from_path(path)?;
  writer.write_record(header(table))?;
  for row in table.rows() {
    writer.write_record(cells(row).map(|v| v.to_string()))?;
  }
  writer.flush()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sources::SourceKind;
  use pivot::{aggregate, inject_totals, Record};

  fn shopify_table() -> AnnotatedTable {
    let kind = SourceKind::Shopify;
    let schema = kind.schema();
    let records: Vec<Record> = vec![
      Record::new()
        .with("Lineitem quantity", 2)
        .with("Lineitem name", "Mug")
        .with("Lineitem price", Value::text("12.50").to_decimal())
        .with("Shipping Name", "Bo"),
      Record::new()
        .with("Lineitem quantity", 1)
        .with("Lineitem name", "Mug")
        .with("Lineitem price", Value::text("12.50").to_decimal())
        .with("Shipping Name", "Al"),
    ];
    let table = aggregate(&records, schema.key_fields, &kind.measures()).unwrap();
    inject_totals(&table, &kind.totals()).unwrap()
  }

  #[test]
  fn names_and_formats() {
    let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
    assert_eq!(file_name(date, ReportFormat::Xlsx), "Formated Table 08-01-2024.xlsx");
    assert_eq!(file_name(date, ReportFormat::Csv), "Formated Table 08-01-2024.csv");
    assert_eq!("CSV".parse::<ReportFormat>(), Ok(ReportFormat::Csv));
    assert!("pdf".parse::<ReportFormat>().is_err());
  }

  #[test]
  fn csv_report() {
    let dir = tempfile::tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();

    let path = write_report(&shopify_table(), &dir.path().join("out"), ReportFormat::Csv, date).unwrap();

    let text = fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
      lines,
      vec![
        "Lineitem name,Shipping Name,Lineitem price,Lineitem quantity",
        "Mug,Al,12.50,1",
        "Mug,Bo,12.50,2",
        "Mug,SubTotal,,3",
        "Grand Total,,37.50,3",
      ]
    );
  }

  #[test]
  fn xlsx_report() {
    let dir = tempfile::tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();

    let path = write_report(&shopify_table(), dir.path(), ReportFormat::Xlsx, date).unwrap();

    assert_eq!(path, dir.path().join("Formated Table 08-01-2024.xlsx"));
    let bytes = fs::read(path).unwrap();
    assert_eq!(&bytes[..2], b"PK");
  }
}

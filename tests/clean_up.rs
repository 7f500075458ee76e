mod test_init;

use std::fs;

use daily_orders::housekeeping::clean_up;
use daily_orders::pipeline::daily_report;
use daily_orders::report::ReportFormat;
use daily_orders::SourceKind;
use test_init::{init, square_item, write_export};

#[test]
fn clean_up_after_a_report() {
  let (_tmp, settings) = init();

  let export = write_export(
    &settings.report.input,
    "orders-1.csv",
    SourceKind::Square,
    &[square_item("Ann", "Widget", "Regular", "1", "5.00")],
  );
  let today = chrono::NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
  let report = daily_report(&settings, ReportFormat::Xlsx, today).unwrap();

  let deleted = clean_up(&settings).unwrap();

  assert_eq!(deleted, vec![report.clone(), export.clone()]);
  assert!(!report.exists());
  assert!(!export.exists());
  assert!(settings.report.input.is_dir());
  assert_eq!(fs::read_dir(&settings.report.output).unwrap().count(), 0);
}

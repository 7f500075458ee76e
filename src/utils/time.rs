use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const LOG_STAMP: &str = "%Y-%m-%d %H:%M:%S";
pub const REPORT_STAMP: &str = "%m-%d-%Y";

const ZONED: [&str; 2] = ["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%d %H:%M %z"];
const NAIVE: [&str; 4] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"];
const DATES: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parses the timestamp shapes seen in Square and Shopify exports. Zoned timestamps keep
/// their wall-clock time.
pub fn parse_datetime(data: &str) -> Option<NaiveDateTime> {
  let data = data.trim();

  if let Ok(ts) = DateTime::parse_from_rfc3339(data) {
    return Some(ts.naive_local());
  }
  for fmt in ZONED {
    if let Ok(ts) = DateTime::parse_from_str(data, fmt) {
      return Some(ts.naive_local());
    }
  }
  for fmt in NAIVE {
    if let Ok(ts) = NaiveDateTime::parse_from_str(data, fmt) {
      return Some(ts);
    }
  }
  DATES
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(data, fmt).ok())
    .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn datetime_to_string(ts: NaiveDateTime) -> String {
  ts.format(LOG_STAMP).to_string()
}

pub fn report_stamp(date: NaiveDate) -> String {
  date.format(REPORT_STAMP).to_string()
}

use pivot::Value;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Formats a phone cell by its digit count. Exports store phones as floats
/// (`15551234567.0`) or as free text, so both are reduced to digits first.
/// A missing phone becomes `0`; an unexpected length keeps the bare digits.
pub fn format_phone(value: &Value) -> Value {
  let digits = match value {
    Value::Blank => return Value::from(0),
    Value::Number(n) => n.trunc().to_string(),
    Value::Text(s) => match Decimal::from_str(s.trim()) {
      Ok(n) => n.trunc().to_string(),
      Err(_) => s.chars().filter(char::is_ascii_digit).collect(),
    },
  };

  let d = digits.as_str();
  let formatted = match d.len() {
    10 => format!("({})-{}-{}", &d[..3], &d[3..6], &d[6..]),
    11 => format!("{}-({}) {}-{}", &d[..1], &d[1..4], &d[4..7], &d[7..]),
    9 => format!("({}) {}-{}", &d[..2], &d[2..5], &d[5..]),
    12 => format!("{}-({}) {}-{}", &d[..2], &d[2..5], &d[5..8], &d[8..]),
    0 => return value.clone(),
    _ => {
      log::warn!("Error formatting phone number {}: unexpected length", d);
      digits.clone()
    },
  };
  Value::Text(formatted)
}

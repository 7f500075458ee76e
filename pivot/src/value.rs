use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// One cell of a record or table.
///
/// Ordering is by variant first (`Blank < Number < Text`), then by the natural order of
/// the content. Text compares byte-wise, so it is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Value {
  #[default]
  Blank,
  Number(Decimal),
  Text(String),
}

impl Value {
  pub fn text<S: Into<String>>(s: S) -> Self {
    Value::Text(s.into())
  }

  pub fn is_blank(&self) -> bool {
    matches!(self, Value::Blank)
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Value::Text(s) => Some(s.as_str()),
      _ => None,
    }
  }

  /// Numeric view of the cell. Text is parsed as a decimal literal; a leading `$` and
  /// thousands separators are tolerated. Blank is never a number.
  pub fn to_decimal(&self) -> Option<Decimal> {
    match self {
      Value::Number(n) => Some(*n),
      Value::Text(s) => parse_decimal(s),
      Value::Blank => None,
    }
  }
}

pub(crate) fn parse_decimal(s: &str) -> Option<Decimal> {
  let s = s.trim();
  let (negative, s) = match s.strip_prefix('-') {
    Some(rest) => (true, rest.trim_start()),
    None => (false, s),
  };
  let s = s.strip_prefix('$').unwrap_or(s);
  if s.is_empty() {
    return None;
  }
  let cleaned: String = s.chars().filter(|c| *c != ',').collect();

  let number = Decimal::from_str(&cleaned).or_else(|_| Decimal::from_scientific(&cleaned)).ok()?;
  Some(if negative { -number } else { number })
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Blank => Ok(()),
      Value::Number(n) => n.fmt(f),
      Value::Text(s) => s.fmt(f),
    }
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::Text(s.to_string())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::Text(s)
  }
}

impl From<Decimal> for Value {
  fn from(n: Decimal) -> Self {
    Value::Number(n)
  }
}

impl From<i64> for Value {
  fn from(n: i64) -> Self {
    Value::Number(Decimal::from(n))
  }
}

impl From<i32> for Value {
  fn from(n: i32) -> Self {
    Value::Number(Decimal::from(n))
  }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self {
    match v {
      Some(v) => v.into(),
      None => Value::Blank,
    }
  }
}

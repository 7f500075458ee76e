use crate::error::{PivotError, Result};
use crate::value::Value;

/// Sentinel placed in the second key slot of a subtotal row.
pub const SUBTOTAL: &str = "SubTotal";
/// Sentinel placed in the first key slot of the grand total row.
pub const GRAND_TOTAL: &str = "Grand Total";

/// A flat row of named cells, in the order the fields were added.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
  fields: Vec<(String, Value)>,
}

impl Record {
  pub fn new() -> Self {
    Record { fields: vec![] }
  }

  pub fn get(&self, field: &str) -> Option<&Value> {
    self.fields.iter().find(|(name, _)| name == field).map(|(_, v)| v)
  }

  /// Replaces the value of an existing field or appends a new one.
  pub fn set<F: Into<String>, V: Into<Value>>(&mut self, field: F, value: V) {
    let field = field.into();
    let value = value.into();
    match self.fields.iter_mut().find(|(name, _)| *name == field) {
      Some((_, v)) => *v = value,
      None => self.fields.push((field, value)),
    }
  }

  pub fn with<F: Into<String>, V: Into<Value>>(mut self, field: F, value: V) -> Self {
    self.set(field, value);
    self
  }

  pub fn remove(&mut self, field: &str) -> Option<Value> {
    let pos = self.fields.iter().position(|(name, _)| name == field)?;
    Some(self.fields.remove(pos).1)
  }

  pub fn retain<F: Fn(&str) -> bool>(&mut self, keep: F) {
    self.fields.retain(|(name, _)| keep(name));
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.fields.iter().map(|(name, _)| name.as_str())
  }

  pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.fields.iter().map(|(name, v)| (name.as_str(), v))
  }

  pub fn len(&self) -> usize {
    self.fields.len()
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }
}

impl<F: Into<String>, V: Into<Value>> FromIterator<(F, V)> for Record {
  fn from_iter<I: IntoIterator<Item = (F, V)>>(iter: I) -> Self {
    let mut record = Record::new();
    for (field, value) in iter {
      record.set(field, value);
    }
    record
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
  Sum,
  /// Value of the first record of the group, in input order.
  First,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measure {
  pub field: String,
  pub aggregation: Aggregation,
}

impl Measure {
  pub fn sum<S: Into<String>>(field: S) -> Self {
    Measure { field: field.into(), aggregation: Aggregation::Sum }
  }

  pub fn first<S: Into<String>>(field: S) -> Self {
    Measure { field: field.into(), aggregation: Aggregation::First }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
  pub key: Vec<Value>,
  pub measures: Vec<Value>,
}

/// One row per distinct key, sorted ascending by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedTable {
  key_fields: Vec<String>,
  measures: Vec<Measure>,
  rows: Vec<Row>,
}

impl AggregatedTable {
  pub(crate) fn sorted(key_fields: Vec<String>, measures: Vec<Measure>, rows: Vec<Row>) -> Self {
    debug_assert!(rows.windows(2).all(|w| w[0].key < w[1].key));
    AggregatedTable { key_fields, measures, rows }
  }

  /// Builds a table from rows computed elsewhere. Rows are sorted; a repeated key or a row
  /// with the wrong number of measures is rejected.
  pub fn from_rows(key_fields: Vec<String>, measures: Vec<Measure>, mut rows: Vec<Row>) -> Result<Self> {
    if let Some(row) = rows.iter().find(|r| r.measures.len() != measures.len()) {
      return Err(PivotError::shape(format!(
        "row {:?} has {} measures, expected {}",
        row.key,
        row.measures.len(),
        measures.len()
      )));
    }
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    if let Some(w) = rows.windows(2).find(|w| w[0].key == w[1].key) {
      return Err(PivotError::shape(format!("duplicate key {:?}", w[0].key)));
    }
    Ok(AggregatedTable { key_fields, measures, rows })
  }

  pub fn key_fields(&self) -> &[String] {
    &self.key_fields
  }

  pub fn measures(&self) -> &[Measure] {
    &self.measures
  }

  pub fn rows(&self) -> &[Row] {
    &self.rows
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn measure_index(&self, field: &str) -> Option<usize> {
    self.measures.iter().position(|m| m.field == field)
  }

  pub fn get(&self, key: &[Value]) -> Option<&Row> {
    self.rows.binary_search_by(|row| row.key.as_slice().cmp(key)).ok().map(|i| &self.rows[i])
  }

  /// Flattens the table back into records, one per row.
  pub fn to_records(&self) -> Vec<Record> {
    self
      .rows
      .iter()
      .map(|row| {
        let keys = self.key_fields.iter().cloned().zip(row.key.iter().cloned());
        let measures = self.measures.iter().map(|m| m.field.clone()).zip(row.measures.iter().cloned());
        keys.chain(measures).collect::<Record>()
      })
      .collect()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
  Detail,
  Subtotal,
  GrandTotal,
}

impl RowKind {
  /// Classifies a key by its sentinels, for consumers that only see the rendered key.
  pub fn detect(key: &[Value]) -> RowKind {
    let empty_tail = |from: usize| key.iter().skip(from).all(|v| matches!(v, Value::Text(s) if s.is_empty()));

    if key.first().and_then(Value::as_text) == Some(GRAND_TOTAL) && empty_tail(1) {
      RowKind::GrandTotal
    } else if key.get(1).and_then(Value::as_text) == Some(SUBTOTAL) && empty_tail(2) {
      RowKind::Subtotal
    } else {
      RowKind::Detail
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedRow {
  pub kind: RowKind,
  pub key: Vec<Value>,
  pub measures: Vec<Value>,
}

/// Detail rows with subtotal rows merged in and the grand total row last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedTable {
  key_fields: Vec<String>,
  measures: Vec<Measure>,
  rows: Vec<AnnotatedRow>,
}

impl AnnotatedTable {
  pub(crate) fn new(key_fields: Vec<String>, measures: Vec<Measure>, rows: Vec<AnnotatedRow>) -> Self {
    AnnotatedTable { key_fields, measures, rows }
  }

  pub fn key_fields(&self) -> &[String] {
    &self.key_fields
  }

  pub fn measures(&self) -> &[Measure] {
    &self.measures
  }

  pub fn rows(&self) -> &[AnnotatedRow] {
    &self.rows
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn measure_index(&self, field: &str) -> Option<usize> {
    self.measures.iter().position(|m| m.field == field)
  }

  pub fn details(&self) -> impl Iterator<Item = &AnnotatedRow> {
    self.rows.iter().filter(|r| r.kind == RowKind::Detail)
  }

  pub fn subtotals(&self) -> impl Iterator<Item = &AnnotatedRow> {
    self.rows.iter().filter(|r| r.kind == RowKind::Subtotal)
  }

  pub fn subtotal(&self, outer: &Value) -> Option<&AnnotatedRow> {
    self.subtotals().find(|r| r.key.first() == Some(outer))
  }

  pub fn grand_total(&self) -> Option<&AnnotatedRow> {
    self.rows.last().filter(|r| r.kind == RowKind::GrandTotal)
  }

  /// Value of `field` on `row`, if the table has such a measure.
  pub fn measure<'a>(&self, row: &'a AnnotatedRow, field: &str) -> Option<&'a Value> {
    self.measure_index(field).and_then(|i| row.measures.get(i))
  }
}

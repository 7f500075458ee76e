use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::error::{PivotError, Result};
use crate::table::{AggregatedTable, Aggregation, Measure, Record, Row};
use crate::value::Value;

#[derive(Debug, Clone)]
enum Accumulator {
  Sum(Decimal),
  First(Option<Value>),
}

impl Accumulator {
  fn new(measure: &Measure) -> Self {
    match measure.aggregation {
      Aggregation::Sum => Accumulator::Sum(Decimal::ZERO),
      Aggregation::First => Accumulator::First(None),
    }
  }

  fn apply(&mut self, field: &str, value: &Value) -> Result<()> {
    match self {
      Accumulator::Sum(total) => *total = add(field, *total, number(field, value)?)?,
      Accumulator::First(first) => {
        if first.is_none() {
          *first = Some(value.clone());
        }
      },
    }
    Ok(())
  }

  fn finish(self) -> Value {
    match self {
      Accumulator::Sum(total) => Value::Number(total),
      Accumulator::First(first) => first.unwrap_or_default(),
    }
  }
}

pub(crate) fn number(field: &str, value: &Value) -> Result<Decimal> {
  value
    .to_decimal()
    .ok_or_else(|| PivotError::TypeMismatch { field: field.to_string(), value: value.to_string() })
}

pub(crate) fn add(field: &str, a: Decimal, b: Decimal) -> Result<Decimal> {
  a.checked_add(b).ok_or_else(|| PivotError::overflow(field))
}

pub(crate) fn mul(field: &str, a: Decimal, b: Decimal) -> Result<Decimal> {
  a.checked_mul(b).ok_or_else(|| PivotError::overflow(field))
}

fn field<'a>(record: &'a Record, name: &str, idx: usize) -> Result<&'a Value> {
  record
    .get(name)
    .ok_or_else(|| PivotError::SchemaMismatch { field: name.to_string(), record: idx })
}

/// Collapses `records` into one row per distinct key tuple.
///
/// `Sum` measures are added up (text is coerced, anything non-numeric fails the whole
/// call); `First` measures keep the value of the earliest record of the group in input
/// order. Rows come out sorted by key.
pub fn aggregate<K: AsRef<str>>(
  records: &[Record],
  key_fields: &[K],
  measures: &[Measure],
) -> Result<AggregatedTable> {
  if key_fields.is_empty() {
    return Err(PivotError::shape("at least one key field is required"));
  }

  let mut groups: BTreeMap<Vec<Value>, Vec<Accumulator>> = BTreeMap::new();

  for (idx, record) in records.iter().enumerate() {
    let key = key_fields
      .iter()
      .map(|name| field(record, name.as_ref(), idx).cloned())
      .collect::<Result<Vec<_>>>()?;

    let values = measures
      .iter()
      .map(|m| field(record, &m.field, idx))
      .collect::<Result<Vec<_>>>()?;

    let accumulators = groups.entry(key).or_insert_with(|| measures.iter().map(Accumulator::new).collect());

    for ((acc, measure), value) in accumulators.iter_mut().zip(measures).zip(values) {
      acc.apply(&measure.field, value)?;
    }
  }

  log::debug!("aggregated {} records into {} groups", records.len(), groups.len());

  let rows = groups
    .into_iter()
    .map(|(key, accumulators)| Row { key, measures: accumulators.into_iter().map(Accumulator::finish).collect() })
    .collect();

  Ok(AggregatedTable::sorted(
    key_fields.iter().map(|k| k.as_ref().to_string()).collect(),
    measures.to_vec(),
    rows,
  ))
}

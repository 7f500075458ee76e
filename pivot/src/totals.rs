use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::aggregate::{add, mul, number};
use crate::error::{PivotError, Result};
use crate::table::{AggregatedTable, AnnotatedRow, AnnotatedTable, Row, RowKind, GRAND_TOTAL, SUBTOTAL};
use crate::value::Value;

/// Grand total of `unit_value` computed as `Σ unit_value × quantity` over detail rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weighting {
  pub unit_value: String,
  pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsConfig {
  /// Must be the first key field.
  pub outer_field: String,
  /// Summed on every subtotal row.
  pub group_measure: String,
  /// Summed on the grand total row.
  pub totalable_measures: Vec<String>,
  pub weighting: Option<Weighting>,
}

impl TotalsConfig {
  pub fn new<O: Into<String>, G: Into<String>>(outer_field: O, group_measure: G) -> Self {
    TotalsConfig {
      outer_field: outer_field.into(),
      group_measure: group_measure.into(),
      totalable_measures: vec![],
      weighting: None,
    }
  }

  pub fn totalable<S: Into<String>>(mut self, field: S) -> Self {
    self.totalable_measures.push(field.into());
    self
  }

  pub fn weighted<U: Into<String>, Q: Into<String>>(mut self, unit_value: U, quantity: Q) -> Self {
    self.weighting = Some(Weighting { unit_value: unit_value.into(), quantity: quantity.into() });
    self
  }
}

enum GrandRule {
  Blank,
  Sum,
  Weighted(usize),
}

fn measure_index(table: &AggregatedTable, field: &str) -> Result<usize> {
  table.measure_index(field).ok_or_else(|| PivotError::MeasureNotFound(field.to_string()))
}

fn placeholder_key(first: Value, second: Option<&str>, arity: usize) -> Vec<Value> {
  let mut key = Vec::with_capacity(arity);
  key.push(first);
  if let Some(second) = second {
    key.push(Value::text(second));
  }
  key.resize(arity, Value::text(""));
  key
}

/// Merges one subtotal row after every outer-key group and a grand total row at the end.
///
/// Rows are partitioned by the outer key and concatenated group by group; sentinels are
/// never sorted against real key values. Unit values are not additive, so they stay blank
/// on subtotal rows and get a weighted sum on the grand total row.
pub fn inject_totals(table: &AggregatedTable, cfg: &TotalsConfig) -> Result<AnnotatedTable> {
  let key_fields = table.key_fields();
  let arity = key_fields.len();

  if arity < 2 {
    return Err(PivotError::shape(format!("subtotals need at least two key fields, got {}", arity)));
  }
  if key_fields[0] != cfg.outer_field {
    return Err(PivotError::shape(format!(
      "outer field {:?} is not the first key field {:?}",
      cfg.outer_field, key_fields[0]
    )));
  }
  if let Some((idx, row)) = table.rows().iter().enumerate().find(|(_, row)| row.key.len() != arity) {
    return Err(PivotError::shape(format!("row #{} has {} key parts, expected {}", idx, row.key.len(), arity)));
  }

  let group_idx = measure_index(table, &cfg.group_measure)?;

  let mut rules: Vec<GrandRule> = table.measures().iter().map(|_| GrandRule::Blank).collect();
  for field in &cfg.totalable_measures {
    rules[measure_index(table, field)?] = GrandRule::Sum;
  }
  if let Some(w) = &cfg.weighting {
    let quantity = measure_index(table, &w.quantity)?;
    rules[measure_index(table, &w.unit_value)?] = GrandRule::Weighted(quantity);
  }

  let mut partitions: BTreeMap<&Value, Vec<&Row>> = BTreeMap::new();
  for row in table.rows() {
    partitions.entry(&row.key[0]).or_default().push(row);
  }

  let mut rows = Vec::with_capacity(table.len() + partitions.len() + 1);

  for (outer, group) in partitions {
    let mut subtotal = Decimal::ZERO;
    for row in &group {
      subtotal = add(&cfg.group_measure, subtotal, number(&cfg.group_measure, &row.measures[group_idx])?)?;
      rows.push(AnnotatedRow { kind: RowKind::Detail, key: row.key.clone(), measures: row.measures.clone() });
    }

    let mut measures = vec![Value::Blank; table.measures().len()];
    measures[group_idx] = Value::Number(subtotal);

    log::debug!("subtotal {} = {}", outer, subtotal);

    rows.push(AnnotatedRow {
      kind: RowKind::Subtotal,
      key: placeholder_key(outer.clone(), Some(SUBTOTAL), arity),
      measures,
    });
  }

  let mut grand = Vec::with_capacity(rules.len());
  for (idx, rule) in rules.iter().enumerate() {
    let field = &table.measures()[idx].field;
    let value = match rule {
      GrandRule::Blank => Value::Blank,
      GrandRule::Sum => {
        let mut total = Decimal::ZERO;
        for row in table.rows() {
          total = add(field, total, number(field, &row.measures[idx])?)?;
        }
        Value::Number(total)
      },
      GrandRule::Weighted(quantity) => {
        let quantity_field = &table.measures()[*quantity].field;
        let mut total = Decimal::ZERO;
        for row in table.rows() {
          let line = mul(field, number(field, &row.measures[idx])?, number(quantity_field, &row.measures[*quantity])?)?;
          total = add(field, total, line)?;
        }
        Value::Number(total)
      },
    };
    grand.push(value);
  }

  rows.push(AnnotatedRow {
    kind: RowKind::GrandTotal,
    key: placeholder_key(Value::text(GRAND_TOTAL), None, arity),
    measures: grand,
  });

  Ok(AnnotatedTable::new(key_fields.to_vec(), table.measures().to_vec(), rows))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::aggregate::aggregate;
  use crate::table::{Measure, Record};

  fn cfg() -> TotalsConfig {
    TotalsConfig::new("item", "qty").totalable("qty").weighted("price", "qty")
  }

  fn table(rows: &[(&str, &str, &str, i64)]) -> AggregatedTable {
    let records: Vec<Record> = rows
      .iter()
      .map(|(item, buyer, price, qty)| {
        Record::new().with("item", *item).with("buyer", *buyer).with("price", *price).with("qty", *qty)
      })
      .collect();
    aggregate(&records, &["item", "buyer"], &[Measure::first("price"), Measure::sum("qty")]).unwrap()
  }

  #[test]
  fn subtotal_follows_its_group() {
    let t = table(&[("B", "x", "1", 1), ("A", "y", "2", 2), ("B", "w", "1", 3), ("A", "z", "2", 1)]);

    let out = inject_totals(&t, &cfg()).unwrap();

    let kinds: Vec<RowKind> = out.rows().iter().map(|r| r.kind).collect();
    assert_eq!(
      kinds,
      vec![
        RowKind::Detail,
        RowKind::Detail,
        RowKind::Subtotal,
        RowKind::Detail,
        RowKind::Detail,
        RowKind::Subtotal,
        RowKind::GrandTotal
      ]
    );
    assert_eq!(out.rows()[2].key, vec![Value::text("A"), Value::text(SUBTOTAL)]);
    assert_eq!(out.rows()[2].measures, vec![Value::Blank, Value::from(3)]);
    assert_eq!(out.rows()[5].measures, vec![Value::Blank, Value::from(4)]);
  }

  #[test]
  fn grand_total_is_weighted() {
    let t = table(&[("A", "x", "2.50", 2), ("B", "y", "1.25", 4)]);

    let out = inject_totals(&t, &cfg()).unwrap();

    let grand = out.grand_total().unwrap();
    assert_eq!(grand.key, vec![Value::text(GRAND_TOTAL), Value::text("")]);
    assert_eq!(grand.measures, vec![Value::from(Decimal::new(1000, 2)), Value::from(6)]);
  }

  #[test]
  fn unlisted_measures_stay_blank_on_grand_total() {
    let t = table(&[("A", "x", "2", 2)]);
    let out = inject_totals(&t, &TotalsConfig::new("item", "qty")).unwrap();
    assert_eq!(out.grand_total().unwrap().measures, vec![Value::Blank, Value::Blank]);
  }

  #[test]
  fn outer_field_must_lead_the_key() {
    let t = table(&[("A", "x", "2", 2)]);
    let err = inject_totals(&t, &TotalsConfig::new("buyer", "qty")).unwrap_err();
    assert!(matches!(err, PivotError::InvalidKeyShape(_)));
  }

  #[test]
  fn unknown_measures() {
    let t = table(&[("A", "x", "2", 2)]);

    let err = inject_totals(&t, &TotalsConfig::new("item", "amount")).unwrap_err();
    assert_eq!(err, PivotError::MeasureNotFound("amount".into()));

    let err = inject_totals(&t, &TotalsConfig::new("item", "qty").totalable("tax")).unwrap_err();
    assert_eq!(err, PivotError::MeasureNotFound("tax".into()));

    let err = inject_totals(&t, &TotalsConfig::new("item", "qty").weighted("cost", "qty")).unwrap_err();
    assert_eq!(err, PivotError::MeasureNotFound("cost".into()));
  }

  #[test]
  fn ragged_keys_are_rejected() {
    let rows = vec![
      Row { key: vec!["A".into(), "x".into()], measures: vec![Value::from(1), Value::from(1)] },
      Row { key: vec!["B".into()], measures: vec![Value::from(1), Value::from(1)] },
    ];
    let t = AggregatedTable::from_rows(
      vec!["item".into(), "buyer".into()],
      vec![Measure::first("price"), Measure::sum("qty")],
      rows,
    )
    .unwrap();

    let err = inject_totals(&t, &cfg()).unwrap_err();
    assert!(matches!(err, PivotError::InvalidKeyShape(_)));
  }

  fn raw(rows: Vec<(&str, &str, &str, &str)>) -> AggregatedTable {
    let rows = rows
      .into_iter()
      .map(|(item, buyer, price, qty)| Row {
        key: vec![item.into(), buyer.into()],
        measures: vec![Value::text(price), Value::text(qty)],
      })
      .collect();
    AggregatedTable::from_rows(
      vec!["item".into(), "buyer".into()],
      vec![Measure::first("price"), Measure::sum("qty")],
      rows,
    )
    .unwrap()
  }

  #[test]
  fn subtotal_overflow_is_an_error() {
    let big = "50000000000000000000000000000";
    let t = raw(vec![("A", "x", "1", big), ("A", "y", "1", big)]);
    let err = inject_totals(&t, &TotalsConfig::new("item", "qty")).unwrap_err();
    assert_eq!(err, PivotError::Overflow { field: "qty".into() });
  }

  #[test]
  fn grand_total_overflow_is_an_error() {
    let big = "50000000000000000000000000000";
    let t = raw(vec![("A", "x", "1", big), ("B", "y", "1", big)]);
    let err = inject_totals(&t, &TotalsConfig::new("item", "qty").totalable("qty")).unwrap_err();
    assert_eq!(err, PivotError::Overflow { field: "qty".into() });
  }

  #[test]
  fn weighted_overflow_is_an_error() {
    let t = raw(vec![("A", "x", "100000000000000000000", "100000000000")]);
    let err = inject_totals(&t, &cfg()).unwrap_err();
    assert_eq!(err, PivotError::Overflow { field: "price".into() });
  }

  #[test]
  fn unpriced_row_fails_the_weighted_total() {
    let t = table(&[("A", "x", "None", 2)]);
    let err = inject_totals(&t, &cfg()).unwrap_err();
    assert_eq!(err, PivotError::TypeMismatch { field: "price".into(), value: "None".into() });
  }
}

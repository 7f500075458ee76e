use pivot::{Record, Value};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::sources::SourceKind;
use crate::utils::phone::format_phone;
use crate::utils::time::{datetime_to_string, parse_datetime};

/// Placeholder written into report columns that have no value.
pub const MISSING: &str = "None";

const SQUARE_MONEY: [&str; 5] = ["Order Subtotal", "Order Total", "Item Price", "Item Options Total Price", "Item Total Price"];
const SQUARE_MONEY_OR_ZERO: [&str; 3] = ["Order Shipping Price", "Order Tax Total", "Order Refunded Amount"];

const SHOPIFY_MONEY: [&str; 5] = ["Subtotal", "Shipping", "Taxes", "Total", "Lineitem price"];
const SHOPIFY_PHONES: [&str; 3] = ["Billing Phone", "Shipping Phone", "Phone"];
const SHOPIFY_DEFAULTS: [(&str, &str); 5] = [
  ("Notes", "No Notes Given"),
  ("Note Attributes", "No Note Attributes Given"),
  ("Billing Company", "No Company Given"),
  ("Shipping Company", "No Company Given"),
  ("Email", "No Email Given"),
];
const SHOPIFY_TAXES: usize = 5;

fn cell(record: &Record, field: &str) -> Value {
  record.get(field).cloned().unwrap_or_default()
}

fn quantity(field: &str, value: &Value) -> Result<Value> {
  match value.to_decimal() {
    Some(n) if n.fract().is_zero() => Ok(Value::Number(n.trunc())),
    _ => Err(Error::parse(field, value)),
  }
}

fn money(field: &str, value: &Value) -> Result<Value> {
  value.to_decimal().map(|n| Value::Number(n.round_dp(2))).ok_or_else(|| Error::parse(field, value))
}

fn round_money(record: &mut Record, field: &str, or_zero: bool) -> Result<()> {
  let value = match cell(record, field) {
    Value::Blank if or_zero => Value::Number(Decimal::ZERO),
    Value::Blank => Value::Blank,
    v => money(field, &v)?,
  };
  record.set(field, value);
  Ok(())
}

fn strict_date(record: &mut Record, field: &str) -> Result<()> {
  let value = cell(record, field);
  let ts = value.as_text().and_then(parse_datetime).ok_or_else(|| Error::parse(field, &value))?;
  record.set(field, datetime_to_string(ts));
  Ok(())
}

fn lenient_date(record: &mut Record, field: &str) {
  let ts = cell(record, field).as_text().and_then(parse_datetime);
  record.set(field, ts.map(datetime_to_string));
}

fn phone(record: &mut Record, field: &str) {
  let formatted = format_phone(&cell(record, field));
  record.set(field, formatted);
}

fn fill(record: &mut Record, field: &str, default: Value) {
  if cell(record, field).is_blank() {
    record.set(field, default);
  }
}

/// Narrows raw export rows to the daily table columns with typed measures.
pub fn clean_for_report(kind: SourceKind, records: Vec<Record>) -> Result<Vec<Record>> {
  let schema = kind.schema();

  let mut cleaned = Vec::with_capacity(records.len());
  for record in records {
    let mut row = Record::new();
    for column in schema.report_columns {
      let value = cell(&record, column);
      let value = if value.is_blank() {
        Value::text(MISSING)
      } else if *column == schema.quantity {
        quantity(column, &value)?
      } else if *column == schema.price {
        money(column, &value)?
      } else {
        value
      };
      row.set(*column, value);
    }
    cleaned.push(row);
  }

  log::info!("{} {} rows cleaned for the report", cleaned.len(), kind);
  Ok(cleaned)
}

fn transform_square(records: Vec<Record>) -> Result<Vec<Record>> {
  let mut rows = Vec::with_capacity(records.len());
  for (index, mut record) in records.into_iter().enumerate() {
    record.set("Order ID", index as i64 + 1);

    strict_date(&mut record, "Order Date")?;
    lenient_date(&mut record, "Fulfillment Date");

    for field in SQUARE_MONEY {
      round_money(&mut record, field, false)?;
    }
    for field in SQUARE_MONEY_OR_ZERO {
      round_money(&mut record, field, true)?;
    }

    let qty = cell(&record, "Item Quantity");
    if !qty.is_blank() {
      record.set("Item Quantity", quantity("Item Quantity", &qty)?);
    }

    phone(&mut record, "Recipient Phone");
    rows.push(record);
  }

  rows.sort_by(|a, b| a.get("Order Date").cmp(&b.get("Order Date")));
  Ok(rows)
}

fn transform_shopify(records: Vec<Record>) -> Result<Vec<Record>> {
  let total = records.len();
  let mut rows = Vec::with_capacity(total);
  for mut record in records.into_iter().filter(|r| cell(r, "Cancelled at").is_blank()) {
    for (field, default) in SHOPIFY_DEFAULTS {
      fill(&mut record, field, Value::text(default));
    }
    for n in 1..=SHOPIFY_TAXES {
      fill(&mut record, &format!("Tax {} Name", n), Value::text("No Name Given"));
      fill(&mut record, &format!("Tax {} Value", n), Value::Number(Decimal::ZERO));
      round_money(&mut record, &format!("Tax {} Value", n), true)?;
    }

    lenient_date(&mut record, "Paid at");
    lenient_date(&mut record, "Fulfilled at");
    strict_date(&mut record, "Created at")?;

    for field in SHOPIFY_PHONES {
      phone(&mut record, field);
    }
    for field in SHOPIFY_MONEY {
      round_money(&mut record, field, false)?;
    }

    let qty = cell(&record, "Lineitem quantity");
    if !qty.is_blank() {
      record.set("Lineitem quantity", quantity("Lineitem quantity", &qty)?);
    }

    rows.push(record);
  }

  if rows.len() < total {
    log::info!("{} cancelled shopify rows dropped", total - rows.len());
  }

  rows.sort_by(|a, b| a.get("Name").cmp(&b.get("Name")));
  Ok(rows)
}

/// Shapes raw export rows for the sqlite mirror.
pub fn transform(kind: SourceKind, records: Vec<Record>) -> Result<Vec<Record>> {
  let rows = match kind {
    SourceKind::Square => transform_square(records)?,
    SourceKind::Shopify => transform_shopify(records)?,
  };
  log::info!("{} {} rows transformed", rows.len(), kind);
  Ok(rows)
}

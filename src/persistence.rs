use pivot::{Record, Value};
use rust_decimal::prelude::ToPrimitive;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;

use crate::error::{Error, Result};
use crate::sources::SourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Affinity {
  Integer,
  Real,
  Text,
}

impl Affinity {
  fn of(value: &Value) -> Option<Affinity> {
    match value {
      Value::Blank => None,
      Value::Number(n) if n.fract().is_zero() => Some(Affinity::Integer),
      Value::Number(_) => Some(Affinity::Real),
      Value::Text(_) => Some(Affinity::Text),
    }
  }

  fn widen(self, other: Affinity) -> Affinity {
    match (self, other) {
      (Affinity::Text, _) | (_, Affinity::Text) => Affinity::Text,
      (Affinity::Real, _) | (_, Affinity::Real) => Affinity::Real,
      _ => Affinity::Integer,
    }
  }

  fn sql(&self) -> &'static str {
    match self {
      Affinity::Integer => "INTEGER",
      Affinity::Real => "REAL",
      Affinity::Text => "TEXT",
    }
  }
}

fn quote(ident: &str) -> String {
  format!("\"{}\"", ident.replace('"', "\"\""))
}

fn sql_value(field: &str, value: &Value) -> Result<SqlValue> {
  let value = match value {
    Value::Blank => SqlValue::Null,
    Value::Number(n) => match n.to_i64().filter(|_| n.fract().is_zero()) {
      Some(i) => SqlValue::Integer(i),
      None => SqlValue::Real(n.to_f64().ok_or_else(|| Error::parse(field, n))?),
    },
    Value::Text(s) => SqlValue::Text(s.clone()),
  };
  Ok(value)
}

/// Columns in order of first appearance, each with the widest affinity of its values.
fn columns(records: &[Record]) -> Vec<(String, Affinity)> {
  let mut columns: Vec<(String, Option<Affinity>)> = vec![];
  for record in records {
    for (name, value) in record.fields() {
      let pos = match columns.iter().position(|(n, _)| n == name) {
        Some(pos) => pos,
        None => {
          columns.push((name.to_string(), None));
          columns.len() - 1
        },
      };
      let column = &mut columns[pos].1;
      *column = match (*column, Affinity::of(value)) {
        (Some(a), Some(b)) => Some(a.widen(b)),
        (a, b) => a.or(b),
      };
    }
  }
  columns.into_iter().map(|(name, affinity)| (name, affinity.unwrap_or(Affinity::Text))).collect()
}

/// SQLite mirror of the order exports, one table per source.
pub struct OrdersDb {
  conn: Connection,
}

impl OrdersDb {
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    Ok(OrdersDb { conn })
  }

  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    Ok(OrdersDb { conn })
  }

  pub fn connection(&self) -> &Connection {
    &self.conn
  }

  pub fn drop_tables(&self) -> Result<()> {
    for kind in SourceKind::ALL {
      self.conn.execute_batch(&format!("DROP TABLE IF EXISTS {};", quote(kind.schema().table)))?;
    }
    log::info!("Tables dropped successfully");
    Ok(())
  }

  /// Recreates `table` from the records and returns the number of inserted rows.
  pub fn replace_table(&mut self, table: &str, records: &[Record]) -> Result<usize> {
    let columns = columns(records);
    let name = quote(table);

    let tx = self.conn.transaction()?;
    tx.execute_batch(&format!("DROP TABLE IF EXISTS {};", name))?;

    if columns.is_empty() {
      tx.commit()?;
      log::info!("{}: nothing to insert", table);
      return Ok(0);
    }

    let definition: Vec<String> = columns.iter().map(|(c, a)| format!("{} {}", quote(c), a.sql())).collect();
    tx.execute_batch(&format!("CREATE TABLE {} ({});", name, definition.join(", ")))?;

    {
      let names: Vec<String> = columns.iter().map(|(c, _)| quote(c)).collect();
      let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
      let mut stmt =
        tx.prepare(&format!("INSERT INTO {} ({}) VALUES ({})", name, names.join(", "), placeholders.join(", ")))?;

      for record in records {
        let values = columns
          .iter()
          .map(|(c, _)| record.get(c).map_or(Ok(SqlValue::Null), |v| sql_value(c, v)))
          .collect::<Result<Vec<_>>>()?;
        stmt.execute(params_from_iter(values))?;
      }
    }

    tx.commit()?;
    log::info!("{} rows written to {}", records.len(), table);
    Ok(records.len())
  }

  pub fn count(&self, table: &str) -> Result<usize> {
    let count: i64 = self.conn.query_row(&format!("SELECT COUNT(*) FROM {}", quote(table)), [], |r| r.get(0))?;
    Ok(count as usize)
  }
}

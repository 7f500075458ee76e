//! Grouped aggregation of order records and subtotal/grand-total injection.
//!
//! Both steps are pure: they take a snapshot and return a new one.

extern crate rust_decimal;

pub mod aggregate;
pub mod error;
pub mod table;
pub mod totals;
pub mod value;

pub use aggregate::aggregate;
pub use error::PivotError;
pub use table::{
  AggregatedTable, Aggregation, AnnotatedRow, AnnotatedTable, Measure, Record, Row, RowKind, GRAND_TOTAL,
  SUBTOTAL,
};
pub use totals::{inject_totals, TotalsConfig, Weighting};
pub use value::Value;

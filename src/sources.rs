use pivot::{Measure, TotalsConfig};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const SQUARE_ATTRIBUTES: [&str; 32] = [
  "Order",
  "Order Name",
  "Order Date",
  "Currency",
  "Order Subtotal",
  "Order Shipping Price",
  "Order Tax Total",
  "Order Total",
  "Order Refunded Amount",
  "Fulfillment Date",
  "Fulfillment Type",
  "Fulfillment Status",
  "Channels",
  "Fulfillment Location",
  "Fulfillment Notes",
  "Recipient Name",
  "Recipient Email",
  "Recipient Phone",
  "Recipient Address",
  "Recipient Address 2",
  "Recipient Postal Code",
  "Recipient City",
  "Recipient Region",
  "Recipient Country",
  "Item Quantity",
  "Item Name",
  "Item SKU",
  "Item Variation",
  "Item Modifiers",
  "Item Price",
  "Item Options Total Price",
  "Item Total Price",
];

const SHOPIFY_ATTRIBUTES: [&str; 79] = [
  "Name",
  "Email",
  "Financial Status",
  "Paid at",
  "Fulfillment Status",
  "Fulfilled at",
  "Accepts Marketing",
  "Currency",
  "Subtotal",
  "Shipping",
  "Taxes",
  "Total",
  "Discount Code",
  "Discount Amount",
  "Shipping Method",
  "Created at",
  "Lineitem quantity",
  "Lineitem name",
  "Lineitem price",
  "Lineitem compare at price",
  "Lineitem sku",
  "Lineitem requires shipping",
  "Lineitem taxable",
  "Lineitem fulfillment status",
  "Billing Name",
  "Billing Street",
  "Billing Address1",
  "Billing Address2",
  "Billing Company",
  "Billing City",
  "Billing Zip",
  "Billing Province",
  "Billing Country",
  "Billing Phone",
  "Shipping Name",
  "Shipping Street",
  "Shipping Address1",
  "Shipping Address2",
  "Shipping Company",
  "Shipping City",
  "Shipping Zip",
  "Shipping Province",
  "Shipping Country",
  "Shipping Phone",
  "Notes",
  "Note Attributes",
  "Cancelled at",
  "Payment Method",
  "Payment Reference",
  "Refunded Amount",
  "Vendor",
  "Outstanding Balance",
  "Employee",
  "Location",
  "Device ID",
  "Id",
  "Tags",
  "Risk Level",
  "Source",
  "Lineitem discount",
  "Tax 1 Name",
  "Tax 1 Value",
  "Tax 2 Name",
  "Tax 2 Value",
  "Tax 3 Name",
  "Tax 3 Value",
  "Tax 4 Name",
  "Tax 4 Value",
  "Tax 5 Name",
  "Tax 5 Value",
  "Phone",
  "Receipt Number",
  "Duties",
  "Billing Province Name",
  "Shipping Province Name",
  "Payment ID",
  "Payment Terms Name",
  "Next Payment Due At",
  "Payment References",
];

/// Fixed shape of one kind of export.
#[derive(Debug)]
pub struct Schema {
  /// Every column of the export, in export order.
  pub attributes: &'static [&'static str],
  /// Columns kept for the daily table.
  pub report_columns: &'static [&'static str],
  /// Grouping key of the daily table, outermost first.
  pub key_fields: &'static [&'static str],
  pub price: &'static str,
  pub quantity: &'static str,
  /// Table name in the sqlite mirror.
  pub table: &'static str,
}

static SQUARE: Schema = Schema {
  attributes: &SQUARE_ATTRIBUTES,
  report_columns: &["Order Name", "Item Quantity", "Item Name", "Item Variation", "Item Modifiers", "Item Price"],
  key_fields: &["Item Name", "Item Modifiers", "Item Variation", "Order Name"],
  price: "Item Price",
  quantity: "Item Quantity",
  table: "square_orders",
};

static SHOPIFY: Schema = Schema {
  attributes: &SHOPIFY_ATTRIBUTES,
  report_columns: &["Lineitem quantity", "Lineitem name", "Lineitem price", "Shipping Name"],
  key_fields: &["Lineitem name", "Shipping Name"],
  price: "Lineitem price",
  quantity: "Lineitem quantity",
  table: "shopify_orders",
};

lazy_static! {
  static ref SQUARE_FILE: Regex = Regex::new(r"orders-").unwrap();
  static ref SHOPIFY_FILE: Regex = Regex::new(r"orders_").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
  Square,
  Shopify,
}

impl SourceKind {
  pub const ALL: [SourceKind; 2] = [SourceKind::Square, SourceKind::Shopify];

  pub fn schema(&self) -> &'static Schema {
    match self {
      SourceKind::Square => &SQUARE,
      SourceKind::Shopify => &SHOPIFY,
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      SourceKind::Square => "square",
      SourceKind::Shopify => "shopify",
    }
  }

  /// Whether an export file name looks like this source's.
  pub fn matches(&self, file_name: &str) -> bool {
    match self {
      SourceKind::Square => SQUARE_FILE.is_match(file_name),
      SourceKind::Shopify => SHOPIFY_FILE.is_match(file_name),
    }
  }

  pub fn measures(&self) -> Vec<Measure> {
    let schema = self.schema();
    vec![Measure::first(schema.price), Measure::sum(schema.quantity)]
  }

  /// Quantity subtotals per outer key; the grand total price is price × quantity.
  pub fn totals(&self) -> TotalsConfig {
    let schema = self.schema();
    TotalsConfig::new(schema.key_fields[0], schema.quantity)
      .totalable(schema.quantity)
      .weighted(schema.price, schema.quantity)
  }
}

impl fmt::Display for SourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

fn file_name(path: &Path) -> &str {
  path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// Picks the one source the files belong to. Files of both sources in one batch are an
/// error, as is a batch with no recognizable file.
pub fn detect(folder: &Path, files: &[PathBuf]) -> Result<(SourceKind, Vec<PathBuf>)> {
  let of = |kind: SourceKind| -> Vec<PathBuf> {
    files.iter().filter(|f| kind.matches(file_name(f))).cloned().collect()
  };

  let square = of(SourceKind::Square);
  let shopify = of(SourceKind::Shopify);

  match (square.is_empty(), shopify.is_empty()) {
    (false, false) => {
      log::error!("Both square and shopify csv files found");
      Err(Error::MixedSources(square.len(), shopify.len()))
    },
    (false, true) => {
      log::info!("square csv files found: {:?}", square);
      Ok((SourceKind::Square, square))
    },
    (true, false) => {
      log::info!("Shopify csv files found: {:?}", shopify);
      Ok((SourceKind::Shopify, shopify))
    },
    (true, true) => {
      log::error!("No recognizable csv files found");
      Err(Error::NoSourceFiles(folder.display().to_string()))
    },
  }
}

mod test_init;

use daily_orders::persistence::OrdersDb;
use daily_orders::pipeline::load;
use daily_orders::SourceKind;
use test_init::{init, square_item, write_export};

#[test]
fn both_sources_are_mirrored() {
  let (_tmp, settings) = init();

  let mut late = square_item("Bob", "Widget", "Regular", "1", "5.004");
  late.retain(|(k, _)| *k != "Order Date");
  late.push(("Order Date", "2024-08-02 08:00:00"));
  write_export(
    &settings.load.square_input,
    "orders-1.csv",
    SourceKind::Square,
    &[late, square_item("Ann", "Gadget", "Large", "2", "3")],
  );
  write_export(
    &settings.load.shopify_input,
    "orders_export_1.csv",
    SourceKind::Shopify,
    &[
      vec![("Name", "#1002"), ("Created at", "2024-08-01 10:00:00 -0400"), ("Phone", "5551234567")],
      vec![("Name", "#1001"), ("Created at", "2024-08-01 09:00:00 -0400"), ("Cancelled at", "2024-08-01 09:30:00 -0400")],
    ],
  );

  let loaded = load(&settings).unwrap();
  assert_eq!(loaded, vec![(SourceKind::Shopify, 1), (SourceKind::Square, 2)]);

  let db = OrdersDb::open(&settings.load.sqlite).unwrap();
  assert_eq!(db.count("shopify_orders").unwrap(), 1);
  assert_eq!(db.count("square_orders").unwrap(), 2);

  let (name, phone, email): (String, String, String) = db
    .connection()
    .query_row("SELECT \"Name\", \"Phone\", \"Email\" FROM shopify_orders", [], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
    .unwrap();
  assert_eq!(name, "#1002");
  assert_eq!(phone, "(555)-123-4567");
  assert_eq!(email, "No Email Given");

  let mut stmt =
    db.connection().prepare("SELECT \"Order ID\", \"Order Name\", \"Item Price\" FROM square_orders").unwrap();
  let rows: Vec<(i64, String, f64)> =
    stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?))).unwrap().map(|r| r.unwrap()).collect();
  assert_eq!(rows, vec![(2, "Ann".to_string(), 3.0), (1, "Bob".to_string(), 5.0)]);
}

#[test]
fn sources_without_files_are_skipped() {
  let (_tmp, settings) = init();
  std::fs::create_dir_all(&settings.load.shopify_input).unwrap();

  write_export(
    &settings.load.square_input,
    "orders-1.csv",
    SourceKind::Square,
    &[square_item("Ann", "Gadget", "Large", "2", "3")],
  );

  assert_eq!(load(&settings).unwrap(), vec![(SourceKind::Square, 1)]);
}

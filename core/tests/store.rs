//! SQLite sales store: schema, round trip and tolerant loading.

use chrono::NaiveDate;
use revenue_core::{
    store::{parse_sale_date, SalesStore},
    types::Transaction,
};
use std::path::PathBuf;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn sale(date: NaiveDate, order: &str, customer: &str, net: f64) -> Transaction {
    Transaction {
        date,
        order_id:      order.into(),
        customer_id:   customer.into(),
        customer_name: "Le An".into(),
        name_check:    "ok".into(),
        phone_check:   "valid".into(),
        store:         "Store 01".into(),
        region:        "North".into(),
        brand:         "Lumen".into(),
        doc_type:      "sale".into(),
        product_group: "Frames".into(),
        product_code:  "FR-001".into(),
        gross:         net * 1.1,
        net,
    }
}

/// A scratch database file removed when dropped.
struct ScratchDb(PathBuf);

impl ScratchDb {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("revenue-{name}-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);
        Self(path)
    }

    fn path(&self) -> &str {
        self.0.to_str().unwrap()
    }
}

impl Drop for ScratchDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.path()));
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Inserted rows come back intact and ordered by date.
#[test]
fn insert_and_load_round_trip() {
    let store = SalesStore::in_memory().unwrap();
    store.migrate().unwrap();

    let rows = vec![
        sale(d(2024, 3, 2), "O2", "C2", 200.0),
        sale(d(2024, 3, 1), "O1", "C1", 100.0),
        sale(d(2024, 3, 2), "O3", "C1", 300.0),
    ];
    store.insert_transactions(&rows).unwrap();
    assert_eq!(store.transaction_count().unwrap(), 3);

    let loaded = store.load_transactions(None, None).unwrap();
    let orders: Vec<&str> = loaded.iter().map(|r| r.order_id.as_str()).collect();
    assert_eq!(orders, vec!["O1", "O2", "O3"], "same-day rows keep insertion order");
    assert_eq!(loaded[0], rows[1]);

    let bounded = store.load_transactions(Some(d(2024, 3, 2)), Some(d(2024, 3, 2))).unwrap();
    assert_eq!(bounded.len(), 2);
    assert_eq!(store.date_bounds().unwrap(), Some((d(2024, 3, 1), d(2024, 3, 2))));
}

/// Migrations can run more than once.
#[test]
fn migrate_is_idempotent() {
    let store = SalesStore::in_memory().unwrap();
    store.migrate().unwrap();
    store.migrate().unwrap();
    assert_eq!(store.transaction_count().unwrap(), 0);
    assert_eq!(store.date_bounds().unwrap(), None);
}

/// Unparseable dates are dropped, times are truncated and NULL amounts
/// load as zero.
#[test]
fn tolerant_loading_of_raw_rows() {
    let db = ScratchDb::new("raw-rows");
    let store = SalesStore::open(db.path()).unwrap();
    store.migrate().unwrap();

    let conn = rusqlite::Connection::open(db.path()).unwrap();
    conn.execute_batch(
        "INSERT INTO sales (sale_date, order_id, customer_id, store, region, brand, doc_type, gross, net)
         VALUES ('2024-03-05 14:22:10', 'O1', 'C1', 'Store 01', 'North', 'Lumen', 'sale', 120.0, NULL);
         INSERT INTO sales (sale_date, order_id, customer_id, store, region, brand, doc_type, gross, net)
         VALUES ('not a date', 'O2', 'C2', 'Store 01', 'North', 'Lumen', 'sale', 50.0, 50.0);
         INSERT INTO sales (sale_date, order_id, customer_id, store, region, brand, doc_type, gross, net)
         VALUES ('07/03/2024', 'O3', 'C3', 'Store 01', 'North', 'Lumen', 'sale', NULL, 70.0);",
    )
    .unwrap();
    drop(conn);

    assert_eq!(store.transaction_count().unwrap(), 3);
    let loaded = store.load_transactions(None, None).unwrap();
    assert_eq!(loaded.len(), 2);

    assert_eq!(loaded[0].date, d(2024, 3, 5));
    assert_eq!(loaded[0].net, 0.0);
    assert_eq!(loaded[0].customer_name, "");
    assert_eq!(loaded[0].product_group, "");
    assert_eq!(loaded[0].product_code, "");
    assert_eq!(loaded[1].date, d(2024, 3, 7));
    assert_eq!(loaded[1].gross, 0.0);
}

/// Date parsing accepts the stored formats and nothing else.
#[test]
fn sale_date_formats() {
    assert_eq!(parse_sale_date("2024-01-31"), Some(d(2024, 1, 31)));
    assert_eq!(parse_sale_date("2024-01-31T23:59:59"), Some(d(2024, 1, 31)));
    assert_eq!(parse_sale_date("2024-01-31 08:00:00.250"), Some(d(2024, 1, 31)));
    assert_eq!(parse_sale_date(" 31/01/2024 "), Some(d(2024, 1, 31)));
    assert_eq!(parse_sale_date("2024-02-30"), None);
    assert_eq!(parse_sale_date(""), None);
}

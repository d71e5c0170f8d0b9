//! CRM classification: tag precedence, grouping and the post-filter.

use chrono::NaiveDate;
use revenue_core::{
    classify::{classify, crm_totals, reference_date, CrmFilter, CustomerTag},
    types::Transaction,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

const INACTIVE_DAYS: u32 = 90;
const VIP: f64 = 1000.0;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn sale(date: &str, customer: &str, store: &str, order: &str, gross: f64, net: f64) -> Transaction {
    Transaction {
        date:          d(date),
        order_id:      order.into(),
        customer_id:   customer.into(),
        customer_name: format!("Name of {customer}"),
        name_check:    "ok".into(),
        phone_check:   "valid".into(),
        store:         store.into(),
        region:        "North".into(),
        brand:         "Lumen".into(),
        doc_type:      "sale".into(),
        product_group: "Frames".into(),
        product_code:  "FR-001".into(),
        gross,
        net,
    }
}

fn dataset() -> Vec<Transaction> {
    vec![
        // Big spender who stopped buying.
        sale("2024-01-01", "C1", "S1", "O1", 5000.0, 5000.0),
        // Big spender still active, across two stores.
        sale("2024-06-20", "C2", "S1", "O2", 3000.0, 3000.0),
        sale("2024-06-25", "C2", "S2", "O3", 2500.0, 2000.0),
        // Small, recent.
        sale("2024-06-30", "C3", "S1", "O4", 10.0, 10.0),
        // Exactly on the inactivity boundary.
        sale("2024-04-01", "C4", "S2", "O5", 50.0, 50.0),
    ]
}

fn tag_of(profiles: &[revenue_core::classify::CustomerProfile], id: &str) -> CustomerTag {
    profiles.iter().find(|p| p.customer_id == id).unwrap().tag
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// The reference date is the latest transaction date in the rows.
#[test]
fn reference_date_is_latest_row() {
    assert_eq!(reference_date(&dataset()), Some(d("2024-06-30")));
    assert_eq!(reference_date(&[]), None);
}

/// Inactivity wins over VIP: a lapsed big spender is Inactive.
#[test]
fn inactive_checked_before_vip() {
    let rows = dataset();
    let profiles = classify(&rows, d("2024-06-30"), INACTIVE_DAYS, VIP, true);

    assert_eq!(tag_of(&profiles, "C1"), CustomerTag::Inactive);
    assert_eq!(tag_of(&profiles, "C2"), CustomerTag::Vip);
    assert_eq!(tag_of(&profiles, "C3"), CustomerTag::Regular);
    assert_eq!(tag_of(&profiles, "C4"), CustomerTag::Inactive, "boundary is inclusive");

    let c1 = profiles.iter().find(|p| p.customer_id == "C1").unwrap();
    assert_eq!(c1.days_inactive, 181);
    assert_eq!(c1.customer_name, "Name of C1");
}

/// Tag assignment on its own follows the same precedence.
#[test]
fn tag_assignment_thresholds() {
    assert_eq!(CustomerTag::assign(89, 999.0, 90, 1000.0), CustomerTag::Regular);
    assert_eq!(CustomerTag::assign(89, 1000.0, 90, 1000.0), CustomerTag::Vip);
    assert_eq!(CustomerTag::assign(90, 1_000_000.0, 90, 1000.0), CustomerTag::Inactive);
}

/// Grouping per customer-and-store splits a multi-store customer; grouping
/// per customer merges them.
#[test]
fn grouping_cardinality() {
    let rows = dataset();
    let today = d("2024-06-30");

    let per_pair = classify(&rows, today, INACTIVE_DAYS, VIP, false);
    assert_eq!(per_pair.len(), 5);
    let c2: Vec<_> = per_pair.iter().filter(|p| p.customer_id == "C2").collect();
    assert_eq!(c2.len(), 2);
    assert_eq!(c2[0].store.as_deref(), Some("S1"));
    assert_eq!(c2[1].store.as_deref(), Some("S2"));
    // 2000 net in S2 alone crosses the threshold; 3000 in S1 too.
    assert!(c2.iter().all(|p| p.tag == CustomerTag::Vip));

    let per_customer = classify(&rows, today, INACTIVE_DAYS, VIP, true);
    assert_eq!(per_customer.len(), 4);
    let merged = per_customer.iter().find(|p| p.customer_id == "C2").unwrap();
    assert_eq!(merged.store, None);
    assert_eq!(merged.net_sum, 5000.0);
    assert_eq!(merged.order_count, 2);
    assert_eq!(merged.first_order_date, d("2024-06-20"));
    assert_eq!(merged.last_order_date, d("2024-06-25"));
    assert_eq!(merged.days_inactive, 5);
}

/// The CRM filter keeps the chosen tags above a net floor.
#[test]
fn crm_filter_and_totals() {
    let rows = dataset();
    let profiles = classify(&rows, d("2024-06-30"), INACTIVE_DAYS, VIP, true);

    let keep_all = CrmFilter::default().apply(&profiles);
    assert_eq!(keep_all.len(), profiles.len());

    let inactive = CrmFilter {
        tags:    vec![CustomerTag::Inactive],
        min_net: 100.0,
    }
    .apply(&profiles);
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].customer_id, "C1");

    let totals = crm_totals(&profiles);
    assert_eq!(totals.rows, 4);
    assert_eq!(totals.distinct_customers, 4);
    assert_eq!(totals.net_sum, 10060.0);
    assert_eq!(totals.order_count, 5);

    let empty = crm_totals(&[]);
    assert_eq!(empty.rows, 0);
    assert_eq!(empty.mean_discount_pct, 0.0);
}

//! Period aggregation: sums, discount, growth and latest-period rankings.

use chrono::{NaiveDate, Weekday};
use revenue_core::{
    aggregate::{aggregate, dimension_totals, latest_period_ranking, summarize},
    period::{Granularity, PeriodKey},
    types::{Dimension, SliceMode, Transaction},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn tx(date: &str, order: &str, customer: &str, region: &str, gross: f64, net: f64) -> Transaction {
    Transaction {
        date:          NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        order_id:      order.into(),
        customer_id:   customer.into(),
        customer_name: String::new(),
        name_check:    String::new(),
        phone_check:   String::new(),
        store:         format!("{region}-1"),
        region:        region.into(),
        brand:         "Lumen".into(),
        doc_type:      "sale".into(),
        product_group: "Frames".into(),
        product_code:  "FR-001".into(),
        gross,
        net,
    }
}

fn monthly(rows: &[Transaction], dim: Option<Dimension>) -> Vec<revenue_core::aggregate::PeriodAggregate> {
    aggregate(rows, Granularity::Month, Weekday::Mon, dim)
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// A single row with zero gross and zero net has a 0% discount, not an error.
#[test]
fn zero_gross_has_zero_discount() {
    let rows = vec![tx("2024-01-05", "O1", "C1", "North", 0.0, 0.0)];
    let out = monthly(&rows, None);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].discount_pct, 0.0);
    assert!(out[0].growth_pct.is_none());
}

/// Empty input is "no data", not an error.
#[test]
fn empty_input_gives_empty_output() {
    assert!(monthly(&[], None).is_empty());
    assert!(monthly(&[], Some(Dimension::Region)).is_empty());
    assert_eq!(summarize(&[]).discount_pct, 0.0);
}

/// Sums, distinct counts, discount and growth against the prior period.
#[test]
fn monthly_totals_and_growth() {
    let rows = vec![
        tx("2024-01-05", "O1", "C1", "North", 100.0, 80.0),
        tx("2024-01-05", "O1", "C1", "North", 100.0, 100.0),
        tx("2024-01-20", "O2", "C2", "North", 50.0, 20.0),
        tx("2024-02-01", "O3", "C1", "North", 300.0, 300.0),
    ];
    let out = monthly(&rows, None);
    assert_eq!(out.len(), 2);

    let jan = &out[0];
    assert_eq!(jan.period, PeriodKey::Month { year: 2024, month: 1 });
    assert_eq!(jan.label, "2024-01");
    assert_eq!(jan.gross_sum, 250.0);
    assert_eq!(jan.net_sum, 200.0);
    assert_eq!(jan.distinct_orders, 2);
    assert_eq!(jan.distinct_customers, 2);
    assert!((jan.discount_pct - 20.0).abs() < 1e-9);
    assert_eq!(jan.prev_net_sum, None);
    assert_eq!(jan.growth_pct, None);

    let feb = &out[1];
    assert_eq!(feb.prev_net_sum, Some(200.0));
    assert!((feb.growth_pct.unwrap() - 50.0).abs() < 1e-9);
    assert_eq!(feb.prev_gross_sum, Some(250.0));
    assert!((feb.gross_growth_pct.unwrap() - 20.0).abs() < 1e-9);
}

/// The previous-period pointer restarts at every dimension value: the first
/// period of each region never shows a previous value or growth.
#[test]
fn growth_restarts_per_dimension_group() {
    let rows = vec![
        tx("2024-01-10", "O1", "C1", "North", 100.0, 100.0),
        tx("2024-02-10", "O2", "C1", "North", 150.0, 150.0),
        tx("2024-02-10", "O3", "C2", "South", 400.0, 400.0),
        tx("2024-03-10", "O4", "C2", "South", 200.0, 200.0),
    ];
    let out = monthly(&rows, Some(Dimension::Region));
    let labels: Vec<(Option<&str>, &str)> = out
        .iter()
        .map(|p| (p.dimension_value.as_deref(), p.label.as_str()))
        .collect();
    assert_eq!(
        labels,
        vec![
            (Some("North"), "2024-01"),
            (Some("North"), "2024-02"),
            (Some("South"), "2024-02"),
            (Some("South"), "2024-03"),
        ]
    );

    assert_eq!(out[0].prev_net_sum, None);
    assert!((out[1].growth_pct.unwrap() - 50.0).abs() < 1e-9);
    assert_eq!(out[2].prev_net_sum, None, "South must not inherit North's last value");
    assert_eq!(out[2].growth_pct, None);
    assert!((out[3].growth_pct.unwrap() + 50.0).abs() < 1e-9);
}

/// A zero previous value produces no growth figure rather than infinity.
#[test]
fn growth_is_null_when_previous_is_zero() {
    let rows = vec![
        tx("2024-01-10", "O1", "C1", "North", 10.0, 0.0),
        tx("2024-02-10", "O2", "C1", "North", 100.0, 100.0),
    ];
    let out = monthly(&rows, None);
    assert_eq!(out[1].prev_net_sum, Some(0.0));
    assert_eq!(out[1].growth_pct, None);
    assert!(out[1].gross_growth_pct.is_some());
}

/// Whole-window store totals come back sorted by net, largest first.
#[test]
fn dimension_totals_sorted_by_net() {
    let rows = vec![
        tx("2024-01-10", "O1", "C1", "North", 100.0, 90.0),
        tx("2024-02-10", "O2", "C2", "South", 500.0, 400.0),
        tx("2024-03-10", "O3", "C3", "North", 100.0, 90.0),
    ];
    let totals = dimension_totals(&rows, Dimension::Region);
    assert_eq!(totals[0].value, "South");
    assert_eq!(totals[1].value, "North");
    assert_eq!(totals[1].net_sum, 180.0);
    assert_eq!(totals[1].distinct_customers, 2);
}

/// Top and bottom rankings only look at the latest period.
#[test]
fn latest_period_ranking_uses_latest_period_only() {
    let rows = vec![
        tx("2024-01-10", "O1", "C1", "North", 9000.0, 9000.0),
        tx("2024-02-10", "O2", "C1", "North", 100.0, 100.0),
        tx("2024-02-11", "O3", "C2", "South", 300.0, 300.0),
        tx("2024-02-12", "O4", "C3", "East", 200.0, 200.0),
    ];
    let by_region = monthly(&rows, Some(Dimension::Region));

    let top = latest_period_ranking(&by_region, 2, SliceMode::Top);
    let names: Vec<_> = top.iter().map(|p| p.dimension_value.clone().unwrap()).collect();
    assert_eq!(names, vec!["South", "East"]);
    assert!(top.iter().all(|p| p.label == "2024-02"));

    let bottom = latest_period_ranking(&by_region, 1, SliceMode::Bottom);
    assert_eq!(bottom[0].dimension_value.as_deref(), Some("North"));
    assert!((bottom[0].growth_pct.unwrap() + 98.888_888).abs() < 1e-3);

    assert!(latest_period_ranking(&[], 5, SliceMode::Top).is_empty());
}

/// Product breakdown groups by product code and sorts by net.
#[test]
fn product_totals_and_breakdown() {
    let mut rows = vec![
        tx("2024-01-10", "O1", "C1", "North", 100.0, 100.0),
        tx("2024-01-11", "O2", "C2", "South", 300.0, 240.0),
        tx("2024-02-12", "O3", "C1", "North", 200.0, 200.0),
    ];
    rows[1].product_group = "Lenses".into();
    rows[1].product_code = "LN-007".into();

    let totals = dimension_totals(&rows, Dimension::Product);
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].value, "FR-001");
    assert_eq!(totals[0].net_sum, 300.0);
    assert_eq!(totals[0].distinct_orders, 2);
    assert_eq!(totals[0].distinct_customers, 1);
    assert_eq!(totals[1].value, "LN-007");
    assert!((totals[1].discount_pct - 20.0).abs() < 1e-9);

    let series = monthly(&rows, Some(Dimension::Product));
    let keys: Vec<(&str, &str)> = series
        .iter()
        .map(|p| (p.dimension_value.as_deref().unwrap(), p.label.as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![("FR-001", "2024-01"), ("FR-001", "2024-02"), ("LN-007", "2024-01")]
    );
    assert!((series[1].growth_pct.unwrap() - 100.0).abs() < 1e-9);

    assert_eq!("product".parse::<Dimension>().unwrap(), Dimension::Product);
    assert_eq!(Dimension::Product.name(), "product");
}

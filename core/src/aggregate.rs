//! Period aggregation: revenue per period (optionally per dimension value)
//! with period-over-period deltas.
//!
//! Groups are ordered by `(dimension_value, period)`. The "previous period"
//! pointer restarts at every dimension boundary, so the first period of each
//! group never carries a previous value or a growth figure.

use crate::{
    period::{assign, Granularity, PeriodKey},
    types::{discount_pct, Dimension, SliceMode, Transaction},
};
use chrono::Weekday;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAggregate {
    pub period:             PeriodKey,
    pub label:              String,
    pub dimension_value:    Option<String>,
    pub gross_sum:          f64,
    pub net_sum:            f64,
    pub distinct_orders:    usize,
    pub distinct_customers: usize,
    pub discount_pct:       f64,
    pub prev_net_sum:       Option<f64>,
    pub growth_pct:         Option<f64>,
    pub prev_gross_sum:     Option<f64>,
    pub gross_growth_pct:   Option<f64>,
}

/// Headline KPIs over a whole row set.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RevenueSummary {
    pub gross_sum:          f64,
    pub net_sum:            f64,
    pub distinct_orders:    usize,
    pub distinct_customers: usize,
    pub discount_pct:       f64,
}

/// Totals for one dimension value over the whole window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionTotal {
    pub value:              String,
    pub gross_sum:          f64,
    pub net_sum:            f64,
    pub distinct_orders:    usize,
    pub distinct_customers: usize,
    pub discount_pct:       f64,
}

// ── Accumulation ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Bucket<'a> {
    gross:     f64,
    net:       f64,
    orders:    HashSet<&'a str>,
    customers: HashSet<&'a str>,
}

impl<'a> Bucket<'a> {
    fn add(&mut self, row: &'a Transaction) {
        self.gross += row.gross;
        self.net += row.net;
        self.orders.insert(&row.order_id);
        self.customers.insert(&row.customer_id);
    }
}

/// `(current - prev) / prev * 100`, absent when there is no usable previous value.
fn growth(current: f64, prev: Option<f64>) -> Option<f64> {
    let prev = prev.filter(|p| *p != 0.0)?;
    let pct = (current - prev) / prev * 100.0;
    pct.is_finite().then_some(pct)
}

// ── Operations ───────────────────────────────────────────────────────────────

/// Aggregate rows into period buckets, optionally crossed with one dimension.
/// Empty input yields an empty result.
pub fn aggregate(
    rows: &[Transaction],
    granularity: Granularity,
    week_start: Weekday,
    dimension: Option<Dimension>,
) -> Vec<PeriodAggregate> {
    let mut groups: BTreeMap<(Option<&str>, PeriodKey), Bucket> = BTreeMap::new();
    for row in rows {
        let key = assign(row.date, granularity, week_start);
        let dim_value = dimension.map(|d| d.value_of(row));
        groups.entry((dim_value, key)).or_default().add(row);
    }

    let mut out = Vec::with_capacity(groups.len());
    let mut current_group: Option<Option<&str>> = None;
    let mut prev: Option<(f64, f64)> = None;

    for ((dim_value, period), bucket) in groups {
        if current_group != Some(dim_value) {
            current_group = Some(dim_value);
            prev = None;
        }
        let prev_gross_sum = prev.map(|(g, _)| g);
        let prev_net_sum = prev.map(|(_, n)| n);

        out.push(PeriodAggregate {
            period,
            label: period.label(),
            dimension_value: dim_value.map(str::to_string),
            gross_sum: bucket.gross,
            net_sum: bucket.net,
            distinct_orders: bucket.orders.len(),
            distinct_customers: bucket.customers.len(),
            discount_pct: discount_pct(bucket.gross, bucket.net),
            prev_net_sum,
            growth_pct: growth(bucket.net, prev_net_sum),
            prev_gross_sum,
            gross_growth_pct: growth(bucket.gross, prev_gross_sum),
        });
        prev = Some((bucket.gross, bucket.net));
    }

    log::debug!(
        "aggregate: {} rows -> {} {} buckets (dimension={:?})",
        rows.len(),
        out.len(),
        granularity.name(),
        dimension.map(|d| d.name())
    );
    out
}

pub fn summarize(rows: &[Transaction]) -> RevenueSummary {
    let mut bucket = Bucket::default();
    for row in rows {
        bucket.add(row);
    }
    RevenueSummary {
        gross_sum: bucket.gross,
        net_sum: bucket.net,
        distinct_orders: bucket.orders.len(),
        distinct_customers: bucket.customers.len(),
        discount_pct: discount_pct(bucket.gross, bucket.net),
    }
}

/// Whole-window totals per dimension value, net descending.
pub fn dimension_totals(rows: &[Transaction], dimension: Dimension) -> Vec<DimensionTotal> {
    let mut groups: BTreeMap<&str, Bucket> = BTreeMap::new();
    for row in rows {
        groups.entry(dimension.value_of(row)).or_default().add(row);
    }

    let mut out: Vec<DimensionTotal> = groups
        .into_iter()
        .map(|(value, b)| DimensionTotal {
            value: value.to_string(),
            gross_sum: b.gross,
            net_sum: b.net,
            distinct_orders: b.orders.len(),
            distinct_customers: b.customers.len(),
            discount_pct: discount_pct(b.gross, b.net),
        })
        .collect();
    out.sort_by(|a, b| b.net_sum.total_cmp(&a.net_sum).then_with(|| a.value.cmp(&b.value)));
    out
}

/// Rows of the latest period only, ranked by net: highest first for `Top`,
/// lowest first for `Bottom`. At most `n` rows.
pub fn latest_period_ranking(
    aggregates: &[PeriodAggregate],
    n: usize,
    mode: SliceMode,
) -> Vec<PeriodAggregate> {
    let Some(latest) = aggregates.iter().map(|a| a.period).max() else {
        return Vec::new();
    };

    let mut latest_rows: Vec<PeriodAggregate> = aggregates
        .iter()
        .filter(|a| a.period == latest)
        .cloned()
        .collect();
    latest_rows.sort_by(|a, b| {
        let by_net = match mode {
            SliceMode::Top    => b.net_sum.total_cmp(&a.net_sum),
            SliceMode::Bottom => a.net_sum.total_cmp(&b.net_sum),
        };
        by_net.then_with(|| a.dimension_value.cmp(&b.dimension_value))
    });
    latest_rows.truncate(n);
    latest_rows
}

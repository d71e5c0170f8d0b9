//! Customer Pareto ranking.
//!
//! Each store is ranked on its own: customers sorted by net revenue
//! descending (ties by ascending customer id), with contribution and running
//! cumulative share against the store's total net. A Top or Bottom slice is
//! then cut from that single ranking.
//!
//! A Bottom slice keeps the percentages of the full ranking, so its
//! cumulative share ends at ~100% instead of restarting from zero.

use crate::{
    error::{ReportError, ReportResult},
    types::{discount_pct, CustomerId, RevenueBasis, SliceMode, Transaction},
};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRankRow {
    pub store:            String,
    pub customer_id:      CustomerId,
    /// 1-based position in the store's full descending ranking.
    pub rank:             usize,
    pub gross_sum:        f64,
    pub net_sum:          f64,
    pub order_count:      usize,
    pub discount_pct:     f64,
    pub contribution_pct: f64,
    pub cumulative_pct:   f64,
}

/// A customer in the all-stores ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCustomer {
    pub customer_id:  CustomerId,
    pub gross_sum:    f64,
    pub net_sum:      f64,
    pub order_count:  usize,
    pub discount_pct: f64,
}

#[derive(Default)]
struct CustomerTotals<'a> {
    gross:  f64,
    net:    f64,
    orders: HashSet<&'a str>,
}

fn validate_percent(percent: u32) -> ReportResult<()> {
    if (1..=100).contains(&percent) {
        Ok(())
    } else {
        Err(ReportError::invalid(
            "percent",
            format!("must be within 1..=100, got {percent}"),
        ))
    }
}

/// `max(1, floor(count * percent / 100))`.
pub fn slice_len(count: usize, percent: u32) -> usize {
    (count * percent as usize / 100).max(1)
}

fn totals_by_customer<'a, I>(rows: I) -> BTreeMap<&'a str, CustomerTotals<'a>>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut by_customer: BTreeMap<&str, CustomerTotals> = BTreeMap::new();
    for row in rows {
        let t = by_customer.entry(row.customer_id.as_str()).or_default();
        t.gross += row.gross;
        t.net += row.net;
        t.orders.insert(&row.order_id);
    }
    by_customer
}

fn rank_store(store: &str, customers: BTreeMap<&str, CustomerTotals>) -> Vec<CustomerRankRow> {
    let mut ranked: Vec<(&str, CustomerTotals)> = customers.into_iter().collect();
    // The map is already in ascending id order; the sort is stable.
    ranked.sort_by(|a, b| b.1.net.total_cmp(&a.1.net));

    let store_net: f64 = ranked.iter().map(|(_, t)| t.net).sum();
    let mut cumulative = 0.0;

    ranked
        .into_iter()
        .enumerate()
        .map(|(i, (customer_id, t))| {
            let contribution_pct = if store_net != 0.0 {
                t.net / store_net * 100.0
            } else {
                0.0
            };
            cumulative += contribution_pct;
            CustomerRankRow {
                store: store.to_string(),
                customer_id: customer_id.to_string(),
                rank: i + 1,
                gross_sum: t.gross,
                net_sum: t.net,
                order_count: t.orders.len(),
                discount_pct: discount_pct(t.gross, t.net),
                contribution_pct,
                cumulative_pct: cumulative,
            }
        })
        .collect()
}

/// Full per-store ranking with no slicing, stores in ascending order.
pub fn rank_all(rows: &[Transaction]) -> Vec<CustomerRankRow> {
    let mut by_store: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
    for row in rows {
        by_store.entry(row.store.as_str()).or_default().push(row);
    }
    by_store
        .into_iter()
        .flat_map(|(store, store_rows)| rank_store(store, totals_by_customer(store_rows)))
        .collect()
}

/// Top or Bottom `percent`% of customers per store.
pub fn rank(rows: &[Transaction], percent: u32, mode: SliceMode) -> ReportResult<Vec<CustomerRankRow>> {
    validate_percent(percent)?;

    let full = rank_all(rows);
    let mut out = Vec::new();
    for store_rows in full.chunk_by(|a, b| a.store == b.store) {
        let n = slice_len(store_rows.len(), percent);
        let slice = match mode {
            SliceMode::Top    => &store_rows[..n],
            SliceMode::Bottom => &store_rows[store_rows.len() - n..],
        };
        out.extend_from_slice(slice);
    }

    log::debug!(
        "pareto: {:?} {percent}% -> {} of {} customer rows",
        mode,
        out.len(),
        full.len()
    );
    Ok(out)
}

/// Top `percent`% of customers across all stores by the chosen revenue basis.
pub fn rank_overall(
    rows: &[Transaction],
    percent: u32,
    basis: RevenueBasis,
) -> ReportResult<Vec<TopCustomer>> {
    validate_percent(percent)?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut customers: Vec<TopCustomer> = totals_by_customer(rows)
        .into_iter()
        .map(|(customer_id, t)| TopCustomer {
            customer_id: customer_id.to_string(),
            gross_sum: t.gross,
            net_sum: t.net,
            order_count: t.orders.len(),
            discount_pct: discount_pct(t.gross, t.net),
        })
        .collect();
    customers.sort_by(|a, b| match basis {
        RevenueBasis::Net   => b.net_sum.total_cmp(&a.net_sum),
        RevenueBasis::Gross => b.gross_sum.total_cmp(&a.gross_sum),
    });

    customers.truncate(slice_len(customers.len(), percent));
    Ok(customers)
}

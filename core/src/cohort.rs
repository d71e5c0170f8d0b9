//! Cohort retention: customers grouped by the month of their first purchase,
//! with cumulative month-by-month return rates.
//!
//! First-purchase dates come from the whole dataset while retention is
//! counted on the filtered rows, so narrowing the report window does not
//! move a customer into a later cohort.
//!
//! Cohort size counts the customers seen in the cohort month of the filtered
//! rows. Returns count every cohort member seen at offsets `1..=m`, including
//! members whose first month was filtered out, so a narrow filter can push a
//! rate above 100%.

use crate::{
    error::{ReportError, ReportResult},
    period::{month_diff, month_start, PeriodKey},
    types::{CustomerId, Transaction},
};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortLabel {
    /// Calendar month of first purchase.
    Cohort(PeriodKey),
    GrandTotal,
}

impl CohortLabel {
    pub fn label(&self) -> String {
        match self {
            Self::Cohort(key) => key.label(),
            Self::GrandTotal  => "Grand Total".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetentionRow {
    pub cohort:              CohortLabel,
    pub cohort_size:         usize,
    /// Offset `m` -> % of the cohort that came back in months `1..=m`.
    pub pct_by_month_offset: BTreeMap<u32, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetentionMatrix {
    pub max_month_offset: u32,
    /// Cohorts in chronological order.
    pub cohorts:          Vec<RetentionRow>,
    /// Size-weighted aggregate of all cohorts; absent when there are none.
    pub grand_total:      Option<RetentionRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CustomerMix {
    pub new_customers:       usize,
    pub returning_customers: usize,
}

#[derive(Default)]
struct CohortMembers<'a> {
    /// Customers with a transaction in the cohort month itself.
    founders:      HashSet<&'a str>,
    /// Earliest positive month offset seen per customer.
    first_return:  HashMap<&'a str, u32>,
}

// ── Operations ───────────────────────────────────────────────────────────────

/// Earliest transaction date per customer.
pub fn first_purchase(rows: &[Transaction]) -> HashMap<CustomerId, NaiveDate> {
    let mut first: HashMap<CustomerId, NaiveDate> = HashMap::new();
    for row in rows {
        first
            .entry(row.customer_id.clone())
            .and_modify(|d| *d = (*d).min(row.date))
            .or_insert(row.date);
    }
    first
}

/// Build the cumulative retention matrix for offsets `1..=max_month_offset`.
pub fn build(
    rows: &[Transaction],
    global_first_purchase: &HashMap<CustomerId, NaiveDate>,
    max_month_offset: u32,
) -> ReportResult<RetentionMatrix> {
    if max_month_offset == 0 {
        return Err(ReportError::invalid("max_month_offset", "must be at least 1"));
    }

    let mut cohorts: BTreeMap<PeriodKey, CohortMembers> = BTreeMap::new();
    let mut unknown = 0usize;
    let mut before_first = 0usize;

    for row in rows {
        let Some(first) = global_first_purchase.get(&row.customer_id) else {
            unknown += 1;
            continue;
        };
        let first_month = month_start(*first);
        let index = month_diff(row.date, first_month);
        if index < 0 {
            before_first += 1;
            continue;
        }

        let key = PeriodKey::Month {
            year:  first_month.year(),
            month: first_month.month(),
        };
        let members = cohorts.entry(key).or_default();
        let customer = row.customer_id.as_str();
        if index == 0 {
            members.founders.insert(customer);
        } else {
            let index = index as u32;
            members
                .first_return
                .entry(customer)
                .and_modify(|m| *m = (*m).min(index))
                .or_insert(index);
        }
    }

    if unknown > 0 || before_first > 0 {
        log::debug!(
            "cohort: skipped {unknown} rows without a first purchase, {before_first} rows before it"
        );
    }

    let rows_out: Vec<RetentionRow> = cohorts
        .into_iter()
        .filter(|(_, m)| !m.founders.is_empty())
        .map(|(key, members)| {
            let size = members.founders.len();
            let pct_by_month_offset = (1..=max_month_offset)
                .map(|m| {
                    let returned = members
                        .first_return
                        .values()
                        .filter(|r| **r <= m)
                        .count();
                    let pct = if size > 0 {
                        returned as f64 / size as f64 * 100.0
                    } else {
                        0.0
                    };
                    (m, pct)
                })
                .collect();
            RetentionRow {
                cohort: CohortLabel::Cohort(key),
                cohort_size: size,
                pct_by_month_offset,
            }
        })
        .collect();

    let grand_total = grand_total(&rows_out, max_month_offset);
    Ok(RetentionMatrix {
        max_month_offset,
        cohorts: rows_out,
        grand_total,
    })
}

/// Cohort-size weighted mean per offset.
fn grand_total(cohorts: &[RetentionRow], max_month_offset: u32) -> Option<RetentionRow> {
    if cohorts.is_empty() {
        return None;
    }
    let total: usize = cohorts.iter().map(|c| c.cohort_size).sum();
    let pct_by_month_offset = (1..=max_month_offset)
        .map(|m| {
            let weighted: f64 = cohorts
                .iter()
                .map(|c| c.pct_by_month_offset.get(&m).copied().unwrap_or(0.0) * c.cohort_size as f64)
                .sum();
            let pct = if total > 0 { weighted / total as f64 } else { 0.0 };
            (m, pct)
        })
        .collect();
    Some(RetentionRow {
        cohort: CohortLabel::GrandTotal,
        cohort_size: total,
        pct_by_month_offset,
    })
}

/// Split the customers of `rows` into first-time buyers (global first
/// purchase on or after `window_start`) and returning buyers.
pub fn customer_mix(
    rows: &[Transaction],
    global_first_purchase: &HashMap<CustomerId, NaiveDate>,
    window_start: NaiveDate,
) -> CustomerMix {
    let customers: HashSet<&str> = rows.iter().map(|r| r.customer_id.as_str()).collect();
    let mut mix = CustomerMix::default();
    for customer in customers {
        match global_first_purchase.get(customer) {
            Some(first) if *first < window_start => mix.returning_customers += 1,
            _ => mix.new_customers += 1,
        }
    }
    mix
}

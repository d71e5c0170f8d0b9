//! Customer classification: lifetime metrics and VIP / Inactive / Regular
//! tags for the CRM export.
//!
//! Tag precedence is fixed: the inactivity check runs before the VIP check,
//! so a high spender who stopped buying is tagged Inactive.

use crate::types::{discount_pct, CustomerId, Transaction};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerTag {
    Vip,
    Inactive,
    Regular,
}

impl CustomerTag {
    /// First match wins: Inactive, then VIP, else Regular.
    pub fn assign(days_inactive: i64, net_sum: f64, inactive_days: u32, vip_net_threshold: f64) -> Self {
        if days_inactive >= i64::from(inactive_days) {
            Self::Inactive
        } else if net_sum >= vip_net_threshold {
            Self::Vip
        } else {
            Self::Regular
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerProfile {
    pub customer_id:      CustomerId,
    /// Present only when profiles are built per customer-and-store.
    pub store:            Option<String>,
    pub customer_name:    String,
    pub name_check:       String,
    pub phone_check:      String,
    pub gross_sum:        f64,
    pub net_sum:          f64,
    pub order_count:      usize,
    pub discount_pct:     f64,
    pub first_order_date: NaiveDate,
    pub last_order_date:  NaiveDate,
    pub days_inactive:    i64,
    pub tag:              CustomerTag,
}

/// Post-classification filter of the CRM table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CrmFilter {
    /// Tags to keep. Empty keeps every tag.
    #[serde(default)]
    pub tags:    Vec<CustomerTag>,
    #[serde(default)]
    pub min_net: f64,
}

impl CrmFilter {
    pub fn apply(&self, profiles: &[CustomerProfile]) -> Vec<CustomerProfile> {
        profiles
            .iter()
            .filter(|p| p.net_sum >= self.min_net)
            .filter(|p| self.tags.is_empty() || self.tags.contains(&p.tag))
            .cloned()
            .collect()
    }
}

/// Footer row of the CRM table.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CrmTotals {
    pub rows:               usize,
    pub distinct_customers: usize,
    pub gross_sum:          f64,
    pub net_sum:            f64,
    pub order_count:        usize,
    /// Unweighted mean of the per-row discount rates.
    pub mean_discount_pct:  f64,
}

struct Accumulator<'a> {
    first_row:  &'a Transaction,
    gross:      f64,
    net:        f64,
    orders:     HashSet<&'a str>,
    first_date: NaiveDate,
    last_date:  NaiveDate,
}

impl<'a> Accumulator<'a> {
    fn new(row: &'a Transaction) -> Self {
        Self {
            first_row:  row,
            gross:      0.0,
            net:        0.0,
            orders:     HashSet::new(),
            first_date: row.date,
            last_date:  row.date,
        }
    }

    fn add(&mut self, row: &'a Transaction) {
        self.gross += row.gross;
        self.net += row.net;
        self.orders.insert(&row.order_id);
        if row.date < self.first_date {
            self.first_date = row.date;
            self.first_row = row;
        }
        self.last_date = self.last_date.max(row.date);
    }
}

/// Latest transaction date in the rows: the "today" of the report.
pub fn reference_date(rows: &[Transaction]) -> Option<NaiveDate> {
    rows.iter().map(|r| r.date).max()
}

/// Build one profile per customer (or per customer-and-store) and tag it.
pub fn classify(
    rows: &[Transaction],
    reference_date: NaiveDate,
    inactive_days: u32,
    vip_net_threshold: f64,
    group_by_customer_only: bool,
) -> Vec<CustomerProfile> {
    let mut groups: BTreeMap<(&str, Option<&str>), Accumulator> = BTreeMap::new();
    for row in rows {
        let store = (!group_by_customer_only).then_some(row.store.as_str());
        groups
            .entry((row.customer_id.as_str(), store))
            .or_insert_with(|| Accumulator::new(row))
            .add(row);
    }

    groups
        .into_iter()
        .map(|((customer_id, store), acc)| {
            let days_inactive = (reference_date - acc.last_date).num_days();
            CustomerProfile {
                customer_id: customer_id.to_string(),
                store: store.map(str::to_string),
                customer_name: acc.first_row.customer_name.clone(),
                name_check: acc.first_row.name_check.clone(),
                phone_check: acc.first_row.phone_check.clone(),
                gross_sum: acc.gross,
                net_sum: acc.net,
                order_count: acc.orders.len(),
                discount_pct: discount_pct(acc.gross, acc.net),
                first_order_date: acc.first_date,
                last_order_date: acc.last_date,
                days_inactive,
                tag: CustomerTag::assign(days_inactive, acc.net, inactive_days, vip_net_threshold),
            }
        })
        .collect()
}

pub fn crm_totals(profiles: &[CustomerProfile]) -> CrmTotals {
    if profiles.is_empty() {
        return CrmTotals::default();
    }
    let distinct: HashSet<&str> = profiles.iter().map(|p| p.customer_id.as_str()).collect();
    CrmTotals {
        rows: profiles.len(),
        distinct_customers: distinct.len(),
        gross_sum: profiles.iter().map(|p| p.gross_sum).sum(),
        net_sum: profiles.iter().map(|p| p.net_sum).sum(),
        order_count: profiles.iter().map(|p| p.order_count).sum(),
        mean_discount_pct: profiles.iter().map(|p| p.discount_pct).sum::<f64>()
            / profiles.len() as f64,
    }
}

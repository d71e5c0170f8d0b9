//! Seeded synthetic sales data for demo runs and tests.

use crate::{
    error::{ReportError, ReportResult},
    rng::{SampleRng, SampleStream},
    types::Transaction,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

const REGIONS: [&str; 3] = ["North", "Central", "South"];
const BRANDS: [&str; 2] = ["Lumen", "Vera"];
const FIRST_NAMES: [&str; 8] = ["An", "Binh", "Chi", "Dung", "Giang", "Hoa", "Khanh", "Linh"];
const LAST_NAMES: [&str; 6] = ["Nguyen", "Tran", "Le", "Pham", "Hoang", "Vo"];
/// Product groups with their code prefix.
const PRODUCT_GROUPS: [(&str, &str); 4] = [
    ("Frames", "FR"),
    ("Lenses", "LN"),
    ("Sunglasses", "SG"),
    ("Accessories", "AC"),
];
const CODES_PER_GROUP: u64 = 25;
/// Above this the visit loop almost never terminates.
const MAX_REPEAT_VISITS: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSpec {
    pub start:          NaiveDate,
    pub days:           u32,
    pub stores:         usize,
    pub customers:      usize,
    /// Mean extra visits per customer after the first one.
    pub repeat_visits:  f64,
    /// Minimum basket line value before discount.
    pub basket_min:     f64,
    pub basket_alpha:   f64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            start:         NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            days:          365,
            stores:        6,
            customers:     400,
            repeat_visits: 3.0,
            basket_min:    150_000.0,
            basket_alpha:  1.6,
        }
    }
}

impl SampleSpec {
    pub fn validate(&self) -> ReportResult<()> {
        if !self.repeat_visits.is_finite()
            || self.repeat_visits < 0.0
            || self.repeat_visits > MAX_REPEAT_VISITS
        {
            return Err(ReportError::invalid(
                "repeat_visits",
                format!("must be within 0..={MAX_REPEAT_VISITS}, got {}", self.repeat_visits),
            ));
        }
        if !self.basket_min.is_finite() || self.basket_min <= 0.0 {
            return Err(ReportError::invalid("basket_min", "must be a positive number"));
        }
        if !self.basket_alpha.is_finite() || self.basket_alpha <= 0.0 {
            return Err(ReportError::invalid("basket_alpha", "must be a positive number"));
        }
        Ok(())
    }
}

struct SampleStore {
    name:   String,
    region: &'static str,
    brand:  &'static str,
}

struct SampleCustomer {
    id:        String,
    name:      String,
    home:      usize,
    first_day: u32,
}

/// Generate a deterministic dataset: same seed and settings, same rows.
/// Rows are ordered by date, then order id.
pub fn generate_sales(seed: u64, spec: &SampleSpec) -> ReportResult<Vec<Transaction>> {
    spec.validate()?;
    if spec.stores == 0 || spec.customers == 0 || spec.days == 0 {
        return Ok(Vec::new());
    }

    let stores: Vec<SampleStore> = (0..spec.stores)
        .map(|i| SampleStore {
            name:   format!("Store {:02}", i + 1),
            region: REGIONS[i % REGIONS.len()],
            brand:  BRANDS[i % BRANDS.len()],
        })
        .collect();

    let mut customer_rng = SampleRng::new(seed, SampleStream::Customers);
    let customers: Vec<SampleCustomer> = (0..spec.customers)
        .map(|i| SampleCustomer {
            id:        format!("09{:08}", 10_000_000 + i),
            name:      format!(
                "{} {}",
                customer_rng.pick(&LAST_NAMES).copied().unwrap_or_default(),
                customer_rng.pick(&FIRST_NAMES).copied().unwrap_or_default()
            ),
            home:      customer_rng.next_u64_below(stores.len() as u64) as usize,
            first_day: customer_rng.next_u64_below(u64::from(spec.days)) as u32,
        })
        .collect();

    let mut visit_rng = SampleRng::new(seed, SampleStream::Visits);
    let mut basket_rng = SampleRng::new(seed, SampleStream::Baskets);
    let mut product_rng = SampleRng::new(seed, SampleStream::Products);
    let mut rows = Vec::new();
    let mut order_seq = 0u64;

    for customer in &customers {
        let mut days = vec![customer.first_day];
        let remaining = spec.days - customer.first_day;
        // Geometric number of repeat visits with the requested mean.
        let p_more = spec.repeat_visits / (1.0 + spec.repeat_visits);
        while remaining > 1 && visit_rng.chance(p_more) {
            days.push(customer.first_day + visit_rng.next_u64_below(u64::from(remaining)) as u32);
        }

        for day in days {
            order_seq += 1;
            let store_idx = if visit_rng.chance(0.85) {
                customer.home
            } else {
                visit_rng.next_u64_below(stores.len() as u64) as usize
            };
            let store = &stores[store_idx];
            let date = spec.start + Duration::days(i64::from(day));
            let lines = 1 + basket_rng.next_u64_below(3);
            for _ in 0..lines {
                let (product_group, prefix) =
                    product_rng.pick(&PRODUCT_GROUPS).copied().unwrap_or(("", ""));
                let product_code =
                    format!("{prefix}-{:03}", 1 + product_rng.next_u64_below(CODES_PER_GROUP));
                let gross = (basket_rng.pareto(spec.basket_min, spec.basket_alpha) / 1000.0).round() * 1000.0;
                let discount = if basket_rng.chance(0.3) {
                    0.05 + basket_rng.next_f64() * 0.15
                } else {
                    0.0
                };
                rows.push(Transaction {
                    date,
                    order_id:      format!("HD{order_seq:07}"),
                    customer_id:   customer.id.clone(),
                    customer_name: customer.name.clone(),
                    name_check:    "ok".to_string(),
                    phone_check:   "valid".to_string(),
                    store:         store.name.clone(),
                    region:        store.region.to_string(),
                    brand:         store.brand.to_string(),
                    doc_type:      "sale".to_string(),
                    product_group: product_group.to_string(),
                    product_code,
                    gross,
                    net:           (gross * (1.0 - discount)).round(),
                });
            }
        }
    }

    rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.order_id.cmp(&b.order_id)));
    Ok(rows)
}

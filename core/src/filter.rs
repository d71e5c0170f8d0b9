//! Filter selections and their resolution into concrete allow-lists.
//!
//! A multi-select is either `All` or an explicit subset. Before any rows
//! reach the analytics components every `All` is resolved to the set of
//! values actually present in the dataset, so downstream code only ever sees
//! concrete sets.

use crate::{
    error::{ReportError, ReportResult},
    types::Transaction,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    Subset(BTreeSet<String>),
}

impl Selection {
    pub fn subset<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Subset(values.into_iter().map(Into::into).collect())
    }

    /// Resolve against the values available in the data.
    /// Subset members that are not available are dropped.
    pub fn resolve(&self, available: &BTreeSet<String>) -> BTreeSet<String> {
        match self {
            Self::All => available.clone(),
            Self::Subset(chosen) => chosen.intersection(available).cloned().collect(),
        }
    }
}

/// Raw filter choices as they come from the sidebar / CLI / config file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub date_from:      Option<NaiveDate>,
    #[serde(default)]
    pub date_to:        Option<NaiveDate>,
    #[serde(default)]
    pub brands:         Selection,
    #[serde(default)]
    pub regions:        Selection,
    #[serde(default)]
    pub stores:         Selection,
    #[serde(default)]
    pub doc_types:      Selection,
    #[serde(default)]
    pub product_groups: Selection,
    #[serde(default)]
    pub name_checks:    Selection,
    #[serde(default)]
    pub phone_checks:   Selection,
}

/// Filter with every selection turned into a concrete allow-list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedFilter {
    pub date_from:      Option<NaiveDate>,
    pub date_to:        Option<NaiveDate>,
    pub brands:         BTreeSet<String>,
    pub regions:        BTreeSet<String>,
    pub stores:         BTreeSet<String>,
    pub doc_types:      BTreeSet<String>,
    pub product_groups: BTreeSet<String>,
    pub name_checks:    BTreeSet<String>,
    pub phone_checks:   BTreeSet<String>,
}

/// Distinct values of one column.
pub fn distinct_values<F>(rows: &[Transaction], column: F) -> BTreeSet<String>
where
    F: Fn(&Transaction) -> &str,
{
    rows.iter().map(|r| column(r).to_string()).collect()
}

impl FilterSet {
    pub fn validate(&self) -> ReportResult<()> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(ReportError::invalid(
                    "date_from",
                    format!("{from} is after date_to {to}"),
                ));
            }
        }
        Ok(())
    }

    pub fn resolve(&self, rows: &[Transaction]) -> ResolvedFilter {
        ResolvedFilter {
            date_from:      self.date_from,
            date_to:        self.date_to,
            brands:         self.brands.resolve(&distinct_values(rows, |r| r.brand.as_str())),
            regions:        self.regions.resolve(&distinct_values(rows, |r| r.region.as_str())),
            stores:         self.stores.resolve(&distinct_values(rows, |r| r.store.as_str())),
            doc_types:      self.doc_types.resolve(&distinct_values(rows, |r| r.doc_type.as_str())),
            product_groups: self.product_groups.resolve(&distinct_values(rows, |r| r.product_group.as_str())),
            name_checks:    self.name_checks.resolve(&distinct_values(rows, |r| r.name_check.as_str())),
            phone_checks:   self.phone_checks.resolve(&distinct_values(rows, |r| r.phone_check.as_str())),
        }
    }
}

impl ResolvedFilter {
    pub fn matches(&self, row: &Transaction) -> bool {
        self.date_from.map_or(true, |from| row.date >= from)
            && self.date_to.map_or(true, |to| row.date <= to)
            && self.brands.contains(&row.brand)
            && self.regions.contains(&row.region)
            && self.stores.contains(&row.store)
            && self.doc_types.contains(&row.doc_type)
            && self.product_groups.contains(&row.product_group)
            && self.name_checks.contains(&row.name_check)
            && self.phone_checks.contains(&row.phone_check)
    }

    /// Filtered copy of the rows; the input is left untouched.
    pub fn apply(&self, rows: &[Transaction]) -> Vec<Transaction> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Options offered by the Brand → Region → Store cascade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CascadeOptions {
    pub brands:  BTreeSet<String>,
    pub regions: BTreeSet<String>,
    pub stores:  BTreeSet<String>,
}

/// Regions available under the chosen brands, and stores available under
/// the chosen brands and regions.
pub fn cascade_options(rows: &[Transaction], brands: &Selection, regions: &Selection) -> CascadeOptions {
    let all_brands = distinct_values(rows, |r| r.brand.as_str());
    let brand_set = brands.resolve(&all_brands);

    let by_brand: Vec<Transaction> = rows
        .iter()
        .filter(|r| brand_set.contains(&r.brand))
        .cloned()
        .collect();
    let available_regions = distinct_values(&by_brand, |r| r.region.as_str());
    let region_set = regions.resolve(&available_regions);

    let stores = by_brand
        .iter()
        .filter(|r| region_set.contains(&r.region))
        .map(|r| r.store.clone())
        .collect();

    CascadeOptions {
        brands: all_brands,
        regions: available_regions,
        stores,
    }
}

//! Report configuration: every setting a report run depends on, passed
//! explicitly into the engine. Nothing is read from ambient state.

use crate::{
    classify::CrmFilter,
    error::{ReportError, ReportResult},
    filter::FilterSet,
    period::{weekday_from_index, Granularity},
    types::{Dimension, RevenueBasis, SliceMode},
};
use chrono::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParetoConfig {
    /// Share of each store's customers to keep, 1..=100.
    pub percent:         u32,
    pub mode:            SliceMode,
    /// Share of customers in the all-stores ranking, 1..=100.
    pub overall_percent: u32,
    pub overall_basis:   RevenueBasis,
}

impl Default for ParetoConfig {
    fn default() -> Self {
        Self {
            percent:         20,
            mode:            SliceMode::Top,
            overall_percent: 20,
            overall_basis:   RevenueBasis::Net,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmConfig {
    pub inactive_days:          u32,
    pub vip_net_threshold:      f64,
    /// One profile per customer instead of one per customer-and-store.
    pub group_by_customer_only: bool,
    pub filter:                 CrmFilter,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            inactive_days:          90,
            vip_net_threshold:      300_000_000.0,
            group_by_customer_only: false,
            filter:                 CrmFilter::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortConfig {
    pub max_month_offset: u32,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self { max_month_offset: 7 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub granularity:        Granularity,
    /// 0 = Monday .. 6 = Sunday.
    pub week_start:         u8,
    /// Optional breakdown for the second period series.
    pub dimension:          Option<Dimension>,
    pub filters:            FilterSet,
    pub pareto:             ParetoConfig,
    pub crm:                CrmConfig,
    pub cohort:             CohortConfig,
    /// Length of the top / bottom store lists for the latest period.
    pub store_ranking_size: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            granularity:        Granularity::Month,
            week_start:         0,
            dimension:          None,
            filters:            FilterSet::default(),
            pareto:             ParetoConfig::default(),
            crm:                CrmConfig::default(),
            cohort:             CohortConfig::default(),
            store_ranking_size: 10,
        }
    }
}

impl ReportConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn week_start(&self) -> ReportResult<Weekday> {
        weekday_from_index(self.week_start)
    }

    /// Reject misconfiguration up front. Values are never clamped.
    pub fn validate(&self) -> ReportResult<()> {
        self.week_start()?;
        check_percent("pareto.percent", self.pareto.percent)?;
        check_percent("pareto.overall_percent", self.pareto.overall_percent)?;
        if self.cohort.max_month_offset == 0 {
            return Err(ReportError::invalid("cohort.max_month_offset", "must be at least 1"));
        }
        if self.store_ranking_size == 0 {
            return Err(ReportError::invalid("store_ranking_size", "must be at least 1"));
        }
        if !self.crm.vip_net_threshold.is_finite() {
            return Err(ReportError::invalid("crm.vip_net_threshold", "must be a finite number"));
        }
        self.filters.validate()
    }
}

fn check_percent(field: &str, value: u32) -> ReportResult<()> {
    if (1..=100).contains(&value) {
        Ok(())
    } else {
        Err(ReportError::invalid(field, format!("must be within 1..=100, got {value}")))
    }
}

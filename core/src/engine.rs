//! Report engine: runs every analytics component over one immutable
//! snapshot of the sales table.
//!
//! EXECUTION ORDER (fixed):
//!   1. Resolve filters against the full dataset
//!   2. First-purchase dates from the full dataset
//!   3. Apply the resolved filter
//!   4. Period series, breakdown series, store overview and rankings
//!   5. Customer Pareto, overall top customers
//!   6. CRM classification
//!   7. Customer mix and cohort retention
//!
//! RULES:
//!   - The engine owns no mutable state between runs; every run reads only
//!     its configuration and the rows it is handed.
//!   - An empty filtered set yields an empty report, not an error.

use crate::{
    aggregate::{
        aggregate, dimension_totals, latest_period_ranking, summarize, DimensionTotal,
        PeriodAggregate, RevenueSummary,
    },
    classify::{classify, crm_totals, reference_date, CrmTotals, CustomerProfile},
    cohort::{build, customer_mix, first_purchase, CustomerMix, RetentionMatrix},
    config::ReportConfig,
    error::ReportResult,
    filter::ResolvedFilter,
    pareto::{rank, rank_overall, CustomerRankRow, TopCustomer},
    period::Granularity,
    types::{Dimension, SliceMode, Transaction},
};
use chrono::{NaiveDate, Weekday};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueReport {
    pub granularity:      Granularity,
    pub dimension:        Option<Dimension>,
    pub filter:           ResolvedFilter,
    pub row_count:        usize,
    pub reference_date:   Option<NaiveDate>,
    pub summary:          RevenueSummary,
    pub periods:          Vec<PeriodAggregate>,
    pub breakdown:        Vec<PeriodAggregate>,
    pub store_overview:   Vec<DimensionTotal>,
    pub top_stores:       Vec<PeriodAggregate>,
    pub bottom_stores:    Vec<PeriodAggregate>,
    pub pareto:           Vec<CustomerRankRow>,
    pub top_customers:    Vec<TopCustomer>,
    pub crm_profiles:     Vec<CustomerProfile>,
    pub crm_totals:       CrmTotals,
    pub customer_mix:     CustomerMix,
    pub retention:        RetentionMatrix,
}

impl RevenueReport {
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

pub struct ReportEngine {
    config:     ReportConfig,
    week_start: Weekday,
}

impl ReportEngine {
    /// Validate the configuration and build an engine for it.
    pub fn new(config: ReportConfig) -> ReportResult<Self> {
        config.validate()?;
        let week_start = config.week_start()?;
        Ok(Self { config, week_start })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Run one report over `dataset`, the full active table.
    pub fn run(&self, dataset: &[Transaction]) -> ReportResult<RevenueReport> {
        let cfg = &self.config;

        let filter = cfg.filters.resolve(dataset);
        let first_purchases = first_purchase(dataset);
        let rows = filter.apply(dataset);
        log::info!(
            "report: {} of {} rows after filtering ({} customers overall)",
            rows.len(),
            dataset.len(),
            first_purchases.len()
        );

        let periods = aggregate(&rows, cfg.granularity, self.week_start, None);
        let breakdown = match cfg.dimension {
            Some(dim) => aggregate(&rows, cfg.granularity, self.week_start, Some(dim)),
            None => Vec::new(),
        };

        let store_periods = aggregate(&rows, cfg.granularity, self.week_start, Some(Dimension::Store));
        let top_stores = latest_period_ranking(&store_periods, cfg.store_ranking_size, SliceMode::Top);
        let bottom_stores =
            latest_period_ranking(&store_periods, cfg.store_ranking_size, SliceMode::Bottom);

        let pareto = rank(&rows, cfg.pareto.percent, cfg.pareto.mode)?;
        let top_customers = rank_overall(&rows, cfg.pareto.overall_percent, cfg.pareto.overall_basis)?;

        let reference = reference_date(&rows);
        let crm_profiles = match reference {
            Some(today) => {
                let profiles = classify(
                    &rows,
                    today,
                    cfg.crm.inactive_days,
                    cfg.crm.vip_net_threshold,
                    cfg.crm.group_by_customer_only,
                );
                cfg.crm.filter.apply(&profiles)
            }
            None => Vec::new(),
        };
        let crm_totals = crm_totals(&crm_profiles);

        let window_start = cfg
            .filters
            .date_from
            .or_else(|| rows.iter().map(|r| r.date).min());
        let customer_mix = match window_start {
            Some(start) => customer_mix(&rows, &first_purchases, start),
            None => CustomerMix::default(),
        };
        let retention = build(&rows, &first_purchases, cfg.cohort.max_month_offset)?;

        log::info!(
            "report: {} periods, {} pareto rows, {} CRM profiles, {} cohorts",
            periods.len(),
            pareto.len(),
            crm_profiles.len(),
            retention.cohorts.len()
        );

        Ok(RevenueReport {
            granularity: cfg.granularity,
            dimension: cfg.dimension,
            filter,
            row_count: rows.len(),
            reference_date: reference,
            summary: summarize(&rows),
            periods,
            breakdown,
            store_overview: dimension_totals(&rows, Dimension::Store),
            top_stores,
            bottom_stores,
            pareto,
            top_customers,
            crm_profiles,
            crm_totals,
            customer_mix,
            retention,
        })
    }
}

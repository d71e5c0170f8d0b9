//! Retail revenue analytics: period bucketing, period-over-period deltas,
//! customer Pareto ranking, CRM classification and cohort retention over a
//! fully materialized table of sales rows.

pub mod aggregate;
pub mod classify;
pub mod cohort;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod pareto;
pub mod period;
pub mod rng;
pub mod sample;
pub mod store;
pub mod types;

pub use engine::{ReportEngine, RevenueReport};
pub use error::{ReportError, ReportResult};
pub use types::Transaction;

//! report-runner: headless revenue report runner.
//!
//! Usage:
//!   report-runner --db sales.db --granularity week --dimension region
//!   report-runner --demo-seed 42 --json

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use revenue_core::{
    config::ReportConfig,
    period::Granularity,
    sample::{generate_sales, SampleSpec},
    store::SalesStore,
    types::{Dimension, SliceMode},
    ReportEngine, RevenueReport,
};

#[derive(Parser)]
#[command(name = "report-runner")]
#[command(about = "Run a revenue, CRM and cohort report over a sales table", long_about = None)]
struct Cli {
    /// SQLite database holding the `sales` table
    #[arg(long)]
    db: Option<String>,

    /// Generate a seeded demo dataset instead of reading a database
    #[arg(long, conflicts_with = "db")]
    demo_seed: Option<u64>,

    /// JSON report configuration; missing fields take defaults
    #[arg(long)]
    config: Option<String>,

    /// day | week | month | quarter | year
    #[arg(long)]
    granularity: Option<String>,

    /// First day of the week, 0 = Monday .. 6 = Sunday
    #[arg(long)]
    week_start: Option<u8>,

    /// region | store | brand | doc_type | customer | product
    #[arg(long)]
    dimension: Option<String>,

    /// Inclusive start date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Inclusive end date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Pareto share of customers per store
    #[arg(long)]
    pareto_percent: Option<u32>,

    /// Take the bottom slice instead of the top one
    #[arg(long)]
    bottom: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    apply_overrides(&mut config, &cli)?;

    let dataset = match (&cli.db, cli.demo_seed) {
        (Some(db), _) => {
            let store = SalesStore::open(db).with_context(|| format!("Failed to open {db}"))?;
            store.migrate()?;
            // Filters are applied by the engine; the store loads the full
            // table so first purchases stay global.
            store.load_transactions(None, None)?
        }
        (None, Some(seed)) => {
            let store = SalesStore::in_memory()?;
            store.migrate()?;
            store.insert_transactions(&generate_sales(seed, &SampleSpec::default())?)?;
            store.load_transactions(None, None)?
        }
        (None, None) => anyhow::bail!("either --db or --demo-seed is required"),
    };
    log::info!("loaded {} sales rows", dataset.len());

    let engine = ReportEngine::new(config)?;
    let report = engine.run(&dataset)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn apply_overrides(config: &mut ReportConfig, cli: &Cli) -> Result<()> {
    if let Some(g) = &cli.granularity {
        config.granularity = g.parse::<Granularity>()?;
    }
    if let Some(ws) = cli.week_start {
        config.week_start = ws;
    }
    if let Some(d) = &cli.dimension {
        config.dimension = Some(d.parse::<Dimension>()?);
    }
    if cli.from.is_some() {
        config.filters.date_from = cli.from;
    }
    if cli.to.is_some() {
        config.filters.date_to = cli.to;
    }
    if let Some(p) = cli.pareto_percent {
        config.pareto.percent = p;
    }
    if cli.bottom {
        config.pareto.mode = SliceMode::Bottom;
    }
    Ok(())
}

fn fmt_opt_pct(v: Option<f64>) -> String {
    v.map(|p| format!("{p:+.2}%")).unwrap_or_else(|| "-".to_string())
}

fn print_summary(report: &RevenueReport) {
    if report.is_empty() {
        println!("No data for the selected filters.");
        return;
    }

    let s = &report.summary;
    println!("=== SUMMARY ===");
    println!("  rows:       {}", report.row_count);
    println!("  gross:      {:.0}", s.gross_sum);
    println!("  net:        {:.0}", s.net_sum);
    println!("  discount:   {:.2}%", s.discount_pct);
    println!("  orders:     {}", s.distinct_orders);
    println!("  customers:  {}", s.distinct_customers);
    println!(
        "  new / returning: {} / {}",
        report.customer_mix.new_customers, report.customer_mix.returning_customers
    );

    println!();
    println!("=== BY {} ===", report.granularity.name().to_uppercase());
    for p in &report.periods {
        println!(
            "  {:<14} net {:>16.0} | CK {:>6.2}% | growth {:>9}",
            p.label,
            p.net_sum,
            p.discount_pct,
            fmt_opt_pct(p.growth_pct)
        );
    }

    if !report.breakdown.is_empty() {
        println!();
        println!("=== BREAKDOWN ===");
        for p in &report.breakdown {
            println!(
                "  {:<16} {:<14} net {:>16.0} | growth {:>9}",
                p.dimension_value.as_deref().unwrap_or(""),
                p.label,
                p.net_sum,
                fmt_opt_pct(p.growth_pct)
            );
        }
    }

    println!();
    println!("=== TOP STORES (latest period) ===");
    for p in &report.top_stores {
        println!(
            "  {:<16} net {:>16.0} | vs prev {:>9}",
            p.dimension_value.as_deref().unwrap_or(""),
            p.net_sum,
            fmt_opt_pct(p.growth_pct)
        );
    }

    println!();
    println!("=== PARETO ({} rows) ===", report.pareto.len());
    for r in report.pareto.iter().take(20) {
        println!(
            "  {:<12} {:<12} #{:<4} net {:>14.0} | share {:>6.2}% | cum {:>6.2}%",
            r.store, r.customer_id, r.rank, r.net_sum, r.contribution_pct, r.cumulative_pct
        );
    }

    println!();
    println!(
        "=== CRM === {} profiles, net {:.0}, mean CK {:.2}%",
        report.crm_totals.rows, report.crm_totals.net_sum, report.crm_totals.mean_discount_pct
    );

    println!();
    println!("=== COHORT RETENTION (cumulative %) ===");
    let rows = report
        .retention
        .cohorts
        .iter()
        .chain(report.retention.grand_total.iter());
    for row in rows {
        let cells: Vec<String> = row
            .pct_by_month_offset
            .values()
            .map(|v| format!("{v:6.2}"))
            .collect();
        println!(
            "  {:<12} {:>6} | {}",
            row.cohort.label(),
            row.cohort_size,
            cells.join(" ")
        );
    }
}

use super::SalesStore;
use crate::{error::ReportResult, types::Transaction};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::params;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Parse a stored sale date, truncating any time of day to midnight.
pub fn parse_sale_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok().map(|dt| dt.date()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        })
}

struct RawSale {
    sale_date:     String,
    order_id:      String,
    customer_id:   String,
    customer_name: String,
    name_check:    String,
    phone_check:   String,
    store:         String,
    region:        String,
    brand:         String,
    doc_type:      String,
    product_group: String,
    product_code:  String,
    gross:         Option<f64>,
    net:           Option<f64>,
}

impl SalesStore {
    // ── Sales ─────────────────────────────────────────────────────

    pub fn insert_transaction(&self, t: &Transaction) -> ReportResult<()> {
        self.conn.execute(
            "INSERT INTO sales (
                sale_date, order_id, customer_id, customer_name, name_check,
                phone_check, store, region, brand, doc_type, product_group,
                product_code, gross, net
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                t.date.format("%Y-%m-%d").to_string(),
                &t.order_id,
                &t.customer_id,
                &t.customer_name,
                &t.name_check,
                &t.phone_check,
                &t.store,
                &t.region,
                &t.brand,
                &t.doc_type,
                &t.product_group,
                &t.product_code,
                t.gross,
                t.net,
            ],
        )?;
        Ok(())
    }

    /// Insert many rows inside one SQL transaction.
    pub fn insert_transactions(&self, rows: &[Transaction]) -> ReportResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for row in rows {
            self.insert_transaction(row)?;
        }
        tx.commit()?;
        log::debug!("store: inserted {} sales rows", rows.len());
        Ok(())
    }

    /// Number of stored rows, including ones whose date would not parse.
    pub fn transaction_count(&self) -> ReportResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM sales", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Load rows with a valid date inside the inclusive bounds, ordered by
    /// date. Rows with an unparseable date are dropped.
    pub fn load_transactions(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ReportResult<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT sale_date, order_id, customer_id, customer_name, name_check,
                    phone_check, store, region, brand, doc_type, product_group,
                    product_code, gross, net
             FROM sales ORDER BY rowid ASC",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok(RawSale {
                    sale_date:     row.get(0)?,
                    order_id:      row.get(1)?,
                    customer_id:   row.get(2)?,
                    customer_name: row.get(3)?,
                    name_check:    row.get(4)?,
                    phone_check:   row.get(5)?,
                    store:         row.get(6)?,
                    region:        row.get(7)?,
                    brand:         row.get(8)?,
                    doc_type:      row.get(9)?,
                    product_group: row.get(10)?,
                    product_code:  row.get(11)?,
                    gross:         row.get(12)?,
                    net:           row.get(13)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut dropped = 0usize;
        let mut rows: Vec<Transaction> = Vec::with_capacity(raw.len());
        for r in raw {
            let Some(date) = parse_sale_date(&r.sale_date) else {
                dropped += 1;
                continue;
            };
            if from.is_some_and(|f| date < f) || to.is_some_and(|t| date > t) {
                continue;
            }
            rows.push(Transaction {
                date,
                order_id:      r.order_id,
                customer_id:   r.customer_id,
                customer_name: r.customer_name,
                name_check:    r.name_check,
                phone_check:   r.phone_check,
                store:         r.store,
                region:        r.region,
                brand:         r.brand,
                doc_type:      r.doc_type,
                product_group: r.product_group,
                product_code:  r.product_code,
                gross:         r.gross.unwrap_or(0.0),
                net:           r.net.unwrap_or(0.0),
            });
        }
        if dropped > 0 {
            log::warn!("store: dropped {dropped} sales rows with an unparseable date");
        }
        // Stable: rows of the same day keep insertion order.
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }

    /// Earliest and latest valid sale date.
    pub fn date_bounds(&self) -> ReportResult<Option<(NaiveDate, NaiveDate)>> {
        let mut stmt = self.conn.prepare("SELECT sale_date FROM sales")?;
        let dates = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let parsed: Vec<NaiveDate> = dates.iter().filter_map(|d| parse_sale_date(d)).collect();
        Ok(parsed
            .iter()
            .min()
            .copied()
            .zip(parsed.iter().max().copied()))
    }
}

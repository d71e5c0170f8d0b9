//! Shared primitive types used across the entire engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Customer key. In practice the customer's phone number.
pub type CustomerId = String;

/// Sales document number. One order may span several transaction rows.
pub type OrderId = String;

/// One raw sales row as delivered by the data source.
///
/// Rows are read-only snapshots: every component derives new collections
/// from them and never mutates them in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date:          NaiveDate,
    pub order_id:      OrderId,
    pub customer_id:   CustomerId,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub name_check:    String,
    #[serde(default)]
    pub phone_check:   String,
    pub store:         String,
    pub region:        String,
    pub brand:         String,
    pub doc_type:      String,
    /// Product group (merchandise category); empty when unknown.
    #[serde(default)]
    pub product_group: String,
    /// Internal product code.
    #[serde(default)]
    pub product_code:  String,
    pub gross:         f64,
    pub net:           f64,
}

/// `100 * (1 - net / gross)`, or 0 when there is no gross revenue.
pub fn discount_pct(gross: f64, net: f64) -> f64 {
    if gross > 0.0 {
        (1.0 - net / gross) * 100.0
    } else {
        0.0
    }
}

/// Breakdown dimension a period series can be crossed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Region,
    Store,
    Brand,
    DocType,
    Customer,
    Product,
}

impl Dimension {
    pub fn value_of<'a>(&self, row: &'a Transaction) -> &'a str {
        match self {
            Self::Region   => &row.region,
            Self::Store    => &row.store,
            Self::Brand    => &row.brand,
            Self::DocType  => &row.doc_type,
            Self::Customer => &row.customer_id,
            Self::Product  => &row.product_code,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Region   => "region",
            Self::Store    => "store",
            Self::Brand    => "brand",
            Self::DocType  => "doc_type",
            Self::Customer => "customer",
            Self::Product  => "product",
        }
    }
}

impl std::str::FromStr for Dimension {
    type Err = crate::error::ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "region"              => Ok(Self::Region),
            "store"               => Ok(Self::Store),
            "brand"               => Ok(Self::Brand),
            "doc_type" | "doctype" => Ok(Self::DocType),
            "customer"            => Ok(Self::Customer),
            "product"             => Ok(Self::Product),
            other => Err(crate::error::ReportError::invalid(
                "dimension",
                format!("'{other}' is not one of region, store, brand, doc_type, customer, product"),
            )),
        }
    }
}

/// Sort direction for top/bottom slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceMode {
    #[default]
    Top,
    Bottom,
}

/// Which revenue column a ranking is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueBasis {
    #[default]
    Net,
    Gross,
}

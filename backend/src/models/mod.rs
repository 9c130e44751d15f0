//! Domain models for the salestrend pipeline.
//!
//! - [`Record`] - One transaction line
//! - [`Dataset`] - Ordered, owned collection of records
//! - [`Quarter`] - Calendar quarter key (year + Q1..Q4)
//! - Summary rows: [`LoyalCustomer`], [`QuarterRevenue`], [`ProductDemand`],
//!   [`ProductPattern`]

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Record & Dataset
// =============================================================================

/// One transaction line.
///
/// Missing `Quantity`/`UnitPrice` cells are loaded as `0`, so they never pass
/// the cleansing filter. `StockCode` and `InvoiceDate` are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Customer identifier, absent for guest checkouts.
    pub customer_id: Option<String>,
    /// Product identifier.
    pub stock_code: String,
    /// Units sold (negative for returns).
    pub quantity: i64,
    /// Price per unit.
    pub unit_price: f64,
    /// Invoice timestamp.
    pub invoice_date: NaiveDateTime,
}

impl Record {
    /// Line revenue (`quantity * unit_price`).
    pub fn revenue(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }

    /// Calendar quarter of the invoice.
    pub fn quarter(&self) -> Quarter {
        Quarter::from_datetime(self.invoice_date)
    }
}

/// An ordered collection of records.
///
/// Aggregators borrow it immutably; nothing downstream of the loader mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// =============================================================================
// Quarter
// =============================================================================

/// A calendar quarter (Q1 = Jan-Mar ... Q4 = Oct-Dec).
///
/// Orders chronologically. Serialized as `"2011Q1"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter {
    pub year: i32,
    /// 1..=4
    pub quarter: u8,
}

impl Quarter {
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        (1..=4).contains(&quarter).then_some(Self { year, quarter })
    }

    pub fn from_datetime(date: NaiveDateTime) -> Self {
        // month is 1..=12, so this is ceil(month / 3)
        let quarter = ((date.month() - 1) / 3 + 1) as u8;
        Self {
            year: date.year(),
            quarter,
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

impl Serialize for Quarter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quarter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let invalid = || serde::de::Error::custom(format!("invalid quarter '{}'", raw));

        let (year, quarter) = raw.split_once('Q').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let quarter = quarter.parse::<u8>().map_err(|_| invalid())?;
        Quarter::new(year, quarter).ok_or_else(invalid)
    }
}

// =============================================================================
// Summary rows
// =============================================================================

/// A customer meeting the loyalty threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyalCustomer {
    pub customer_id: String,
    pub purchase_count: usize,
}

/// Total revenue for one calendar quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterRevenue {
    pub quarter: Quarter,
    pub total_revenue: f64,
}

/// Summed quantity sold for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDemand {
    pub product: String,
    pub total_quantity_sold: i64,
}

/// Average quantity and unit price for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPattern {
    pub product: String,
    pub avg_quantity: f64,
    pub avg_unit_price: f64,
}

/// Customers with at least `min_purchases` records, sorted by customer id.
pub type LoyaltySummary = Vec<LoyalCustomer>;

/// Revenue per quarter, chronological. Quarters without records are absent.
pub type RevenueSummary = Vec<QuarterRevenue>;

/// Top products by quantity, descending.
pub type DemandSummary = Vec<ProductDemand>;

/// One row per product, sorted by stock code.
pub type PatternSummary = Vec<ProductPattern>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(8, 26, 0)
            .unwrap()
    }

    #[test]
    fn test_quarter_boundaries() {
        assert_eq!(Quarter::from_datetime(at(2011, 1, 1)).quarter, 1);
        assert_eq!(Quarter::from_datetime(at(2011, 3, 31)).quarter, 1);
        assert_eq!(Quarter::from_datetime(at(2011, 4, 1)).quarter, 2);
        assert_eq!(Quarter::from_datetime(at(2011, 9, 30)).quarter, 3);
        assert_eq!(Quarter::from_datetime(at(2010, 12, 1)).quarter, 4);
    }

    #[test]
    fn test_quarter_ordering_and_display() {
        let q4 = Quarter::new(2010, 4).unwrap();
        let q1 = Quarter::new(2011, 1).unwrap();
        assert!(q4 < q1);
        assert_eq!(q1.to_string(), "2011Q1");
        assert!(Quarter::new(2011, 5).is_none());
    }

    #[test]
    fn test_quarter_serde() {
        let q = Quarter::new(2011, 3).unwrap();
        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(json, "\"2011Q3\"");
        let back: Quarter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
        assert!(serde_json::from_str::<Quarter>("\"2011Q9\"").is_err());
    }

    #[test]
    fn test_record_revenue_and_quarter() {
        let record = Record {
            customer_id: Some("17850".into()),
            stock_code: "85123A".into(),
            quantity: 6,
            unit_price: 2.55,
            invoice_date: at(2010, 12, 1),
        };
        assert!((record.revenue() - 15.3).abs() < 1e-9);
        assert_eq!(Some(record.quarter()), Quarter::new(2010, 4));
    }

    #[test]
    fn test_record_serialization_camel_case() {
        let record = Record {
            customer_id: None,
            stock_code: "A".into(),
            quantity: 1,
            unit_price: 1.0,
            invoice_date: at(2011, 1, 4),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("customerId").is_some());
        assert!(json.get("stockCode").is_some());
        assert!(json.get("unitPrice").is_some());
        assert_eq!(json["invoiceDate"], "2011-01-04T08:26:00");
    }
}

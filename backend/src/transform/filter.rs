//! Cleansing filter.
//!
//! Keeps only records that every aggregation can consume: a known customer
//! and strictly positive quantity and unit price. Returns, cancellations and
//! guest checkouts are dropped.

use serde::Serialize;

use crate::models::{Dataset, Record};

/// Counts produced while filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanseStats {
    pub input_rows: usize,
    pub kept_rows: usize,
    /// Rows without a customer id.
    pub missing_customer: usize,
    /// Rows with a customer id but `quantity <= 0` or `unit_price <= 0`.
    pub non_positive: usize,
}

impl CleanseStats {
    pub fn dropped(&self) -> usize {
        self.input_rows - self.kept_rows
    }
}

/// Why a record was rejected. Missing customer wins when both apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    MissingCustomer,
    NonPositive,
}

fn check(record: &Record) -> Option<Rejection> {
    if record.customer_id.is_none() {
        Some(Rejection::MissingCustomer)
    } else if record.quantity <= 0 || record.unit_price <= 0.0 {
        Some(Rejection::NonPositive)
    } else {
        None
    }
}

/// Whether a record satisfies the cleansed-dataset invariants.
pub fn is_valid(record: &Record) -> bool {
    check(record).is_none()
}

/// Drop invalid records, preserving the order of the ones kept.
pub fn filter_data(dataset: &Dataset) -> Dataset {
    cleanse(dataset).0
}

/// Like [`filter_data`], also reporting how many rows were dropped and why.
pub fn cleanse(dataset: &Dataset) -> (Dataset, CleanseStats) {
    let mut stats = CleanseStats {
        input_rows: dataset.len(),
        ..CleanseStats::default()
    };

    let kept: Dataset = dataset
        .iter()
        .filter(|record| match check(record) {
            None => true,
            Some(Rejection::MissingCustomer) => {
                stats.missing_customer += 1;
                false
            }
            Some(Rejection::NonPositive) => {
                stats.non_positive += 1;
                false
            }
        })
        .cloned()
        .collect();

    stats.kept_rows = kept.len();
    (kept, stats)
}

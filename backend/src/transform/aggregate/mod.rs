//! Aggregation engine.
//!
//! Four independent, read-only aggregations over a cleansed [`Dataset`]:
//!
//! - `loyalty`: purchase count per customer above a threshold
//! - `revenue`: revenue per calendar quarter
//! - `demand`: top-N products by quantity sold
//! - `patterns`: average quantity and unit price per product
//!
//! Each one accepts an empty dataset and returns an empty summary. Threshold
//! arguments are checked before any work is done.
//!
//! [`Dataset`]: crate::models::Dataset

pub mod demand;
pub mod loyalty;
pub mod patterns;
pub mod revenue;

pub use demand::high_demand_products;
pub use loyalty::loyalty_customers;
pub use patterns::purchase_patterns;
pub use revenue::quarterly_revenue;

use crate::error::{AnalysisError, AnalysisResult};

/// `min_purchases` must be zero or greater.
pub fn check_min_purchases(min_purchases: i64) -> AnalysisResult<usize> {
    usize::try_from(min_purchases).map_err(|_| AnalysisError::InvalidArgument {
        name: "min_purchases",
        value: min_purchases,
        reason: "must not be negative",
    })
}

/// `top_n` must be at least one.
pub fn check_top_n(top_n: i64) -> AnalysisResult<usize> {
    match usize::try_from(top_n) {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AnalysisError::InvalidArgument {
            name: "top_n",
            value: top_n,
            reason: "must be at least 1",
        }),
    }
}

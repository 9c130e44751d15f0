//! High-demand products: top-N by total quantity sold.

use std::collections::HashMap;

use crate::error::AnalysisResult;
use crate::models::{Dataset, DemandSummary, ProductDemand};

use super::check_top_n;

/// The `top_n` products with the largest summed quantity, descending.
///
/// Equal totals are ordered by ascending stock code. Asking for more products
/// than exist returns all of them.
pub fn high_demand_products(dataset: &Dataset, top_n: i64) -> AnalysisResult<DemandSummary> {
    let limit = check_top_n(top_n)?;

    let mut totals: HashMap<&str, i64> = HashMap::new();
    for record in dataset {
        *totals.entry(record.stock_code.as_str()).or_default() += record.quantity;
    }

    let mut ranked: Vec<(&str, i64)> = totals.into_iter().collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(limit);

    Ok(ranked
        .into_iter()
        .map(|(product, total_quantity_sold)| ProductDemand {
            product: product.to_string(),
            total_quantity_sold,
        })
        .collect())
}

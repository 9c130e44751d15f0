//! Revenue per calendar quarter.

use std::collections::BTreeMap;

use crate::models::{Dataset, Quarter, QuarterRevenue, RevenueSummary};

/// Sum of `quantity * unit_price` per calendar quarter, chronological.
///
/// Only quarters with at least one record appear. Every record lands in
/// exactly one quarter, so the totals add up to the dataset's revenue.
pub fn quarterly_revenue(dataset: &Dataset) -> RevenueSummary {
    let mut totals: BTreeMap<Quarter, f64> = BTreeMap::new();
    for record in dataset {
        *totals.entry(record.quarter()).or_default() += record.revenue();
    }

    totals
        .into_iter()
        .map(|(quarter, total_revenue)| QuarterRevenue {
            quarter,
            total_revenue,
        })
        .collect()
}

//! Loyal customers: purchase count per customer, above a threshold.

use std::collections::BTreeMap;

use crate::error::AnalysisResult;
use crate::models::{Dataset, LoyalCustomer, LoyaltySummary};

use super::check_min_purchases;

/// Customers with at least `min_purchases` records, sorted by customer id.
///
/// Every record counts as one purchase. `min_purchases = 0` returns every
/// distinct customer; a negative threshold is rejected.
pub fn loyalty_customers(dataset: &Dataset, min_purchases: i64) -> AnalysisResult<LoyaltySummary> {
    let threshold = check_min_purchases(min_purchases)?;

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for customer in dataset.iter().filter_map(|r| r.customer_id.as_deref()) {
        *counts.entry(customer).or_default() += 1;
    }

    Ok(counts
        .into_iter()
        .filter(|(_, count)| *count >= threshold)
        .map(|(customer_id, purchase_count)| LoyalCustomer {
            customer_id: customer_id.to_string(),
            purchase_count,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::aggregate::fixtures::{cleansed_scenario, sale};
    use std::collections::BTreeSet;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            sale("12347", "A", 1, 1.0, "2011-01-01"),
            sale("12346", "A", 1, 1.0, "2011-01-01"),
            sale("12347", "B", 1, 1.0, "2011-01-02"),
            sale("12348", "C", 1, 1.0, "2011-01-03"),
            sale("12347", "C", 1, 1.0, "2011-01-04"),
            sale("12346", "C", 1, 1.0, "2011-01-04"),
        ])
    }

    #[test]
    fn test_scenario() {
        let summary = loyalty_customers(&cleansed_scenario(), 2).unwrap();
        assert_eq!(
            summary,
            vec![LoyalCustomer {
                customer_id: "1".into(),
                purchase_count: 2
            }]
        );
    }

    #[test]
    fn test_zero_threshold_returns_every_customer() {
        let d = dataset();
        let summary = loyalty_customers(&d, 0).unwrap();

        let ids: BTreeSet<&str> = summary.iter().map(|c| c.customer_id.as_str()).collect();
        let distinct: BTreeSet<&str> = d.iter().filter_map(|r| r.customer_id.as_deref()).collect();
        assert_eq!(ids, distinct);
    }

    #[test]
    fn test_threshold_is_inclusive_and_sorted() {
        let summary = loyalty_customers(&dataset(), 2).unwrap();
        let rows: Vec<(&str, usize)> = summary
            .iter()
            .map(|c| (c.customer_id.as_str(), c.purchase_count))
            .collect();
        assert_eq!(rows, vec![("12346", 2), ("12347", 3)]);
    }

    #[test]
    fn test_monotonically_non_expanding() {
        let d = dataset();
        let mut previous = usize::MAX;
        for k in 0..6 {
            let size = loyalty_customers(&d, k).unwrap().len();
            assert!(size <= previous, "threshold {k} grew the result");
            previous = size;
        }
        assert!(loyalty_customers(&d, 4).unwrap().is_empty());
    }

    #[test]
    fn test_empty_dataset() {
        assert!(loyalty_customers(&Dataset::default(), 1).unwrap().is_empty());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        assert!(loyalty_customers(&dataset(), -1).is_err());
    }
}

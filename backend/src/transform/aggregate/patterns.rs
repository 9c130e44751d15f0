//! Purchase patterns: average quantity and unit price per product.

use std::collections::BTreeMap;

use crate::models::{Dataset, PatternSummary, ProductPattern};

#[derive(Default)]
struct Totals {
    count: usize,
    quantity: i64,
    unit_price: f64,
}

/// One row per distinct product, sorted by stock code.
pub fn purchase_patterns(dataset: &Dataset) -> PatternSummary {
    let mut groups: BTreeMap<&str, Totals> = BTreeMap::new();
    for record in dataset {
        let totals = groups.entry(record.stock_code.as_str()).or_default();
        totals.count += 1;
        totals.quantity += record.quantity;
        totals.unit_price += record.unit_price;
    }

    groups
        .into_iter()
        .map(|(product, totals)| {
            let n = totals.count as f64;
            ProductPattern {
                product: product.to_string(),
                avg_quantity: totals.quantity as f64 / n,
                avg_unit_price: totals.unit_price / n,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::aggregate::fixtures::{cleansed_scenario, sale};

    #[test]
    fn test_scenario() {
        let summary = purchase_patterns(&cleansed_scenario());
        assert_eq!(
            summary,
            vec![ProductPattern {
                product: "A".into(),
                avg_quantity: 4.0,
                avg_unit_price: 2.0,
            }]
        );
    }

    #[test]
    fn test_one_row_per_product_with_means() {
        let dataset = Dataset::new(vec![
            sale("1", "B", 1, 1.0, "2011-01-01"),
            sale("2", "A", 2, 3.0, "2011-01-01"),
            sale("3", "B", 4, 2.0, "2011-01-02"),
            sale("1", "B", 7, 6.0, "2011-01-03"),
        ]);
        let summary = purchase_patterns(&dataset);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].product, "A");
        assert_eq!(summary[0].avg_quantity, 2.0);
        assert_eq!(summary[0].avg_unit_price, 3.0);
        assert_eq!(summary[1].product, "B");
        assert_eq!(summary[1].avg_quantity, 4.0);
        assert_eq!(summary[1].avg_unit_price, 3.0);
    }

    #[test]
    fn test_records_across_quarters_share_one_row() {
        let dataset = Dataset::new(vec![
            sale("1", "A", 9, 1.0, "2010-12-01"),
            sale("1", "A", 1, 3.0, "2011-08-01"),
        ]);

        let summary = purchase_patterns(&dataset);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].avg_quantity, 5.0);
        assert_eq!(summary[0].avg_unit_price, 2.0);
    }

    #[test]
    fn test_empty_dataset() {
        assert!(purchase_patterns(&Dataset::default()).is_empty());
    }
}

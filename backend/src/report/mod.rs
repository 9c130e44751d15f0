//! Report assembly.
//!
//! Bundles the four summaries and the static answer table into a [`Report`]
//! that serializes to JSON or renders as plain text for the console.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::models::{DemandSummary, LoyaltySummary, PatternSummary, RevenueSummary};

/// Answers to the conceptual multiple-choice questions that accompany the
/// analysis. Each question maps to its set of correct options.
pub const ANSWERS: &[(&str, &[&str])] = &[
    ("Q1", &["A"]),
    ("Q2", &["B"]),
    ("Q3", &["C"]),
    ("Q4", &["A"]),
    ("Q5", &["A"]),
];

/// [`ANSWERS`] as an owned, ordered map.
pub fn answer_table() -> BTreeMap<String, Vec<String>> {
    ANSWERS
        .iter()
        .map(|(question, options)| {
            (
                question.to_string(),
                options.iter().map(|o| o.to_string()).collect(),
            )
        })
        .collect()
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Threshold used for `loyal_customers`.
    pub min_purchases: usize,
    /// Limit used for `high_demand_products`.
    pub top_n: usize,
    pub loyal_customers: LoyaltySummary,
    pub quarterly_revenue: RevenueSummary,
    pub high_demand_products: DemandSummary,
    pub purchase_patterns: PatternSummary,
    pub answers: BTreeMap<String, Vec<String>>,
}

impl Report {
    /// Plain-text rendering, one section per summary.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Loyal Customers (>= {} purchases): {}",
            self.min_purchases,
            self.loyal_customers.len()
        );
        let _ = writeln!(out, "  {:<12} {:>13}", "CustomerID", "PurchaseCount");
        for c in &self.loyal_customers {
            let _ = writeln!(out, "  {:<12} {:>13}", c.customer_id, c.purchase_count);
        }

        let _ = writeln!(out, "\nQuarterly Revenue:");
        let _ = writeln!(out, "  {:<8} {:>16}", "Quarter", "TotalRevenue");
        for r in &self.quarterly_revenue {
            let _ = writeln!(out, "  {:<8} {:>16.2}", r.quarter.to_string(), r.total_revenue);
        }

        let _ = writeln!(out, "\nHigh Demand Products (top {}):", self.top_n);
        let _ = writeln!(out, "  {:<12} {:>17}", "Product", "TotalQuantitySold");
        for p in &self.high_demand_products {
            let _ = writeln!(out, "  {:<12} {:>17}", p.product, p.total_quantity_sold);
        }

        let _ = writeln!(out, "\nPurchase Patterns: {} products", self.purchase_patterns.len());
        let _ = writeln!(out, "  {:<12} {:>12} {:>12}", "Product", "AvgQuantity", "AvgUnitPrice");
        for p in &self.purchase_patterns {
            let _ = writeln!(
                out,
                "  {:<12} {:>12.2} {:>12.2}",
                p.product, p.avg_quantity, p.avg_unit_price
            );
        }

        let _ = writeln!(out, "\nConceptual Questions Answers:");
        out.push_str(&render_answers(&self.answers));

        out
    }
}

/// `Q1: A` lines, one per question.
pub fn render_answers(answers: &BTreeMap<String, Vec<String>>) -> String {
    let mut out = String::new();
    for (question, options) in answers {
        let _ = writeln!(out, "  {}: {}", question, options.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LoyalCustomer, ProductDemand, ProductPattern, Quarter, QuarterRevenue};

    fn report() -> Report {
        Report {
            min_purchases: 2,
            top_n: 1,
            loyal_customers: vec![LoyalCustomer {
                customer_id: "1".into(),
                purchase_count: 2,
            }],
            quarterly_revenue: vec![QuarterRevenue {
                quarter: Quarter::new(2011, 1).unwrap(),
                total_revenue: 16.0,
            }],
            high_demand_products: vec![ProductDemand {
                product: "A".into(),
                total_quantity_sold: 8,
            }],
            purchase_patterns: vec![ProductPattern {
                product: "A".into(),
                avg_quantity: 4.0,
                avg_unit_price: 2.0,
            }],
            answers: answer_table(),
        }
    }

    #[test]
    fn test_answer_table() {
        let answers = answer_table();
        assert_eq!(answers.len(), 5);
        assert_eq!(answers["Q1"], vec!["A"]);
        assert_eq!(answers["Q3"], vec!["C"]);
    }

    #[test]
    fn test_render_text_sections() {
        let text = report().render_text();

        assert!(text.contains("Loyal Customers (>= 2 purchases): 1"));
        assert!(text.contains("2011Q1"));
        assert!(text.contains("16.00"));
        assert!(text.contains("High Demand Products (top 1)"));
        assert!(text.contains("Q5: A"));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(report()).unwrap();

        assert_eq!(json["loyalCustomers"][0]["customerId"], "1");
        assert_eq!(json["quarterlyRevenue"][0]["quarter"], "2011Q1");
        assert_eq!(json["highDemandProducts"][0]["totalQuantitySold"], 8);
        assert_eq!(json["purchasePatterns"][0]["avgUnitPrice"], 2.0);
        assert_eq!(json["answers"]["Q2"][0], "B");
    }
}

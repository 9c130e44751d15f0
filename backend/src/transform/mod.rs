//! Transformation module.
//!
//! - Filter: cleansing of loaded records
//! - Aggregate: the four summary aggregations
//! - Pipeline: load → cleanse → aggregate → report

pub mod aggregate;
pub mod filter;
pub mod pipeline;

pub use aggregate::{high_demand_products, loyalty_customers, purchase_patterns, quarterly_revenue};
pub use filter::{cleanse, filter_data, CleanseStats};
pub use pipeline::*;

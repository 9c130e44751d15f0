//! # Salestrend - customer behaviour and sales trend summaries
//!
//! Salestrend reads a retail transaction export (CSV or XLSX) and produces
//! four summary tables: loyal customers, revenue per calendar quarter, the
//! best-selling products and per-product purchase patterns.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ CSV / XLSX  │────▶│   Parser    │────▶│   Filter    │────▶│ Aggregators │──▶ Report
//! │             │     │ (auto-enc)  │     │ (cleansing) │     │  (x4, pure) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salestrend::{analyze_file, AnalysisOptions};
//!
//! fn main() {
//!     let run = analyze_file("Customer_Behavior.xlsx", &AnalysisOptions::default()).unwrap();
//!     println!("{}", run.report.render_text());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Records, datasets and summary rows
//! - [`parser`] - CSV / workbook loading
//! - [`transform`] - Cleansing, aggregation and pipeline
//! - [`report`] - Report assembly and text rendering
//! - [`config`] - Server configuration
//! - [`api`] - HTTP API server and log streaming

// Core modules
pub mod error;
pub mod models;

// Loading
pub mod parser;

// Cleansing & aggregation
pub mod transform;

// Output
pub mod report;

// HTTP API
pub mod api;
pub mod config;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AnalysisError, LoadError, PipelineError, ServerError,
    AnalysisResult, LoadResult, PipelineResult, ServerResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Dataset,
    Record,
    Quarter,
    LoyalCustomer,
    QuarterRevenue,
    ProductDemand,
    ProductPattern,
    LoyaltySummary,
    RevenueSummary,
    DemandSummary,
    PatternSummary,
};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use parser::{
    load_path,
    load_named_bytes,
    detect_encoding,
    detect_delimiter,
    decode_content,
    ParsedSource,
    SourceFormat,
};

// =============================================================================
// Re-exports - Cleansing & aggregation
// =============================================================================

pub use transform::{
    cleanse,
    filter_data,
    loyalty_customers,
    quarterly_revenue,
    high_demand_products,
    purchase_patterns,
    CleanseStats,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    analyze_file,
    analyze_bytes,
    analyze_dataset,
    cleanse_dataset,
    summarize,
    AnalysisOptions,
    AnalysisRun,
    SourceInfo,
};

// =============================================================================
// Re-exports - Report
// =============================================================================

pub use report::{answer_table, Report, ANSWERS};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{AnalyzeResponse, ResponseMetadata, error_response};
pub use config::ServerConfig;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}

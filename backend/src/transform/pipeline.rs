//! High-level pipeline API: load → cleanse → aggregate → report.
//!
//! # Example
//!
//! ```rust,ignore
//! use salestrend::{analyze_file, AnalysisOptions};
//!
//! let run = analyze_file("Customer_Behavior.xlsx", &AnalysisOptions::default())?;
//! println!("{}", run.report.render_text());
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::api::logs::{log_info, log_success, log_warning, Stage};
use crate::error::{AnalysisResult, PipelineResult};
use crate::models::Dataset;
use crate::parser::{self, ParsedSource, SourceFormat};
use crate::report::{answer_table, Report};

use super::aggregate::{
    check_min_purchases, check_top_n, high_demand_products, loyalty_customers, purchase_patterns,
    quarterly_revenue,
};
use super::filter::{cleanse, CleanseStats};

/// Default loyalty threshold.
pub const DEFAULT_MIN_PURCHASES: i64 = 50;

/// Default number of high-demand products.
pub const DEFAULT_TOP_N: i64 = 10;

/// Caller-supplied aggregation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    /// Minimum purchases for a customer to count as loyal (>= 0).
    pub min_purchases: i64,
    /// Number of products in the demand ranking (>= 1).
    pub top_n: i64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            min_purchases: DEFAULT_MIN_PURCHASES,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl AnalysisOptions {
    /// Check both parameters without running anything.
    pub fn validate(&self) -> AnalysisResult<()> {
        check_min_purchases(self.min_purchases)?;
        check_top_n(self.top_n)?;
        Ok(())
    }
}

/// Where the dataset came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub file_name: Option<String>,
    pub format: SourceFormat,
    pub encoding: Option<String>,
    pub delimiter: Option<char>,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Result of a complete pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRun {
    pub report: Report,
    pub source: SourceInfo,
    pub cleanse: CleanseStats,
}

/// Analyze a `.csv` or `.xlsx` file.
///
/// Parameters are validated before the file is read.
pub fn analyze_file<P: AsRef<Path>>(path: P, options: &AnalysisOptions) -> PipelineResult<AnalysisRun> {
    options.validate()?;

    let path = path.as_ref();
    log_info(Stage::Load, format!("Reading {}", path.display()));
    let parsed = parser::load_path(path)?;

    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
    analyze_parsed(parsed, file_name, options)
}

/// Analyze an uploaded buffer; `file_name` decides the format.
pub fn analyze_bytes(file_name: &str, bytes: &[u8], options: &AnalysisOptions) -> PipelineResult<AnalysisRun> {
    options.validate()?;

    log_info(Stage::Load, format!("Reading {} ({} bytes)", file_name, bytes.len()));
    let parsed = parser::load_named_bytes(file_name, bytes)?;
    analyze_parsed(parsed, Some(file_name.to_string()), options)
}

fn analyze_parsed(
    parsed: ParsedSource,
    file_name: Option<String>,
    options: &AnalysisOptions,
) -> PipelineResult<AnalysisRun> {
    log_success(Stage::Load, format!("Loaded {} rows as {}", parsed.row_count, parsed.format));
    if let (Some(encoding), Some(delimiter)) = (&parsed.encoding, parsed.delimiter) {
        log_info(
            Stage::Load,
            format!("Encoding {}, delimiter '{}'", encoding, format_delimiter(delimiter)),
        );
    }

    let (cleansed, stats) = cleanse_dataset(&parsed.dataset);
    let report = summarize(&cleansed, options)?;

    Ok(AnalysisRun {
        report,
        source: SourceInfo {
            file_name,
            format: parsed.format,
            encoding: parsed.encoding,
            delimiter: parsed.delimiter,
            headers: parsed.headers,
            row_count: parsed.row_count,
        },
        cleanse: stats,
    })
}

/// Run the cleansing filter, logging what was dropped.
pub fn cleanse_dataset(dataset: &Dataset) -> (Dataset, CleanseStats) {
    let (cleansed, stats) = cleanse(dataset);

    log_success(
        Stage::Cleanse,
        format!("Kept {} of {} rows", stats.kept_rows, stats.input_rows),
    );
    if stats.missing_customer > 0 {
        log_info(Stage::Cleanse, format!("{} rows without CustomerID", stats.missing_customer));
    }
    if stats.non_positive > 0 {
        log_info(
            Stage::Cleanse,
            format!("{} rows with non-positive Quantity or UnitPrice", stats.non_positive),
        );
    }
    if cleansed.is_empty() {
        log_warning(Stage::Cleanse, "No rows left after cleansing; summaries will be empty");
    }

    (cleansed, stats)
}

/// Run the four aggregations over an already-cleansed dataset.
///
/// Each aggregation only borrows `cleansed`; none depends on another.
pub fn summarize(cleansed: &Dataset, options: &AnalysisOptions) -> AnalysisResult<Report> {
    let min_purchases = check_min_purchases(options.min_purchases)?;
    let top_n = check_top_n(options.top_n)?;

    let loyal_customers = loyalty_customers(cleansed, options.min_purchases)?;
    log_success(
        Stage::Aggregate,
        format!("{} loyal customers (>= {} purchases)", loyal_customers.len(), min_purchases),
    );

    let revenue = quarterly_revenue(cleansed);
    log_success(Stage::Aggregate, format!("Revenue over {} quarters", revenue.len()));

    let demand = high_demand_products(cleansed, options.top_n)?;
    log_success(Stage::Aggregate, format!("Top {} products ranked", demand.len()));

    let patterns = purchase_patterns(cleansed);
    log_success(Stage::Aggregate, format!("Patterns for {} products", patterns.len()));

    log_info(Stage::Report, "Report assembled");
    Ok(Report {
        min_purchases,
        top_n,
        loyal_customers,
        quarterly_revenue: revenue,
        high_demand_products: demand,
        purchase_patterns: patterns,
        answers: answer_table(),
    })
}

/// Cleanse and summarize an in-memory dataset.
pub fn analyze_dataset(dataset: &Dataset, options: &AnalysisOptions) -> PipelineResult<Report> {
    options.validate()?;
    let (cleansed, _) = cleanse_dataset(dataset);
    Ok(summarize(&cleansed, options)?)
}

/// Format delimiter for display.
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

//! REST API types.
//!
//! Wire format is camelCase JSON.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::parser::SourceFormat;
use crate::report::Report;
use crate::transform::filter::CleanseStats;
use crate::transform::pipeline::{format_delimiter, AnalysisRun};

/// Response sent after a successful analysis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Always "ok" here; failures use [`error_response`].
    pub status: String,

    pub report: Report,

    pub metadata: ResponseMetadata,
}

/// Metadata about the analysed source.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub file_name: Option<String>,
    pub format: SourceFormat,
    pub encoding: Option<String>,
    pub delimiter: Option<String>,
    pub row_count: usize,
    pub columns: Vec<String>,
    pub cleanse: CleanseStats,
}

impl AnalyzeResponse {
    pub fn new(job_id: String, run: AnalysisRun) -> Self {
        Self {
            job_id,
            status: "ok".to_string(),
            report: run.report,
            metadata: ResponseMetadata {
                file_name: run.source.file_name,
                format: run.source.format,
                encoding: run.source.encoding,
                delimiter: run.source.delimiter.map(format_delimiter),
                row_count: run.source.row_count,
                columns: run.source.headers,
                cleanse: run.cleanse,
            },
        }
    }
}

/// Analysis parameters as received from a form; parsed by the server.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeParams {
    pub min_purchases: Option<String>,
    pub top_n: Option<String>,
}

/// Create an error response body.
pub fn error_response(job_id: &str, error: &str) -> Value {
    json!({
        "jobId": job_id,
        "status": "error",
        "error": error,
    })
}

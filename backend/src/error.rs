//! Error types for the salestrend pipeline.
//!
//! - [`LoadError`] - reading a source file into a [`crate::models::Dataset`]
//! - [`AnalysisError`] - caller contract violations on aggregation arguments
//! - [`PipelineError`] - top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Conversion is automatic via `From` implementations, so `?` works across
//! error boundaries.

use thiserror::Error;

// =============================================================================
// Loading Errors
// =============================================================================

/// Errors while loading a dataset from a file or byte buffer.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Source extension is not one of the recognised encodings.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Failed to read the source.
    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode text content.
    #[error("Failed to decode source: {0}")]
    Encoding(String),

    /// Structurally invalid CSV or workbook.
    #[error("Malformed source: {0}")]
    Malformed(String),

    /// No header row.
    #[error("Source is empty (no header row)")]
    EmptySource,

    /// Required column not present in the header row.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A cell that cannot be read as the column's type.
    #[error("Line {line}, column '{column}' (value '{value}'): {message}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
        message: String,
    },
}

impl LoadError {
    pub fn invalid_value(
        line: usize,
        column: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            line,
            column: column.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        match err.position() {
            Some(pos) => LoadError::Malformed(format!("line {}: {}", pos.line(), err)),
            None => LoadError::Malformed(err.to_string()),
        }
    }
}

impl From<calamine::XlsxError> for LoadError {
    fn from(err: calamine::XlsxError) -> Self {
        LoadError::Malformed(format!("workbook: {}", err))
    }
}

// =============================================================================
// Analysis Errors
// =============================================================================

/// Errors raised before an aggregation runs.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A threshold argument outside its valid domain.
    #[error("Invalid argument '{name}' = {value}: {reason}")]
    InvalidArgument {
        name: &'static str,
        value: i64,
        reason: &'static str,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// Returned by [`crate::transform::pipeline::analyze_file`] and friends. A run
/// either fully succeeds or fails with exactly one of these.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Argument error.
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

impl PipelineError {
    /// Whether the failure is caused by the caller's input rather than the host.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PipelineError::Load(LoadError::Io(_)))
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Invalid environment configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failed to bind or serve.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for aggregation argument checks.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // LoadError -> PipelineError
        let load_err = LoadError::UnsupportedFormat("sales.json".into());
        let pipeline_err: PipelineError = load_err.into();
        assert!(pipeline_err.to_string().contains("sales.json"));

        // AnalysisError -> PipelineError
        let arg_err = AnalysisError::InvalidArgument {
            name: "top_n",
            value: -1,
            reason: "must be positive",
        };
        let pipeline_err: PipelineError = arg_err.into();
        assert!(pipeline_err.to_string().contains("top_n"));
    }

    #[test]
    fn test_invalid_value_format() {
        let err = LoadError::invalid_value(5, "Quantity", "abc", "not an integer");
        let msg = err.to_string();
        assert!(msg.contains("Line 5"));
        assert!(msg.contains("column 'Quantity'"));
        assert!(msg.contains("value 'abc'"));
    }

    #[test]
    fn test_client_error_classification() {
        let io = PipelineError::Load(LoadError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk",
        )));
        assert!(!io.is_client_error());

        let unsupported = PipelineError::Load(LoadError::UnsupportedFormat("x.txt".into()));
        assert!(unsupported.is_client_error());
    }
}

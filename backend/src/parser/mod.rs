//! Dataset loader.
//!
//! Turns a `.csv` or `.xlsx` source into a [`Dataset`]. The format is chosen
//! from the file extension; everything downstream only sees records.
//!
//! ```text
//! bytes ──▶ SourceFormat::DelimitedText ──▶ csv + encoding sniffing ─┐
//!       └─▶ SourceFormat::Workbook      ──▶ first worksheet ─────────┴─▶ Table ──▶ Dataset
//! ```

pub mod delimited;
pub mod table;
pub mod workbook;

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::Dataset;

pub use delimited::{decode_content, detect_delimiter, detect_encoding};
pub use table::{Cell, Table, REQUIRED_COLUMNS};

/// Recognised source encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Comma (or other delimiter) separated text.
    DelimitedText,
    /// Spreadsheet workbook.
    Workbook,
}

impl SourceFormat {
    /// Resolve the format from a file name or path extension.
    pub fn from_file_name(name: &str) -> LoadResult<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(Self::DelimitedText),
            Some("xlsx") => Ok(Self::Workbook),
            _ => Err(LoadError::UnsupportedFormat(name.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> LoadResult<Self> {
        Self::from_file_name(&path.to_string_lossy())
    }

    /// Load a dataset from raw bytes in this format.
    pub fn load(self, bytes: &[u8]) -> LoadResult<ParsedSource> {
        let (table, encoding, delimiter) = match self {
            Self::DelimitedText => {
                let source = delimited::read_delimited(bytes)?;
                (source.table, Some(source.encoding), Some(source.delimiter))
            }
            Self::Workbook => (workbook::read_workbook(bytes)?, None, None),
        };

        let headers = table.headers.clone();
        let dataset = table.into_dataset()?;

        Ok(ParsedSource {
            row_count: dataset.len(),
            dataset,
            format: self,
            encoding,
            delimiter,
            headers,
        })
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DelimitedText => write!(f, "delimited text"),
            Self::Workbook => write!(f, "workbook"),
        }
    }
}

/// A loaded dataset with the metadata of its source.
#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub dataset: Dataset,
    pub format: SourceFormat,
    /// Detected text encoding (delimited text only).
    pub encoding: Option<String>,
    /// Detected delimiter (delimited text only).
    pub delimiter: Option<char>,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Load a dataset from a file, choosing the reader by extension.
///
/// The extension is checked before the file is opened, so an unsupported
/// source fails without touching the filesystem.
pub fn load_path<P: AsRef<Path>>(path: P) -> LoadResult<ParsedSource> {
    let path = path.as_ref();
    let format = SourceFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    format.load(&bytes)
}

/// Load a dataset from bytes whose original file name is known.
pub fn load_named_bytes(file_name: &str, bytes: &[u8]) -> LoadResult<ParsedSource> {
    SourceFormat::from_file_name(file_name)?.load(bytes)
}

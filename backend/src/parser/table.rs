//! Format-agnostic intermediate table and its mapping to [`Dataset`].
//!
//! Both source encodings produce a [`Table`]: a header row plus typed cells.
//! Column lookup, cell coercion and missing-value handling live here so the
//! CSV and workbook readers stay purely structural.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::{LoadError, LoadResult};
use crate::models::{Dataset, Record};

pub const CUSTOMER_ID: &str = "CustomerID";
pub const STOCK_CODE: &str = "StockCode";
pub const QUANTITY: &str = "Quantity";
pub const UNIT_PRICE: &str = "UnitPrice";
pub const INVOICE_DATE: &str = "InvoiceDate";

/// Columns every source must provide.
pub const REQUIRED_COLUMNS: [&str; 5] = [CUSTOMER_ID, STOCK_CODE, QUANTITY, UNIT_PRICE, INVOICE_DATE];

/// Text values read as missing, as dataframe readers do.
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "NULL", "null", "None"];

/// Accepted textual datetime layouts, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Accepted textual date-only layouts (midnight is assumed).
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Largest spreadsheet serial day number (9999-12-31).
const MAX_SERIAL_DAY: f64 = 2_958_465.0;

/// A single cell value as read from the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Build a text cell, collapsing missing markers to [`Cell::Empty`].
    pub fn text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if MISSING_MARKERS.contains(&trimmed) {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::DateTime(dt) => dt.to_string(),
        }
    }
}

/// A data row with its 1-based source line.
#[derive(Debug, Clone)]
pub struct Row {
    pub line: usize,
    pub cells: Vec<Cell>,
}

/// Header row plus data rows.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Resolved positions of the required columns.
struct ColumnMap {
    customer_id: usize,
    stock_code: usize,
    quantity: usize,
    unit_price: usize,
    invoice_date: usize,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> LoadResult<Self> {
        Ok(Self {
            customer_id: find_column(headers, CUSTOMER_ID)?,
            stock_code: find_column(headers, STOCK_CODE)?,
            quantity: find_column(headers, QUANTITY)?,
            unit_price: find_column(headers, UNIT_PRICE)?,
            invoice_date: find_column(headers, INVOICE_DATE)?,
        })
    }
}

/// Exact (trimmed) match first, then case-insensitive.
fn find_column(headers: &[String], name: &str) -> LoadResult<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .or_else(|| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name)))
        .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
}

impl Table {
    /// Map every row into a [`Record`].
    ///
    /// Fails on the first cell that is present but cannot be read as its
    /// column's type, or on a blank `StockCode`/`InvoiceDate`.
    pub fn into_dataset(self) -> LoadResult<Dataset> {
        let columns = ColumnMap::resolve(&self.headers)?;
        let empty = Cell::Empty;

        let mut records = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let cell = |idx: usize| row.cells.get(idx).unwrap_or(&empty);
            let fail = |column: &str, idx: usize, message: String| {
                LoadError::invalid_value(row.line, column, cell(idx).display(), message)
            };

            let customer_id = read_identifier(cell(columns.customer_id));
            let stock_code = read_identifier(cell(columns.stock_code)).ok_or_else(|| {
                fail(STOCK_CODE, columns.stock_code, "missing product identifier".to_string())
            })?;
            let quantity = read_quantity(cell(columns.quantity))
                .map_err(|m| fail(QUANTITY, columns.quantity, m))?;
            let unit_price = read_price(cell(columns.unit_price))
                .map_err(|m| fail(UNIT_PRICE, columns.unit_price, m))?;
            let invoice_date = read_datetime(cell(columns.invoice_date))
                .map_err(|m| fail(INVOICE_DATE, columns.invoice_date, m))?;

            records.push(Record {
                customer_id,
                stock_code,
                quantity,
                unit_price,
                invoice_date,
            });
        }

        Ok(Dataset::new(records))
    }
}

// =============================================================================
// Cell coercion
// =============================================================================

/// Identifiers keep their text; integral numbers lose the `.0` that
/// spreadsheets and float columns add (`17850.0` -> `17850`).
fn read_identifier(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Empty => None,
        Cell::Number(n) => Some(format_number_id(*n)),
        Cell::Text(s) => match s.parse::<f64>() {
            Ok(n) if n.is_finite() && n.fract() == 0.0 && s.contains('.') => Some(format_number_id(n)),
            _ => Some(s.clone()),
        },
        Cell::DateTime(dt) => Some(dt.to_string()),
    }
}

fn format_number_id(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

fn read_quantity(cell: &Cell) -> Result<i64, String> {
    match cell {
        Cell::Empty => Ok(0),
        Cell::Number(n) => integral(*n),
        Cell::Text(s) => match s.parse::<i64>() {
            Ok(v) => Ok(v),
            Err(_) => s
                .parse::<f64>()
                .map_err(|_| "not an integer".to_string())
                .and_then(integral),
        },
        Cell::DateTime(_) => Err("expected an integer, found a date".to_string()),
    }
}

fn integral(n: f64) -> Result<i64, String> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Ok(n as i64)
    } else {
        Err("not an integer".to_string())
    }
}

fn read_price(cell: &Cell) -> Result<f64, String> {
    let value = match cell {
        Cell::Empty => return Ok(0.0),
        Cell::Number(n) => *n,
        Cell::Text(s) => s.parse::<f64>().map_err(|_| "not a number".to_string())?,
        Cell::DateTime(_) => return Err("expected a number, found a date".to_string()),
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err("not a finite number".to_string())
    }
}

fn read_datetime(cell: &Cell) -> Result<NaiveDateTime, String> {
    match cell {
        Cell::Empty => Err("missing invoice date".to_string()),
        Cell::DateTime(dt) => Ok(*dt),
        Cell::Number(serial) => from_serial(*serial).ok_or_else(|| "serial date out of range".to_string()),
        Cell::Text(s) => parse_datetime_text(s).ok_or_else(|| "unrecognised date format".to_string()),
    }
}

/// Parse a textual timestamp in one of the accepted layouts.
pub fn parse_datetime_text(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Convert a spreadsheet serial date (days since 1899-12-30) to a timestamp.
pub fn from_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_SERIAL_DAY + 1.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

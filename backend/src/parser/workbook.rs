//! Spreadsheet workbook reader (`.xlsx`).
//!
//! Reads the first worksheet; its first row is the header row.

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::io::Cursor;

use crate::error::{LoadError, LoadResult};

use super::table::{Cell, Row, Table};

/// Read the first worksheet of an `.xlsx` workbook into a [`Table`].
pub fn read_workbook(bytes: &[u8]) -> LoadResult<Table> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::EmptySource)??;

    // Absolute row index of the first used row, for 1-based line numbers.
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows = range.rows();

    let headers: Vec<String> = rows
        .next()
        .ok_or(LoadError::EmptySource)?
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(LoadError::EmptySource);
    }

    let mut table_rows = Vec::new();
    for (idx, row) in rows.enumerate() {
        let cells: Vec<Cell> = row.iter().map(to_cell).collect();
        if cells.iter().all(|c| *c == Cell::Empty) {
            continue;
        }
        table_rows.push(Row {
            line: first_row + idx + 2,
            cells,
        });
    }

    Ok(Table {
        headers,
        rows: table_rows,
    })
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::text(s),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => Cell::DateTime(value),
            None => Cell::Number(dt.as_f64()),
        },
        other => Cell::text(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{load_named_bytes, SourceFormat};
    use rust_xlsxwriter::{Format, Workbook};

    /// Header, a sale, a blank row, then a guest sale with a numeric code.
    fn sample_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let date = Format::new().set_num_format("yyyy-mm-dd hh:mm");
        let sheet = workbook.add_worksheet();

        for (col, name) in ["InvoiceNo", "StockCode", "Quantity", "InvoiceDate", "UnitPrice", "CustomerID"]
            .iter()
            .enumerate()
        {
            sheet.write_string(0, col as u16, *name).unwrap();
        }

        sheet.write_number(1, 0, 536365.0).unwrap();
        sheet.write_string(1, 1, "85123A").unwrap();
        sheet.write_number(1, 2, 6.0).unwrap();
        sheet.write_number_with_format(1, 3, 40513.35, &date).unwrap();
        sheet.write_number(1, 4, 2.55).unwrap();
        sheet.write_number(1, 5, 17850.0).unwrap();

        sheet.write_number(3, 0, 540001.0).unwrap();
        sheet.write_number(3, 1, 22728.0).unwrap();
        sheet.write_number(3, 2, 24.0).unwrap();
        sheet.write_number_with_format(3, 3, 40558.4375, &date).unwrap();
        sheet.write_number(3, 4, 3.75).unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_read_workbook_rows_and_lines() {
        let table = read_workbook(&sample_workbook()).unwrap();

        assert_eq!(table.headers[1], "StockCode");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].line, 2);
        // Row 3 is blank and skipped.
        assert_eq!(table.rows[1].line, 4);
    }

    #[test]
    fn test_load_workbook_records() {
        let parsed = load_named_bytes("Customer_Behavior.xlsx", &sample_workbook()).unwrap();
        assert_eq!(parsed.format, SourceFormat::Workbook);
        assert!(parsed.encoding.is_none());
        assert_eq!(parsed.row_count, 2);

        let records = parsed.dataset.records();
        assert_eq!(records[0].customer_id.as_deref(), Some("17850"));
        assert_eq!(records[0].stock_code, "85123A");
        assert_eq!(records[0].quantity, 6);
        assert!((records[0].unit_price - 2.55).abs() < 1e-9);
        assert!(records[1].customer_id.is_none());
        assert_eq!(records[1].stock_code, "22728");

        let quarters: Vec<String> = records.iter().map(|r| r.quarter().to_string()).collect();
        assert_eq!(quarters, vec!["2010Q4", "2011Q1"]);
        assert_eq!(
            records[1].invoice_date.format("%Y-%m-%d %H:%M").to_string(),
            "2011-01-15 10:30"
        );
    }

    #[test]
    fn test_to_cell_variants() {
        assert_eq!(to_cell(&Data::Empty), Cell::Empty);
        assert_eq!(to_cell(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(to_cell(&Data::Float(2.5)), Cell::Number(2.5));
        assert_eq!(to_cell(&Data::String(" 85123A ".into())), Cell::Text("85123A".into()));
        assert_eq!(to_cell(&Data::String("".into())), Cell::Empty);
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = read_workbook(b"definitely not a zip archive").unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }
}

//! Delimited text reader with encoding and delimiter auto-detection.

use crate::error::{LoadError, LoadResult};

use super::table::{Cell, Row, Table};

/// Bytes inspected by the charset detector.
const SNIFF_BYTES: usize = 64 * 1024;

/// Candidate delimiters, in tie-break order.
const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decoded text source with the settings that were detected.
#[derive(Debug, Clone)]
pub struct DelimitedSource {
    pub table: Table,
    pub encoding: String,
    pub delimiter: char,
}

/// Detect the encoding of raw bytes.
///
/// A UTF-8 BOM or a sample that is already valid UTF-8 short-circuits to
/// `utf-8`; anything else is left to chardet. A multi-byte character cut by
/// the end of the sample still counts as valid.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let sample = &bytes[..bytes.len().min(SNIFF_BYTES)];
    if sample.starts_with(UTF8_BOM) || is_utf8_prefix(sample) {
        return "utf-8".to_string();
    }
    let charset = chardet::detect(sample).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

fn is_utf8_prefix(sample: &[u8]) -> bool {
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        // `error_len() == None` means the input ended mid-character.
        Err(e) => e.error_len().is_none(),
    }
}

/// Decode bytes to a string using the given encoding label.
///
/// Invalid UTF-8 falls back to Windows-1252, which accepts every byte. An
/// unknown label is only an error when the bytes are not valid UTF-8 either.
pub fn decode_content(bytes: &[u8], encoding: &str) -> LoadResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|_| LoadError::Encoding(format!("unsupported charset '{}'", label)))?,
        },
    };

    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Falls back to a comma when no candidate appears.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &DELIMITERS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse decoded text with an explicit delimiter.
pub fn parse_text(content: &str, delimiter: char) -> LoadResult<Table> {
    if content.trim().is_empty() {
        return Err(LoadError::EmptySource);
    }
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| LoadError::Malformed(format!("delimiter '{}' is not ASCII", delimiter)))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(LoadError::EmptySource);
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        let cells = record.iter().map(Cell::text).collect();
        rows.push(Row { line, cells });
    }

    Ok(Table { headers, rows })
}

/// Decode, sniff the delimiter and parse.
pub fn read_delimited(bytes: &[u8]) -> LoadResult<DelimitedSource> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    let table = parse_text(&content, delimiter)?;

    Ok(DelimitedSource {
        table,
        encoding,
        delimiter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = parse_text("a,b\n1,2\n3,4", ',').unwrap();

        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells[0], Cell::Text("1".into()));
        assert_eq!(table.rows[1].cells[1], Cell::Text("4".into()));
    }

    #[test]
    fn test_quoted_field_with_delimiter() {
        let csv = "StockCode,Description,Quantity\n84029G,\"KNITTED UNION FLAG, HOT WATER BOTTLE\",6";
        let table = parse_text(csv, ',').unwrap();

        assert_eq!(table.rows[0].cells.len(), 3);
        assert_eq!(
            table.rows[0].cells[1],
            Cell::Text("KNITTED UNION FLAG, HOT WATER BOTTLE".into())
        );
        assert_eq!(table.rows[0].cells[2], Cell::Text("6".into()));
    }

    #[test]
    fn test_empty_lines_skipped() {
        let table = parse_text("a;b\n1;2\n\n3;4\n", ';').unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_line_numbers_follow_source() {
        let table = parse_text("a,b\n1,2\n3,4", ',').unwrap();
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].line, 3);
    }

    #[test]
    fn test_missing_values() {
        let table = parse_text("a;b;c\n1;;3", ';').unwrap();
        assert_eq!(table.rows[0].cells[1], Cell::Empty);
    }

    #[test]
    fn test_empty_source_error() {
        assert!(matches!(parse_text("", ','), Err(LoadError::EmptySource)));
        assert!(matches!(parse_text("  \n", ','), Err(LoadError::EmptySource)));
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
    }

    #[test]
    fn test_detect_delimiter_pipe() {
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_detect_delimiter_defaults_to_comma() {
        assert_eq!(detect_delimiter("single_column\n1"), ',');
    }

    #[test]
    fn test_bom_stripped() {
        let bytes = "\u{feff}CustomerID,Quantity\n1,2".as_bytes();
        let source = read_delimited(bytes).unwrap();
        assert_eq!(source.table.headers[0], "CustomerID");
    }

    #[test]
    fn test_detect_utf8_short_circuit() {
        assert_eq!(detect_encoding("Société;Prix\n".as_bytes()), "utf-8");
        assert_eq!(detect_encoding(&[0xEF, 0xBB, 0xBF, b'a']), "utf-8");
    }

    #[test]
    fn test_utf8_character_across_sample_end() {
        let header = "CustomerID,StockCode,Quantity,UnitPrice,InvoiceDate,Description\n";
        let mut content = String::from(header);
        // Place the two-byte 'é' so its first byte is the last sampled byte.
        while content.len() < SNIFF_BYTES - 1 {
            content.push('a');
        }
        content.push_str("é CAFÉ\n");
        assert_eq!(content.as_bytes()[SNIFF_BYTES - 1], 0xC3);

        assert_eq!(detect_encoding(content.as_bytes()), "utf-8");
        let decoded = decode_content(content.as_bytes(), &detect_encoding(content.as_bytes())).unwrap();
        assert!(decoded.ends_with("aé CAFÉ\n"));
    }

    #[test]
    fn test_truncated_sample_with_invalid_byte_is_not_utf8() {
        let mut bytes = vec![b'a'; SNIFF_BYTES - 3];
        bytes.extend_from_slice(&[0xE9, b'a', b'a', 0xC3]);
        assert!(!is_utf8_prefix(&bytes[..SNIFF_BYTES]));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_invalid_utf8_falls_back() {
        let bytes: &[u8] = &[0x41, 0xE9, 0x42];
        let decoded = decode_content(bytes, "utf-8").unwrap();
        assert_eq!(decoded, "AéB");
    }

    #[test]
    fn test_auto_parse() {
        let source = read_delimited(b"name;age\nAlice;30\nBob;25").unwrap();

        assert_eq!(source.delimiter, ';');
        assert_eq!(source.encoding, "utf-8");
        assert_eq!(source.table.rows.len(), 2);
        assert_eq!(source.table.headers, vec!["name", "age"]);
    }
}

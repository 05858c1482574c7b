//! CSV decoding and parsing for uploaded movie files.
//!
//! Converts CSV rows into JSON objects keyed by normalized (trimmed, lowercased)
//! header names. Quoting follows the usual CSV rules: fields may be wrapped in
//! double quotes, embedded quotes are doubled, quoted fields may hold commas.

use csv::{ReaderBuilder, StringRecord, Trim};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{CsvError, CsvResult};

const UTF8_BOM: &str = "\u{feff}";

/// One data row, keyed by normalized header.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    /// 1-based position among the non-blank data rows (not a file line number).
    pub row: usize,
    pub values: Map<String, Value>,
}

/// Parsed file with its header.
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    /// Normalized column names.
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
    /// Encoding the bytes were decoded with.
    pub encoding: String,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to text, returning the text and the encoding used.
///
/// Valid UTF-8 is used as is (minus a leading BOM). Anything else goes through
/// charset detection, falling back to Windows-1252 which maps every byte.
pub fn decode_content(bytes: &[u8]) -> (String, String) {
    if let Ok(text) = std::str::from_utf8(bytes) {
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
        return (text.to_string(), "utf-8".to_string());
    }

    let detected = detect_encoding(bytes);
    let encoding = encoding_rs::Encoding::for_label(detected.as_bytes())
        .unwrap_or(encoding_rs::WINDOWS_1252);
    let (text, used, had_errors) = encoding.decode(bytes);
    if !had_errors {
        return (text.into_owned(), used.name().to_lowercase());
    }

    let (text, used, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    (text.into_owned(), used.name().to_lowercase())
}

fn normalize_header(record: &StringRecord) -> Vec<String> {
    record.iter().map(|h| h.trim().to_lowercase()).collect()
}

/// Parse only the header row of `content`.
pub fn read_header(content: &str) -> CsvResult<Vec<String>> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut record = StringRecord::new();
    if !reader.read_record(&mut record)? {
        return Err(CsvError::EmptyFile);
    }
    Ok(normalize_header(&record))
}

/// Expected columns absent from `headers`, case-insensitively.
pub fn missing_columns(headers: &[String], expected: &[String]) -> Vec<String> {
    expected
        .iter()
        .filter(|col| !headers.iter().any(|h| h.eq_ignore_ascii_case(col.trim())))
        .cloned()
        .collect()
}

/// Line on which a quoted field opens without ever being closed.
///
/// The `csv` reader accepts such input and swallows the rest of the file into
/// one field, so it is caught here first. Quotes only open a field at its
/// start; a doubled quote inside a quoted field is an escaped quote.
fn unterminated_quote_line(content: &str) -> Option<u64> {
    let mut line = 1;
    let mut opened_at = 0;
    let mut in_quotes = false;
    let mut at_field_start = true;

    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                }
                '"' => in_quotes = false,
                '\n' => line += 1,
                _ => {}
            }
            continue;
        }

        match c {
            '"' if at_field_start => {
                in_quotes = true;
                opened_at = line;
                at_field_start = false;
            }
            ',' | '\r' => at_field_start = true,
            '\n' => {
                line += 1;
                at_field_start = true;
            }
            _ => at_field_start = false,
        }
    }

    in_quotes.then_some(opened_at)
}

/// Parse CSV text into rows keyed by normalized header.
///
/// Blank lines and rows whose cells are all empty are skipped; cell values are
/// trimmed. A quoted field left open at the end of the input is a
/// [`CsvError::ParseError`]. Rows may be shorter or longer than the header: absent cells are left
/// out of the row, extra cells are ignored.
///
/// # Example
/// ```
/// use movies::parser::parse_str;
///
/// let parsed = parse_str("Title,Year\n\"Crouching Tiger, Hidden Dragon\",2000\n").unwrap();
///
/// assert_eq!(parsed.headers, vec!["title", "year"]);
/// assert_eq!(parsed.rows[0].values["title"], "Crouching Tiger, Hidden Dragon");
/// ```
pub fn parse_str(content: &str) -> CsvResult<ParsedCsv> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    if let Some(line) = unterminated_quote_line(content) {
        return Err(CsvError::ParseError {
            line,
            message: "unterminated quoted field".to_string(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers = match records.next() {
        Some(header) => normalize_header(&header?),
        None => return Err(CsvError::EmptyFile),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let values: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.clone(), Value::String(cell.to_string())))
            .collect();

        rows.push(CsvRow {
            row: rows.len() + 1,
            values,
        });
    }

    Ok(ParsedCsv {
        headers,
        rows,
        encoding: "utf-8".to_string(),
    })
}

/// Decode and parse an uploaded buffer.
pub fn parse_bytes(bytes: &[u8]) -> CsvResult<ParsedCsv> {
    let (content, encoding) = decode_content(bytes);
    let mut parsed = parse_str(&content)?;
    parsed.encoding = encoding;
    Ok(parsed)
}

/// Read and parse a CSV file from disk.
pub fn parse_csv_file<P: AsRef<Path>>(path: P) -> CsvResult<ParsedCsv> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes)
}

//! Table loader for delimited text and spreadsheet files

use crate::error::{Error, Result};
use crate::table::Table;
use calamine::{open_workbook_auto, Data, Reader};
use std::fs;
use std::path::Path;
use tracing::debug;

/// On-disk format of a source file, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// CSV-like text with a sniffed separator
    Delimited,
    /// Anything calamine can open (xlsx, xls, xlsm, xlsb, ods)
    Spreadsheet,
}

impl SourceFormat {
    /// Detect the format from a file extension. Unknown extensions are
    /// handed to the spreadsheet reader, which rejects what it cannot open.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("csv") | Some("txt") => SourceFormat::Delimited,
            _ => SourceFormat::Spreadsheet,
        }
    }
}

/// Load a source file into a raw table
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let table = match SourceFormat::from_path(path) {
        SourceFormat::Delimited => parse_delimited_file(path)?,
        SourceFormat::Spreadsheet => parse_spreadsheet(path)?,
    };

    debug!(
        path = %path.display(),
        rows = table.row_count(),
        "loaded table"
    );
    Ok(table)
}

/// Read a delimited file, converting legacy encodings to UTF-8 first
pub fn parse_delimited_file(path: &Path) -> Result<Table> {
    let bytes = fs::read(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let content = decode_text(bytes);
    parse_csv_str(&content, &path.to_string_lossy())
}

/// Decode raw bytes as UTF-8, falling back to Windows-1252
/// (what spreadsheet software usually writes for French exports).
pub fn decode_text(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

/// Semicolon if the first non-blank line has one, comma otherwise
pub fn sniff_delimiter(content: &str) -> u8 {
    let first_line = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");
    if first_line.contains(';') {
        b';'
    } else {
        b','
    }
}

/// Split text into physical records, keeping quoted line breaks inside
/// their record. Blank lines come back as empty slices.
fn split_records(content: &str) -> Vec<&str> {
    let mut records = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in content.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\n' if !in_quotes => {
                records.push(content[start..i].trim_end_matches('\r'));
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < content.len() {
        records.push(content[start..].trim_end_matches('\r'));
    }

    records
}

/// Parse delimited text from a string (useful for testing).
///
/// Every line becomes a row, blank lines included, so row indices match the
/// file as opened in a text editor.
pub fn parse_csv_str(content: &str, source_name: &str) -> Result<Table> {
    let path = std::path::PathBuf::from(source_name);
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(sniff_delimiter(content))
        .has_headers(false)
        .flexible(true);

    let mut table = Table::new(path.clone());
    for line in split_records(content) {
        if line.is_empty() {
            table.rows.push(Vec::new());
            continue;
        }

        let mut csv_reader = builder.from_reader(line.as_bytes());
        for result in csv_reader.records() {
            let record = result.map_err(|e| Error::Csv {
                path: path.clone(),
                source: e,
            })?;
            table.rows.push(record.iter().map(str::to_string).collect());
        }
    }

    Ok(table)
}

/// Read the first sheet of a workbook. Cells before the used range are
/// padded so that row and column indices match what the user sees.
pub fn parse_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).map_err(|e| Error::UnreadableFormat {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(e)) => {
            return Err(Error::UnreadableFormat {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
        None => {
            return Err(Error::UnreadableFormat {
                path: path.to_path_buf(),
                message: "workbook contains no sheets".to_string(),
            })
        }
    };

    let mut table = Table::new(path.to_path_buf());
    let (start_row, start_col) = match range.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => return Ok(table),
    };

    table.rows.extend((0..start_row).map(|_| Vec::new()));
    for row in range.rows() {
        let mut cells = vec![String::new(); start_col];
        cells.extend(row.iter().map(cell_to_string));
        table.rows.push(cells);
    }

    Ok(table)
}

/// Render a spreadsheet cell the way it would appear in a CSV export.
/// Dates stay as serial numbers; the date converter formats them later.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => format_number(*n),
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Integers without decimals, everything else as-is
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

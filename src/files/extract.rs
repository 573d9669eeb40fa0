use super::schema::FileKind;
use crate::error::ExtractError;
use calamine::{Data, Range, Reader};
use std::fmt::Write as _;
use std::io::Cursor;

/// Extract the text content of `data` according to its declared kind.
///
/// Text and CSV must be valid UTF-8. Unknown kinds are decoded lossily and
/// never fail. Spreadsheet and PDF fail on any parser error.
pub fn extract_text(data: &[u8], kind: FileKind) -> Result<String, ExtractError> {
    match kind {
        FileKind::Text => Ok(std::str::from_utf8(data)?.to_string()),
        FileKind::Csv => extract_csv(data),
        FileKind::Spreadsheet => extract_spreadsheet(data),
        FileKind::Pdf => extract_pdf(data),
        FileKind::Unknown => Ok(String::from_utf8_lossy(data).into_owned()),
    }
}

/// Re-emit each CSV row as its fields joined by single commas.
///
/// Quoting is resolved but not re-applied, so a quoted field holding a comma
/// comes out as two comma-separated pieces. Blank lines produce no row.
/// Input that ends inside a quoted field is rejected.
fn extract_csv(data: &[u8]) -> Result<String, ExtractError> {
    if let Some(record) = unterminated_quote(data) {
        return Err(ExtractError::Parse {
            record,
            message: "quoted field is never closed".to_string(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut out = String::with_capacity(data.len());
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| ExtractError::Parse {
            record: index as u64 + 1,
            message: e.to_string(),
        })?;
        for (i, field) in row.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(field);
        }
        out.push('\n');
    }
    Ok(out)
}

/// 1-based record holding a quote that is still open at end of input.
///
/// Records are counted the way the reader counts them: blank lines do not
/// start a record, line breaks inside quotes do not end one.
fn unterminated_quote(data: &[u8]) -> Option<u64> {
    let mut record = 1u64;
    let mut in_record = false;
    let mut open_at = None;

    for &byte in data {
        match byte {
            b'"' => {
                in_record = true;
                // A doubled quote inside a field closes and reopens
                open_at = match open_at {
                    Some(_) => None,
                    None => Some(record),
                };
            }
            b'\n' | b'\r' if open_at.is_none() => {
                if in_record {
                    record += 1;
                    in_record = false;
                }
            }
            _ => in_record = true,
        }
    }
    open_at
}

fn extract_spreadsheet(data: &[u8]) -> Result<String, ExtractError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(data))
        .map_err(|e| ExtractError::Spreadsheet(e.to_string()))?;

    match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => Ok(render_sheet(&range)),
        Some(Err(e)) => Err(ExtractError::Spreadsheet(e.to_string())),
        None => Ok(String::new()),
    }
}

/// One line per non-blank row, cells at their absolute column position.
fn render_sheet(range: &Range<Data>) -> String {
    let leading_cols = range.start().map_or(0, |(_, col)| col as usize);
    let mut out = String::new();

    for row in range.rows() {
        // Trailing blanks are dropped, fully blank rows are skipped
        let Some(last) = row.iter().rposition(|cell| !matches!(cell, Data::Empty)) else {
            continue;
        };
        for _ in 0..leading_cols {
            out.push(',');
        }
        for (i, cell) in row[..=last].iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write_cell(&mut out, cell);
        }
        out.push('\n');
    }
    out
}

/// Whole floats keep one decimal (`3.0`), dates render as
/// `YYYY-MM-DD HH:MM:SS`, error cells as their Excel code.
fn write_cell(buffer: &mut String, cell: &Data) {
    match cell {
        Data::Empty => {}
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => buffer.push_str(s),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.is_finite() {
                let _ = write!(buffer, "{f:.1}");
            } else {
                let _ = write!(buffer, "{f}");
            }
        }
        Data::Int(i) => {
            let _ = write!(buffer, "{i}");
        }
        Data::Bool(b) => buffer.push_str(if *b { "true" } else { "false" }),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => {
                let _ = write!(buffer, "{}", datetime.format("%Y-%m-%d %H:%M:%S"));
            }
            None => {
                let _ = write!(buffer, "{}", dt.as_f64());
            }
        },
        Data::Error(e) => {
            let _ = write!(buffer, "{e}");
        }
    }
}

fn extract_pdf(data: &[u8]) -> Result<String, ExtractError> {
    #[cfg(feature = "pdf")]
    {
        // pdf-extract panics on some malformed inputs instead of returning Err
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractError::Pdf(e.to_string())),
            Err(_) => Err(ExtractError::Pdf("parser aborted on malformed document".to_string())),
        }
    }
    #[cfg(not(feature = "pdf"))]
    {
        let _ = data;
        Err(ExtractError::Unsupported(
            "PDF extraction requires the `pdf` feature".to_string(),
        ))
    }
}

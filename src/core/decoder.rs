use crate::core::table::{Row, SourceFormat, Table};
use crate::error::{EngineError, Result};
use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use chrono::{NaiveDateTime, Timelike};
use csv::ReaderBuilder;
use std::io::Cursor;
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub header: Option<Row>,
    pub rows: Table,
}

/// Decode raw file bytes into a rectangular table, optionally splitting off
/// the first row as the header.
///
/// Every row must have as many cells as the first one. Zero data rows after
/// header removal is [`EngineError::Empty`].
pub fn decode(data: &[u8], format: SourceFormat, has_header: bool) -> Result<Decoded> {
    let mut rows = match format {
        SourceFormat::DelimitedText => decode_delimited(data)?,
        SourceFormat::Spreadsheet => decode_spreadsheet(data)?,
    };

    check_shape(&rows)?;

    let header = if has_header && !rows.is_empty() {
        Some(rows.remove(0))
    } else {
        None
    };

    if rows.is_empty() {
        return Err(EngineError::Empty);
    }

    debug!(
        "Decoded {:?}: {} data rows, {} columns",
        format,
        rows.len(),
        rows[0].len()
    );

    Ok(Decoded { header, rows })
}

fn decode_delimited(data: &[u8]) -> Result<Table> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let data = &data[..content_end(data)];

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // 行宽由 check_shape 统一校验
        .from_reader(data);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| EngineError::Malformed(format!("row {}: {}", index + 1, e)))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(rows)
}

/// Offset of the first blank line outside a quoted field, or `data.len()`.
fn content_end(data: &[u8]) -> usize {
    let is_blank = |line: &[u8]| line.iter().all(|b| b.is_ascii_whitespace());

    let mut in_quotes = false;
    let mut line_start = 0;
    let mut i = 0;

    while i < data.len() {
        match data[i] {
            b'"' if in_quotes => {
                // "" 是转义的引号
                if data.get(i + 1) == Some(&b'"') {
                    i += 1;
                } else {
                    in_quotes = false;
                }
            }
            // 只有字段开头的引号才开启引用，字段中间的引号是普通字符
            b'"' if i == line_start || data[i - 1] == b',' => in_quotes = true,
            b'\n' if !in_quotes => {
                if is_blank(&data[line_start..i]) {
                    return line_start;
                }
                line_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    // 末行没有换行符
    if line_start < data.len() && is_blank(&data[line_start..]) {
        return line_start;
    }

    data.len()
}

fn decode_spreadsheet(data: &[u8]) -> Result<Table> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))
        .map_err(|e| EngineError::Malformed(format!("cannot open spreadsheet: {}", e)))?;

    // 只读取第一个工作表
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EngineError::Malformed("spreadsheet has no worksheets".to_string()))?
        .map_err(|e| EngineError::Malformed(format!("cannot read first worksheet: {}", e)))?;

    let mut rows = Vec::with_capacity(range.height());
    for row in range.rows() {
        // 全空行视为输入结束
        if row.iter().all(|cell| cell.is_empty()) {
            break;
        }
        rows.push(row.iter().map(cell_to_string).collect());
    }

    Ok(rows)
}

/// Canonical text form of a spreadsheet cell.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_to_string(*f),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(format_datetime)
            .unwrap_or_else(|| cell.to_string()),
        Data::Error(e) => e.to_string(),
    }
}

fn float_to_string(f: f64) -> String {
    // Display 已经输出最短往返形式，3.0 -> "3"
    if f == 0.0 {
        "0".to_string()
    } else {
        f.to_string()
    }
}

fn format_datetime(dt: NaiveDateTime) -> String {
    if dt.time().num_seconds_from_midnight() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

fn check_shape(rows: &Table) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let width = first.len();

    for (index, row) in rows.iter().enumerate().skip(1) {
        if row.len() != width {
            return Err(EngineError::Malformed(format!(
                "row {} has {} cells, expected {}",
                index + 1,
                row.len(),
                width
            )));
        }
    }

    Ok(())
}

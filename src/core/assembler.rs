use crate::core::table::{Row, SampleResult, Table};
use crate::error::Result;
use anyhow::Context;
use csv::{QuoteStyle, Terminator, WriterBuilder};

/// Project `indices` (ascending) onto `table` and serialize header + rows.
///
/// The table is consumed so that selected rows are moved, not cloned.
pub fn assemble(table: Table, header: Option<Row>, indices: &[usize]) -> Result<SampleResult> {
    let total_rows = table.len();

    let mut wanted = indices.iter().copied().peekable();
    let mut rows = Vec::with_capacity(indices.len());
    for (index, row) in table.into_iter().enumerate() {
        match wanted.peek() {
            Some(&next) if next == index => {
                rows.push(row);
                wanted.next();
            }
            Some(_) => {}
            None => break,
        }
    }

    let header = header.unwrap_or_default();
    let csv = serialize(&header, &rows)?;

    Ok(SampleResult {
        rows,
        header,
        csv,
        total_rows,
    })
}

/// Comma-separated, `\n` between rows, no trailing newline. Cells containing
/// a comma, quote, CR or LF are quoted with internal quotes doubled.
pub fn serialize(header: &[String], rows: &[Row]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    if !header.is_empty() {
        writer
            .write_record(header)
            .context("failed to write header row")?;
    }
    for row in rows {
        writer.write_record(row).context("failed to write data row")?;
    }

    let mut bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush csv writer: {}", e.error()))?;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }

    let text = String::from_utf8(bytes).context("csv output is not valid UTF-8")?;
    Ok(text)
}

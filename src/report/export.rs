use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::ColourTable;

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Write the result matrix as CSV.
///
/// Layout: a header row `-, name1, name2, ...`, then one row per selected
/// field starting with its short label. Numbers use `precision` decimals.
pub fn write_csv<W: Write>(table: &ColourTable, writer: W, precision: usize) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.names.len() + 1);
    header.push("-".to_string());
    header.extend(table.names.iter().cloned());
    out.write_record(&header).context("writing CSV header")?;

    for (field, values) in table.rows() {
        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(field.label().to_string());
        record.extend(values.iter().map(|v| v.format(precision)));
        out.write_record(&record)
            .with_context(|| format!("writing CSV row '{}'", field.title()))?;
    }
    out.flush().context("flushing CSV output")?;
    Ok(())
}

pub fn save_csv(table: &ColourTable, path: &Path, precision: usize) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_csv(table, file, precision)?;
    log::info!("wrote {} rows to {}", table.fields.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// `[{ "name": ..., "values": { title: value, ... } }, ...]`
pub fn write_json<W: Write>(table: &ColourTable, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, table).context("writing JSON report")?;
    Ok(())
}

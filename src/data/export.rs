use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::IndicatorRecord;

/// Write records as CSV with the header `year,item,value,unit,flag,note`.
/// Absent values and notes are written as empty cells.
pub fn write_csv<W: Write>(records: &[IndicatorRecord], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("writing {} {}", record.item, record.year))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

pub fn export_csv(records: &[IndicatorRecord], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(records, file)?;
    log::info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

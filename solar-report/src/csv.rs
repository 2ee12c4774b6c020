//! Delimited flat-file export of the display table.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use ::csv::{QuoteStyle, WriterBuilder};
use solar_core::calculations::DisplayTable;
use tracing::info;

use crate::ReportError;

pub const SEPARATOR: u8 = b',';

/// Writes the header row and one row per year.
///
/// Money cells contain the decimal comma of the es-CO format, so any field
/// containing the separator is quoted.
pub fn write<W: Write>(
    table: &DisplayTable,
    writer: W,
) -> Result<(), ReportError> {
    let mut wtr = WriterBuilder::new()
        .delimiter(SEPARATOR)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer);

    wtr.write_record(table.headers())?;
    for row in table.formatted_rows() {
        wtr.write_record(&row)?;
    }
    wtr.flush().map_err(|e| ReportError::Csv(e.to_string()))?;
    Ok(())
}

pub fn write_file(
    table: &DisplayTable,
    path: &Path,
) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write(table, file)?;
    info!(path = %path.display(), rows = table.rows.len(), "CSV exported");
    Ok(())
}

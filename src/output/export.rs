//! Export of discovered URLs to a newline-delimited text file

use crate::output::{ExportError, ExportResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default file name used when exporting without an explicit path
pub const DEFAULT_EXPORT_PATH: &str = "endpoints.txt";

/// Writes one URL per line to `path`, replacing any existing file
///
/// # Returns
///
/// * `Ok(usize)` - Number of URLs written
/// * `Err(ExportError)` - The file could not be created or written
pub fn export_results(results: &[String], path: &Path) -> ExportResult<usize> {
    let file = File::create(path).map_err(|e| ExportError::Create {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut writer = BufWriter::new(file);
    for url in results {
        writeln!(writer, "{}", url)?;
    }
    writer.flush()?;

    tracing::info!("Exported {} URLs to {}", results.len(), path.display());
    Ok(results.len())
}

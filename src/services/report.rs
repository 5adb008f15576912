//! CSV report of per-image processing results
//!
//! Success rows carry `image_path, output_path, status`; error rows carry
//! `image_path, status, error`. The header is the union of keys in the order
//! they are first seen across all rows, so a run whose first row failed puts
//! `error` before `output_path`. Missing cells are written empty.

use crate::error::{FundusError, Result};
use crate::types::ProcessingResult;
use std::path::Path;

pub const COLUMN_IMAGE_PATH: &str = "image_path";
pub const COLUMN_OUTPUT_PATH: &str = "output_path";
pub const COLUMN_STATUS: &str = "status";
pub const COLUMN_ERROR: &str = "error";

/// Keys present in one result row, in record order
fn row_fields(result: &ProcessingResult) -> Vec<(&'static str, String)> {
    let mut fields = vec![(COLUMN_IMAGE_PATH, result.image_path.display().to_string())];
    if let Some(output) = &result.output_path {
        fields.push((COLUMN_OUTPUT_PATH, output.display().to_string()));
    }
    fields.push((COLUMN_STATUS, result.status.to_string()));
    if let Some(failure) = &result.failure {
        fields.push((COLUMN_ERROR, failure.message.clone()));
    }
    fields
}

/// Serializes processing results as a flat CSV table
pub struct ReportWriter;

impl ReportWriter {
    /// Header in first-seen key order
    #[must_use]
    pub fn header(results: &[ProcessingResult]) -> Vec<&'static str> {
        let mut header: Vec<&'static str> = Vec::new();
        for result in results {
            for (key, _) in row_fields(result) {
                if !header.contains(&key) {
                    header.push(key);
                }
            }
        }
        header
    }

    /// Write all results to any writer
    ///
    /// An empty result list produces an empty document.
    pub fn write_to<W: std::io::Write>(results: &[ProcessingResult], writer: W) -> Result<()> {
        let header = Self::header(results);
        if header.is_empty() {
            return Ok(());
        }

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&header)?;
        for result in results {
            let fields = row_fields(result);
            let record = header.iter().map(|column| {
                fields
                    .iter()
                    .find(|(key, _)| key == column)
                    .map_or("", |(_, value)| value.as_str())
            });
            csv_writer.write_record(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write all results to `path`, replacing any previous report
    pub fn write<P: AsRef<Path>>(results: &[ProcessingResult], path: P) -> Result<()> {
        let path_ref = path.as_ref();
        let file = std::fs::File::create(path_ref)
            .map_err(|e| FundusError::file_io_error("create report", path_ref, &e))?;
        Self::write_to(results, std::io::BufWriter::new(file))
    }
}

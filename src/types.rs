//! Result types shared by the pipeline, the batch driver and the report

use crate::error::{ErrorKind, FundusError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of processing one source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Success,
    Error,
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Why an image failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingFailure {
    pub kind: ErrorKind,
    pub message: String,
}

/// One report row; immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub image_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub status: ProcessingStatus,
    pub failure: Option<ProcessingFailure>,
}

impl ProcessingResult {
    #[must_use]
    pub fn success(image_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            image_path,
            output_path: Some(output_path),
            status: ProcessingStatus::Success,
            failure: None,
        }
    }

    #[must_use]
    pub fn failure(image_path: PathBuf, error: &FundusError) -> Self {
        Self {
            image_path,
            output_path: None,
            status: ProcessingStatus::Error,
            failure: Some(ProcessingFailure {
                kind: error.kind(),
                message: error.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ProcessingStatus::Success
    }

    /// Error message for failed rows
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.failure.as_ref().map(|f| f.message.as_str())
    }
}

/// Totals of a finished batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Artifact corrections applied to written outputs
    pub corrected: usize,
    pub report_path: PathBuf,
    pub results: Vec<ProcessingResult>,
}

impl BatchSummary {
    #[must_use]
    pub fn from_results(results: Vec<ProcessingResult>, corrected: usize, report_path: PathBuf) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            corrected,
            report_path,
            results,
        }
    }
}

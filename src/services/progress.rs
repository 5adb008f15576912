//! Progress reporting service
//!
//! This module separates progress reporting concerns from the batch driver,
//! allowing different frontends to implement their own progress handling.

use crate::types::ProcessingResult;
use tracing::info;

/// Stages of the single-image pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Loading and decoding the source image
    ImageLoading,
    /// Equalizing the lightness channel
    ContrastEnhancement,
    /// Writing the PNG output
    FileSaving,
}

impl ProcessingStage {
    /// Get a human-readable description of the processing stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::ImageLoading => "Loading input image",
            ProcessingStage::ContrastEnhancement => "Enhancing contrast",
            ProcessingStage::FileSaving => "Saving result",
        }
    }
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Receives batch progress from the driver
///
/// Groups correspond to one `SUBSET/CLASS` directory.
pub trait ProgressReporter: Send + Sync {
    /// A group with `total` candidate images is about to be processed
    fn start_group(&self, subset: &str, class: &str, total: usize);

    /// One image of the current group finished
    fn report_item(&self, result: &ProcessingResult);

    /// The current group is done
    fn finish_group(&self);
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn start_group(&self, _subset: &str, _class: &str, _total: usize) {}

    fn report_item(&self, _result: &ProcessingResult) {}

    fn finish_group(&self) {}
}

/// Progress reporter that emits tracing events
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    ///
    /// With `verbose`, every processed image is logged.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn start_group(&self, subset: &str, class: &str, total: usize) {
        info!("Processing {}/{} ({} images)", subset, class, total);
    }

    fn report_item(&self, result: &ProcessingResult) {
        if self.verbose {
            info!(status = %result.status, "{}", result.image_path.display());
        }
    }

    fn finish_group(&self) {}
}

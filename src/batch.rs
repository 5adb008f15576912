//! Dataset-level batch driver
//!
//! Walks `<source>/<SUBSET>/<CLASS>/` for every configured subset and class,
//! mirrors that tree under the output root, runs the single-image pipeline
//! on each accepted file and finally writes the CSV report.

use crate::{
    config::PipelineConfig,
    error::{FundusError, Result},
    processor::FundusProcessor,
    services::{ImageIOService, NoOpProgressReporter, ProgressReporter, ReportWriter},
    types::{BatchSummary, ProcessingResult},
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Sequential batch driver over a subset/class directory layout
pub struct BatchDriver {
    config: PipelineConfig,
    processor: FundusProcessor,
    progress: Box<dyn ProgressReporter>,
}

impl BatchDriver {
    /// Create a driver; the configuration is validated here
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            processor: FundusProcessor::new(&config),
            config,
            progress: Box::new(NoOpProgressReporter),
        })
    }

    /// Replace the progress reporter
    #[must_use]
    pub fn with_progress(mut self, progress: Box<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Accepted image files directly inside `dir`
    ///
    /// A missing directory yields an empty list.
    pub fn list_images(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                FundusError::processing(format!("Failed to list {}: {}", dir.display(), e))
            })?;
            // Symlinks count when they resolve to a regular file
            if !entry.path().is_file() {
                continue;
            }
            if ImageIOService::has_extension(entry.path(), &self.config.layout.extensions) {
                files.push(entry.into_path());
            } else {
                debug!("Skipping non-image file {}", entry.path().display());
            }
        }

        if self.config.layout.sort_entries {
            files.sort();
        }
        Ok(files)
    }

    /// Process the whole tree under `source_root` into `output_root`
    ///
    /// # Errors
    /// Only failures to create the output tree, to list a directory or to
    /// write the report are returned; per-image failures become report rows.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, source_root: P, output_root: Q) -> Result<BatchSummary> {
        let source_root = source_root.as_ref();
        let output_root = output_root.as_ref();
        let started = Instant::now();

        create_dir(output_root)?;

        let layout = &self.config.layout;
        let mut results: Vec<ProcessingResult> = Vec::new();
        let mut corrected = 0usize;

        for subset in &layout.subsets {
            let subset_dir = source_root.join(subset);
            let subset_output = output_root.join(subset);
            create_dir(&subset_output)?;

            for class in &layout.classes {
                let class_dir = subset_dir.join(class);
                let class_output = subset_output.join(class);
                create_dir(&class_output)?;

                if !class_dir.is_dir() {
                    debug!("No source directory {}, skipping", class_dir.display());
                    continue;
                }

                let images = self.list_images(&class_dir)?;
                self.progress.start_group(subset, class, images.len());
                for image in &images {
                    let outcome = self.processor.process(image, &class_output);
                    if outcome.artifact_corrected {
                        corrected += 1;
                    }
                    self.progress.report_item(&outcome.result);
                    results.push(outcome.result);
                }
                self.progress.finish_group();
            }
        }

        let report_path = output_root.join(&layout.report_file_name);
        ReportWriter::write(&results, &report_path)?;

        let summary = BatchSummary::from_results(results, corrected, report_path);
        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            corrected = summary.corrected,
            elapsed_s = started.elapsed().as_secs_f64(),
            "Batch finished, report written to {}",
            summary.report_path.display()
        );
        if summary.failed > 0 {
            warn!("{} of {} images failed", summary.failed, summary.total);
        }
        Ok(summary)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .map_err(|e| FundusError::file_io_error("create output directory", path, &e))
}

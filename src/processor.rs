//! Single-image fundus pipeline
//!
//! `FundusProcessor` runs load → contrast enhancement → background removal
//! → PNG write → artifact verification for one file. Failures travel as
//! `FundusError` values and are folded into a `ProcessingResult` only at the
//! end, so one bad image never stops a batch.

use crate::{
    config::PipelineConfig,
    enhance::ContrastEnhancer,
    error::Result,
    mask::BackgroundRemover,
    services::{ImageIOService, ProcessingStage},
    types::ProcessingResult,
    verify::ArtifactVerifier,
};
use image::{RgbImage, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

/// Everything the batch driver needs to know about one file
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub result: ProcessingResult,
    /// Stage that failed, for error rows
    pub failed_stage: Option<ProcessingStage>,
    /// Whether the verifier rewrote the output
    pub artifact_corrected: bool,
}

/// Runs the fixed per-image stage sequence
#[derive(Debug, Clone, Default)]
pub struct FundusProcessor {
    enhancer: ContrastEnhancer,
    remover: BackgroundRemover,
    verifier: ArtifactVerifier,
}

impl FundusProcessor {
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            enhancer: ContrastEnhancer::new(config.enhancement.clone()),
            remover: BackgroundRemover::new(config.mask.clone()),
            verifier: ArtifactVerifier::new(config.verifier.clone()),
        }
    }

    /// In-memory part of the pipeline: enhance, then remove the background
    pub fn process_image(&self, image: &RgbImage) -> Result<RgbaImage> {
        let enhanced = self.enhancer.enhance(image)?;
        Ok(self.remover.remove_background(&enhanced))
    }

    /// Process `source` into `output_dir/<stem>.png`
    ///
    /// Never fails: errors become an error-status result and are logged.
    #[instrument(level = "debug", skip(self), fields(source = %source.display()))]
    pub fn process(&self, source: &Path, output_dir: &Path) -> FileOutcome {
        match self.try_process(source, output_dir) {
            Ok((output_path, artifact_corrected)) => {
                debug!(output = %output_path.display(), artifact_corrected, "processed");
                FileOutcome {
                    result: ProcessingResult::success(source.to_path_buf(), output_path),
                    failed_stage: None,
                    artifact_corrected,
                }
            },
            Err((stage, e)) => {
                error!(stage = %stage, "Error processing {}: {}", source.display(), e);
                FileOutcome {
                    result: ProcessingResult::failure(source.to_path_buf(), &e),
                    failed_stage: Some(stage),
                    artifact_corrected: false,
                }
            },
        }
    }

    /// Same as [`process`](Self::process), keeping only the report row
    pub fn process_file(&self, source: &Path, output_dir: &Path) -> ProcessingResult {
        self.process(source, output_dir).result
    }

    fn try_process(
        &self,
        source: &Path,
        output_dir: &Path,
    ) -> std::result::Result<(PathBuf, bool), (ProcessingStage, crate::FundusError)> {
        let image = ImageIOService::load_rgb(source).map_err(|e| (ProcessingStage::ImageLoading, e))?;

        let enhanced = self
            .enhancer
            .enhance(&image)
            .map_err(|e| (ProcessingStage::ContrastEnhancement, e))?;
        let composited = self.remover.remove_background(&enhanced);

        let output_path = ImageIOService::output_path_in(source, output_dir);
        ImageIOService::save_png(&composited, &output_path)
            .map_err(|e| (ProcessingStage::FileSaving, e))?;

        let corrected = self.verifier.verify(&output_path);
        Ok((output_path, corrected))
    }
}

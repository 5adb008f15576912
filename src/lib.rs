#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Fundus Preprocessing Library
//!
//! Batch preprocessing of fundus (retinal) photographs: color-preserving
//! local contrast enhancement, removal of the dark camera surround, and
//! transparent PNG output with a CSV report of every processed file.
//!
//! ## Pipeline
//!
//! For every image the stages run in a fixed order:
//!
//! 1. **Contrast enhancement**: CLAHE on the L\* channel of L\*a\*b\*
//!    (clip limit 1.5, 8x8 tiles), chrominance untouched.
//! 2. **Background removal**: gray threshold at 20, 3x3 opening twice,
//!    largest outer contour (> 100 px²) filled into the alpha channel.
//! 3. **Write** as `<stem>.png` with alpha.
//! 4. **Artifact verification**: near-white opaque pixels in the top-left
//!    50x50 window of the written file are made transparent.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fundus_prep::{BatchDriver, PipelineConfig};
//!
//! # fn example() -> fundus_prep::Result<()> {
//! let driver = BatchDriver::new(PipelineConfig::default())?;
//! let summary = driver.run("DEEPDRID", "DEEPDRID_PREPROCESSED")?;
//! println!("{} ok, {} failed", summary.succeeded, summary.failed);
//! # Ok(())
//! # }
//! ```
//!
//! Single images can be processed in memory:
//!
//! ```rust,no_run
//! use fundus_prep::FundusProcessor;
//!
//! # fn example(photo: image::RgbImage) -> fundus_prep::Result<()> {
//! let rgba = FundusProcessor::default().process_image(&photo)?;
//! rgba.save("eye.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): the `fundus-prep` binary, progress bars and tracing
//!   subscriber setup

pub mod batch;
pub mod clahe;
#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod enhance;
pub mod error;
pub mod mask;
pub mod processor;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;
pub mod verify;

// Public API exports
pub use batch::BatchDriver;
pub use config::{
    EnhancementConfig, LayoutConfig, MaskConfig, PipelineConfig, PipelineConfigBuilder,
    VerifierConfig,
};
pub use enhance::ContrastEnhancer;
pub use error::{ErrorKind, FundusError, Result};
pub use mask::{BackgroundRemover, ForegroundMask};
pub use processor::{FileOutcome, FundusProcessor};
pub use services::{
    ConsoleProgressReporter, ImageIOService, NoOpProgressReporter, ProcessingStage,
    ProgressReporter, ReportWriter,
};
pub use types::{BatchSummary, ProcessingFailure, ProcessingResult, ProcessingStatus};
pub use verify::ArtifactVerifier;

#[cfg(feature = "cli")]
pub use tracing_config::{TracingConfig, TracingFormat};

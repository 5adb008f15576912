//! Service layer
//!
//! Infrastructure concerns (file I/O, reporting, progress) kept apart from
//! the image transformations.

pub mod io;
pub mod progress;
pub mod report;

pub use io::{ImageIOService, OUTPUT_EXTENSION};
pub use progress::{
    ConsoleProgressReporter, NoOpProgressReporter, ProcessingStage, ProgressReporter,
};
pub use report::ReportWriter;

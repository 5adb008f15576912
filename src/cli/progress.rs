//! Progress bars for batch runs
//!
//! One bar per `SUBSET/CLASS` directory, labelled the way the directory is.
//! Failures are counted in the bar message; the error details themselves
//! go through the tracing log once.

use crate::{services::ProgressReporter, types::ProcessingResult};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

#[derive(Default)]
struct GroupState {
    bar: Option<ProgressBar>,
    failed: usize,
}

/// `ProgressReporter` backed by `indicatif` bars
#[derive(Default)]
pub struct IndicatifProgressReporter {
    current: Mutex<GroupState>,
}

impl IndicatifProgressReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:>12} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    }

    /// Message shown after the counter
    fn status_message(name: &str, failed: usize) -> String {
        if failed == 0 {
            name.to_string()
        } else {
            format!("{} ({} failed)", name, failed)
        }
    }
}

impl ProgressReporter for IndicatifProgressReporter {
    fn start_group(&self, subset: &str, class: &str, total: usize) {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(Self::style());
        bar.set_prefix(format!("{}/{}", subset, class));
        if let Ok(mut state) = self.current.lock() {
            if let Some(previous) = state.bar.replace(bar) {
                previous.finish();
            }
            state.failed = 0;
        }
    }

    fn report_item(&self, result: &ProcessingResult) {
        let name = result
            .image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Ok(mut state) = self.current.lock() {
            if !result.is_success() {
                state.failed += 1;
            }
            if let Some(bar) = state.bar.as_ref() {
                bar.set_message(Self::status_message(&name, state.failed));
                bar.inc(1);
            }
        }
    }

    fn finish_group(&self) {
        if let Ok(mut state) = self.current.lock() {
            let failed = state.failed;
            if let Some(bar) = state.bar.take() {
                bar.finish_with_message(Self::status_message("done", failed));
            }
        }
    }
}

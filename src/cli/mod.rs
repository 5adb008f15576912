//! CLI module for the fundus-prep library
//!
//! This module is only available when the "cli" feature is enabled.

#[path = "main.rs"]
mod main_impl;
mod progress;

pub use main_impl::{main, Cli};
pub use progress::IndicatifProgressReporter;

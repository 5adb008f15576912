//! Configuration types for fundus preprocessing
//!
//! Every constant of the pipeline lives here. The defaults reproduce the
//! reference behavior exactly; tests and the CLI may override them.

use crate::error::{FundusError, Result};
use serde::{Deserialize, Serialize};

/// Local contrast enhancement parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementConfig {
    /// CLAHE clip limit, relative to a uniform histogram
    pub clip_limit: f32,
    /// Number of tiles along the x axis
    pub tiles_x: u32,
    /// Number of tiles along the y axis
    pub tiles_y: u32,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            clip_limit: 1.5,
            tiles_x: 8,
            tiles_y: 8,
        }
    }
}

/// Foreground segmentation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// Gray levels at or below this value are background
    pub threshold: u8,
    /// Radius of the square structuring element (1 = 3x3)
    pub kernel_radius: u8,
    /// Number of erosions followed by the same number of dilations
    pub open_iterations: u8,
    /// Minimum polygon area (square pixels) of the kept contour, exclusive
    pub min_contour_area: f64,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            threshold: 20,
            kernel_radius: 1,
            open_iterations: 2,
            min_contour_area: 100.0,
        }
    }
}

/// Corner artifact check parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Side length of the inspected top-left window
    pub window: u32,
    /// Color channels must all exceed this value
    pub white_threshold: u8,
    /// Alpha must exceed this value
    pub alpha_threshold: u8,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            window: 50,
            white_threshold: 240,
            alpha_threshold: 240,
        }
    }
}

/// Dataset directory layout and output naming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Subset directories, processed in this order
    pub subsets: Vec<String>,
    /// Class directories inside every subset, processed in this order
    pub classes: Vec<String>,
    /// Accepted source extensions (compared case-insensitively, no dot)
    pub extensions: Vec<String>,
    /// Report file name, written at the output root
    pub report_file_name: String,
    /// Sort directory listings lexically before processing
    pub sort_entries: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            subsets: vec!["TRAIN".into(), "TEST".into(), "VAL".into()],
            classes: vec!["0".into(), "1".into()],
            extensions: vec!["png".into(), "jpg".into(), "jpeg".into()],
            report_file_name: "preprocessing_results.csv".into(),
            sort_entries: true,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub enhancement: EnhancementConfig,
    pub mask: MaskConfig,
    pub verifier: VerifierConfig,
    pub layout: LayoutConfig,
}

impl PipelineConfig {
    /// Create a new configuration builder
    ///
    /// ```rust
    /// use fundus_prep::PipelineConfig;
    ///
    /// let config = PipelineConfig::builder()
    ///     .threshold(30)
    ///     .subsets(["TRAIN"])
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.mask.threshold, 30);
    /// ```
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Parse a (possibly partial) JSON configuration; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FundusError::invalid_config(format!("Malformed configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Non-positive or non-finite clip limit
    /// - Zero tile count on either axis
    /// - Zero verifier window
    /// - Empty subset, class or extension lists
    pub fn validate(&self) -> Result<()> {
        let e = &self.enhancement;
        if !(e.clip_limit.is_finite() && e.clip_limit > 0.0) {
            return Err(FundusError::config_value_error(
                "clip limit",
                e.clip_limit,
                "> 0",
            ));
        }
        if e.tiles_x == 0 || e.tiles_y == 0 {
            return Err(FundusError::config_value_error(
                "tile grid",
                format!("{}x{}", e.tiles_x, e.tiles_y),
                ">= 1x1",
            ));
        }
        if !self.mask.min_contour_area.is_finite() {
            return Err(FundusError::config_value_error(
                "minimum contour area",
                self.mask.min_contour_area,
                "finite",
            ));
        }
        if self.verifier.window == 0 {
            return Err(FundusError::config_value_error(
                "verifier window",
                0,
                ">= 1",
            ));
        }

        let layout = &self.layout;
        if layout.subsets.is_empty() || layout.classes.is_empty() {
            return Err(FundusError::invalid_config(
                "Layout needs at least one subset and one class",
            ));
        }
        if layout.extensions.is_empty() {
            return Err(FundusError::invalid_config(
                "Layout needs at least one accepted extension",
            ));
        }
        if layout.report_file_name.trim().is_empty() {
            return Err(FundusError::invalid_config("Report file name is empty"));
        }

        Ok(())
    }
}

/// Builder for `PipelineConfig`
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the CLAHE clip limit
    #[must_use]
    pub fn clip_limit(mut self, clip_limit: f32) -> Self {
        self.config.enhancement.clip_limit = clip_limit;
        self
    }

    /// Set the CLAHE tile grid
    #[must_use]
    pub fn tile_grid(mut self, tiles_x: u32, tiles_y: u32) -> Self {
        self.config.enhancement.tiles_x = tiles_x;
        self.config.enhancement.tiles_y = tiles_y;
        self
    }

    /// Set the background threshold
    #[must_use]
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.config.mask.threshold = threshold;
        self
    }

    /// Set the number of opening iterations
    #[must_use]
    pub fn open_iterations(mut self, iterations: u8) -> Self {
        self.config.mask.open_iterations = iterations;
        self
    }

    /// Set the minimum contour area
    #[must_use]
    pub fn min_contour_area(mut self, area: f64) -> Self {
        self.config.mask.min_contour_area = area;
        self
    }

    /// Set the verifier window side length
    #[must_use]
    pub fn verifier_window(mut self, window: u32) -> Self {
        self.config.verifier.window = window;
        self
    }

    /// Set the subset directory names
    #[must_use]
    pub fn subsets<I, S>(mut self, subsets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.layout.subsets = subsets.into_iter().map(Into::into).collect();
        self
    }

    /// Set the class directory names
    #[must_use]
    pub fn classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.layout.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the accepted source extensions
    #[must_use]
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.layout.extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Set the report file name
    #[must_use]
    pub fn report_file_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.layout.report_file_name = name.into();
        self
    }

    /// Enable or disable lexical sorting of directory listings
    #[must_use]
    pub fn sort_entries(mut self, sort: bool) -> Self {
        self.config.layout.sort_entries = sort;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = PipelineConfig::default();
        assert!((config.enhancement.clip_limit - 1.5).abs() < f32::EPSILON);
        assert_eq!((config.enhancement.tiles_x, config.enhancement.tiles_y), (8, 8));
        assert_eq!(config.mask.threshold, 20);
        assert_eq!(config.mask.kernel_radius, 1);
        assert_eq!(config.mask.open_iterations, 2);
        assert!((config.mask.min_contour_area - 100.0).abs() < f64::EPSILON);
        assert_eq!(config.verifier.window, 50);
        assert_eq!(config.layout.subsets, vec!["TRAIN", "TEST", "VAL"]);
        assert_eq!(config.layout.classes, vec!["0", "1"]);
        assert_eq!(config.layout.report_file_name, "preprocessing_results.csv");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_validation() {
        assert!(PipelineConfig::builder().clip_limit(0.0).build().is_err());
        assert!(PipelineConfig::builder().clip_limit(f32::NAN).build().is_err());
        assert!(PipelineConfig::builder().tile_grid(0, 8).build().is_err());
        assert!(PipelineConfig::builder().verifier_window(0).build().is_err());
        assert!(PipelineConfig::builder()
            .subsets(Vec::<String>::new())
            .build()
            .is_err());

        let err = PipelineConfig::builder()
            .clip_limit(-2.0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("clip limit"));
    }

    #[test]
    fn test_builder_normalizes_extensions() {
        let config = PipelineConfig::builder()
            .extensions([".PNG", "Tif"])
            .build()
            .unwrap();
        assert_eq!(config.layout.extensions, vec!["png", "tif"]);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            PipelineConfig::from_json(r#"{ "mask": { "threshold": 35 }, "layout": { "subsets": ["A"] } }"#)
                .unwrap();
        assert_eq!(config.mask.threshold, 35);
        assert_eq!(config.mask.open_iterations, 2);
        assert_eq!(config.layout.subsets, vec!["A"]);
        assert_eq!(config.layout.classes, vec!["0", "1"]);
        assert_eq!(config.enhancement, EnhancementConfig::default());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(PipelineConfig::from_json("{ not json").is_err());
        assert!(PipelineConfig::from_json(r#"{ "enhancement": { "tiles_x": 0 } }"#).is_err());
    }
}

//! Color-preserving local contrast enhancement
//!
//! Only the lightness plane of L*a*b* is equalized, so hue and saturation of
//! the retina are left alone while vessels and lesions gain local contrast.

use crate::{
    clahe::clahe,
    color::{merge_lab, split_lab},
    config::EnhancementConfig,
    error::{FundusError, Result},
};
use image::{GrayImage, RgbImage};
use tracing::{instrument, trace};

/// Applies CLAHE to the lightness channel of RGB images
#[derive(Debug, Clone, Default)]
pub struct ContrastEnhancer {
    config: EnhancementConfig,
}

impl ContrastEnhancer {
    #[must_use]
    pub fn new(config: EnhancementConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EnhancementConfig {
        &self.config
    }

    /// Enhance `image`, returning a new image of identical shape
    #[instrument(level = "debug", skip_all, fields(width = image.width(), height = image.height()))]
    pub fn enhance(&self, image: &RgbImage) -> Result<RgbImage> {
        let (width, height) = image.dimensions();
        let [l, a, b] = split_lab(image);

        let lightness = GrayImage::from_raw(width, height, l).ok_or_else(|| {
            FundusError::processing_stage_error("contrast enhancement", "lightness plane size mismatch")
        })?;
        let equalized = clahe(
            &lightness,
            self.config.clip_limit,
            self.config.tiles_x,
            self.config.tiles_y,
        )?;
        trace!("lightness plane equalized");

        Ok(merge_lab(width, height, equalized.as_raw(), &a, &b))
    }
}

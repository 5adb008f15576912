//! Corner artifact correction for written outputs
//!
//! Masking occasionally leaves a bright, fully opaque speckle in the
//! top-left corner (a camera border artifact outside the retina contour).
//! The verifier clears such pixels directly in the written file.

use crate::config::VerifierConfig;
use crate::error::Result;
use crate::services::ImageIOService;
use image::Rgba;
use std::path::Path;
use tracing::{debug, info};

const CLEARED: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Checks written RGBA outputs for corner artifacts
#[derive(Debug, Clone, Default)]
pub struct ArtifactVerifier {
    config: VerifierConfig,
}

impl ArtifactVerifier {
    #[must_use]
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    /// Clear near-white opaque pixels in the top-left window of `path`
    ///
    /// Returns `true` when at least one pixel was cleared and the file was
    /// rewritten. Unreadable files and images without alpha report `false`
    /// and are left untouched.
    pub fn verify<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        match self.try_verify(path) {
            Ok(corrected) => corrected,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "verification skipped");
                false
            },
        }
    }

    fn try_verify(&self, path: &Path) -> Result<bool> {
        let image = ImageIOService::load_any(path)?;
        if !image.color().has_alpha() {
            return Ok(false);
        }

        let mut rgba = image.to_rgba8();
        let check_w = self.config.window.min(rgba.width());
        let check_h = self.config.window.min(rgba.height());
        let white = self.config.white_threshold;
        let opaque = self.config.alpha_threshold;

        let mut cleared = 0usize;
        for y in 0..check_h {
            for x in 0..check_w {
                let pixel = rgba.get_pixel_mut(x, y);
                let [r, g, b, a] = pixel.0;
                if r > white && g > white && b > white && a > opaque {
                    *pixel = CLEARED;
                    cleared += 1;
                }
            }
        }

        if cleared == 0 {
            return Ok(false);
        }

        ImageIOService::save_png(&rgba, path)?;
        info!(path = %path.display(), pixels = cleared, "cleared corner artifact");
        Ok(true)
    }
}

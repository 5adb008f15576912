//! Image I/O operations service
//!
//! This module separates file I/O operations from the image transformations,
//! keeping the enhancer and remover free of filesystem concerns.

use crate::error::{FundusError, Result};
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension written for every output, whatever the source format
pub const OUTPUT_EXTENSION: &str = "png";

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Decode any image, first by extension, then by content sniffing
    ///
    /// # Errors
    /// `FundusError::Load` when the file is missing, empty or undecodable.
    pub fn load_any<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        let data = std::fs::read(path_ref)
            .map_err(|e| FundusError::load(path_ref, format!("cannot read file: {}", e)))?;
        if data.is_empty() {
            return Err(FundusError::load(path_ref, "file is empty"));
        }

        let by_extension = ImageFormat::from_path(path_ref)
            .ok()
            .map(|format| image::load_from_memory_with_format(&data, format));

        match by_extension {
            Some(Ok(img)) => Ok(img),
            other => {
                if let Some(Err(e)) = &other {
                    debug!(
                        "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                        path_ref.display(),
                        e
                    );
                }
                ImageReader::new(std::io::Cursor::new(&data))
                    .with_guessed_format()
                    .map_err(|e| FundusError::load(path_ref, e.to_string()))?
                    .decode()
                    .map_err(|e| {
                        FundusError::load(
                            path_ref,
                            format!("not a decodable image ({} bytes): {}", data.len(), e),
                        )
                    })
            },
        }
    }

    /// Load a source photograph as 8-bit RGB
    pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
        Ok(Self::load_any(path)?.to_rgb8())
    }

    /// Save an RGBA image as PNG, creating the parent directory if needed
    pub fn save_png<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    FundusError::file_io_error("create output directory", parent, &e)
                })?;
            }
        }

        image
            .save_with_format(path_ref, ImageFormat::Png)
            .map_err(|e| {
                FundusError::processing_stage_error(
                    "image save",
                    &format!("Failed to save PNG '{}': {}", path_ref.display(), e),
                )
            })
    }

    /// Check whether `path` has one of `extensions` (case-insensitive, no dot)
    pub fn has_extension<P: AsRef<Path>, S: AsRef<str>>(path: P, extensions: &[S]) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                extensions
                    .iter()
                    .any(|allowed| allowed.as_ref().trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }

    /// `<output_dir>/<source stem>.png`
    #[must_use]
    pub fn output_path_in(source: &Path, output_dir: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map_or_else(|| "output".into(), |s| s.to_string_lossy().into_owned());
        output_dir.join(format!("{}.{}", stem, OUTPUT_EXTENSION))
    }
}

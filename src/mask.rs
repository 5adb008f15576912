//! Foreground segmentation and alpha compositing
//!
//! Fundus cameras record the retina as a bright disc on a near-black
//! surround. The mask keeps the single largest bright region (including any
//! dark holes inside it, such as vessels crossing the border) and everything
//! else becomes transparent.

use crate::config::MaskConfig;
use image::{GrayImage, Luma, Rgba, RgbImage, RgbaImage};
use imageproc::{
    contours::{find_contours, BorderType, Contour},
    distance_transform::Norm,
    drawing::draw_polygon_mut,
    morphology::open,
    point::Point,
};
use tracing::{debug, instrument};

const FOREGROUND: u8 = 255;
const BACKGROUND: u8 = 0;

/// Binary single-channel foreground mask (0 or 255)
#[derive(Debug, Clone, PartialEq)]
pub struct ForegroundMask {
    mask: GrayImage,
    area: f64,
}

impl ForegroundMask {
    /// The mask pixels
    #[must_use]
    pub fn as_image(&self) -> &GrayImage {
        &self.mask
    }

    #[must_use]
    pub fn into_image(self) -> GrayImage {
        self.mask
    }

    /// Polygon area of the kept contour, 0 when nothing was kept
    #[must_use]
    pub fn contour_area(&self) -> f64 {
        self.area
    }

    /// Whether no foreground was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mask.pixels().all(|p| p[0] == BACKGROUND)
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.mask.dimensions()
    }
}

/// Grayscale conversion with ITU-R BT.601 luma weights
#[must_use]
pub fn to_gray(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let luma = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Shoelace area of a closed contour through pixel centers
#[must_use]
pub fn contour_area(points: &[Point<u32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(p, q)| f64::from(p.x) * f64::from(q.y) - f64::from(q.x) * f64::from(p.y))
        .sum();
    twice.abs() / 2.0
}

/// Largest outermost contour; ties go to the first found in raster order
fn largest_external_contour(contours: &[Contour<u32>]) -> Option<(&Contour<u32>, f64)> {
    let mut best: Option<(&Contour<u32>, f64)> = None;
    for contour in contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
    {
        let area = contour_area(&contour.points);
        if best.map_or(true, |(_, best_area)| area > best_area) {
            best = Some((contour, area));
        }
    }
    best
}

/// Copy of `mask` inside a one-pixel background frame
///
/// `find_contours` only reports an outer border for regions it can reach
/// from background, so foreground touching the image edge needs the frame.
fn pad_with_background(mask: &GrayImage) -> GrayImage {
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    image::imageops::replace(&mut padded, mask, 1, 1);
    padded
}

/// Fill a contour found on the padded mask into the unpadded `mask`
fn fill_contour(mask: &mut GrayImage, contour: &Contour<u32>) {
    let points: Vec<Point<u32>> = contour
        .points
        .iter()
        .map(|p| Point::new(p.x.saturating_sub(1), p.y.saturating_sub(1)))
        .collect();

    let mut polygon: Vec<Point<i32>> = points
        .iter()
        .map(|p| Point::new(p.x as i32, p.y as i32))
        .collect();
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    if polygon.len() >= 3 {
        draw_polygon_mut(mask, &polygon, Luma([FOREGROUND]));
    }
    // The boundary itself belongs to the region
    for p in &points {
        if p.x < mask.width() && p.y < mask.height() {
            mask.put_pixel(p.x, p.y, Luma([FOREGROUND]));
        }
    }
}

/// Removes the dark surround of fundus photographs
#[derive(Debug, Clone, Default)]
pub struct BackgroundRemover {
    config: MaskConfig,
}

impl BackgroundRemover {
    #[must_use]
    pub fn new(config: MaskConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &MaskConfig {
        &self.config
    }

    /// Binary threshold followed by morphological opening
    #[must_use]
    pub fn binarize(&self, image: &RgbImage) -> GrayImage {
        let gray = to_gray(image);
        let threshold = self.config.threshold;
        let binary = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            if gray.get_pixel(x, y)[0] > threshold {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        });

        let radius = self.config.kernel_radius.saturating_mul(self.config.open_iterations);
        if radius == 0 {
            binary
        } else {
            open(&binary, Norm::LInf, radius)
        }
    }

    /// Compute the foreground mask of `image`
    #[instrument(level = "debug", skip_all, fields(width = image.width(), height = image.height()))]
    pub fn compute_mask(&self, image: &RgbImage) -> ForegroundMask {
        let cleaned = self.binarize(image);
        let contours = find_contours::<u32>(&pad_with_background(&cleaned));
        let mut mask = GrayImage::new(image.width(), image.height());

        let area = match largest_external_contour(&contours) {
            Some((contour, area)) if area > self.config.min_contour_area => {
                fill_contour(&mut mask, contour);
                debug!(contours = contours.len(), area, "kept largest contour");
                area
            },
            Some((_, area)) => {
                debug!(area, "largest contour below minimum area, mask left empty");
                0.0
            },
            None => {
                debug!("no foreground contour found");
                0.0
            },
        };

        ForegroundMask { mask, area }
    }

    /// Produce an RGBA image whose alpha channel is the foreground mask
    pub fn remove_background(&self, image: &RgbImage) -> RgbaImage {
        let mask = self.compute_mask(image);
        apply_mask(image, &mask)
    }
}

/// Expand `image` to RGBA using `mask` as alpha
#[must_use]
pub fn apply_mask(image: &RgbImage, mask: &ForegroundMask) -> RgbaImage {
    let alpha = mask.as_image();
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        Rgba([r, g, b, alpha.get_pixel(x, y)[0]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::{
        drawing::draw_filled_circle_mut,
        region_labelling::{connected_components, Connectivity},
    };

    fn dark_canvas(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([5, 4, 3]))
    }

    fn region_count(mask: &GrayImage) -> u32 {
        let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));
        labels.pixels().map(|p| p[0]).max().unwrap_or(0)
    }

    #[test]
    fn test_gray_weights() {
        let image = RgbImage::from_fn(3, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        });
        let gray = to_gray(&image);
        assert_eq!(gray.get_pixel(0, 0)[0], 76);
        assert_eq!(gray.get_pixel(1, 0)[0], 150);
        assert_eq!(gray.get_pixel(2, 0)[0], 29);
    }

    #[test]
    fn test_contour_area_of_square() {
        let square = [
            Point::new(0u32, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        assert!((contour_area(&square) - 100.0).abs() < f64::EPSILON);
        assert!(contour_area(&square[..2]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_all_dark_image_is_fully_transparent() {
        let out = BackgroundRemover::default().remove_background(&dark_canvas(80, 60));
        assert_eq!(out.dimensions(), (80, 60));
        assert!(out.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // Gray level exactly 20 is background
        let image = RgbImage::from_pixel(40, 40, Rgb([20, 20, 20]));
        let out = BackgroundRemover::default().remove_background(&image);
        assert!(out.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_disc_becomes_opaque_surround_transparent() {
        let mut image = dark_canvas(100, 100);
        draw_filled_circle_mut(&mut image, (50, 50), 30, Rgb([200, 90, 40]));

        let remover = BackgroundRemover::default();
        let mask = remover.compute_mask(&image);
        assert!(mask.contour_area() > 2000.0);

        let out = apply_mask(&image, &mask);
        assert_eq!(out.dimensions(), (100, 100));
        assert_eq!(out.get_pixel(50, 50).0, [200, 90, 40, 255]);
        assert_eq!(out.get_pixel(2, 2)[3], 0);
        assert_eq!(out.get_pixel(97, 50)[3], 0);
        // Color channels are untouched even where transparent
        assert_eq!(out.get_pixel(2, 2).0[..3], [5, 4, 3]);
    }

    #[test]
    fn test_only_largest_region_is_kept() {
        let mut image = dark_canvas(160, 100);
        draw_filled_circle_mut(&mut image, (50, 50), 30, Rgb([200, 90, 40]));
        draw_filled_circle_mut(&mut image, (130, 50), 15, Rgb([220, 120, 60]));

        let mask = BackgroundRemover::default().compute_mask(&image);
        assert_eq!(mask.as_image().get_pixel(50, 50)[0], 255);
        assert_eq!(mask.as_image().get_pixel(130, 50)[0], 0);
        assert_eq!(region_count(mask.as_image()), 1);
    }

    #[test]
    fn test_holes_inside_the_disc_are_filled() {
        let mut image = dark_canvas(100, 100);
        draw_filled_circle_mut(&mut image, (50, 50), 35, Rgb([200, 90, 40]));
        draw_filled_circle_mut(&mut image, (50, 50), 8, Rgb([0, 0, 0]));

        let mask = BackgroundRemover::default().compute_mask(&image);
        assert_eq!(mask.as_image().get_pixel(50, 50)[0], 255);
        assert_eq!(region_count(mask.as_image()), 1);
    }

    #[test]
    fn test_small_regions_are_discarded() {
        let mut image = dark_canvas(60, 60);
        // 9x9 block survives the opening but has area 64 < 100
        for y in 20..29 {
            for x in 20..29 {
                image.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        let remover = BackgroundRemover::default();
        let mask = remover.compute_mask(&image);
        assert!(mask.is_empty());
        assert!(mask.contour_area().abs() < f64::EPSILON);
    }

    #[test]
    fn test_equal_areas_keep_first_in_scan_order() {
        let mut image = dark_canvas(120, 60);
        draw_filled_circle_mut(&mut image, (30, 30), 15, Rgb([200, 200, 200]));
        draw_filled_circle_mut(&mut image, (90, 30), 15, Rgb([200, 200, 200]));

        let mask = BackgroundRemover::default().compute_mask(&image);
        assert_eq!(mask.as_image().get_pixel(30, 30)[0], 255);
        assert_eq!(mask.as_image().get_pixel(90, 30)[0], 0);
    }

    fn bright_rect(image: &mut RgbImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) {
        for y in ys {
            for x in xs.clone() {
                image.put_pixel(x, y, Rgb([200, 120, 60]));
            }
        }
    }

    fn opaque_count(mask: &ForegroundMask) -> usize {
        mask.as_image().pixels().filter(|p| p[0] == FOREGROUND).count()
    }

    #[test]
    fn test_region_touching_left_edge_is_kept() {
        let mut image = dark_canvas(60, 40);
        bright_rect(&mut image, 0..29, 5..35);

        let mask = BackgroundRemover::default().compute_mask(&image);
        assert_eq!(opaque_count(&mask), 29 * 30);
        assert_eq!(mask.as_image().get_pixel(0, 20)[0], 255);
        assert_eq!(mask.as_image().get_pixel(40, 20)[0], 0);
        assert!((mask.contour_area() - 28.0 * 29.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_region_in_top_left_corner_is_kept() {
        let mut image = dark_canvas(60, 40);
        bright_rect(&mut image, 0..30, 0..20);

        let mask = BackgroundRemover::default().compute_mask(&image);
        assert_eq!(opaque_count(&mask), 600);
        assert_eq!(mask.as_image().get_pixel(0, 0)[0], 255);
        assert_eq!(region_count(mask.as_image()), 1);
    }

    #[test]
    fn test_disc_cut_by_left_and_right_edges_is_kept() {
        let mut image = dark_canvas(60, 40);
        draw_filled_circle_mut(&mut image, (30, 20), 34, Rgb([200, 90, 40]));
        let out = BackgroundRemover::default().remove_background(&image);

        assert_eq!(out.get_pixel(0, 20)[3], 255);
        assert_eq!(out.get_pixel(59, 20)[3], 255);
        assert_eq!(out.get_pixel(30, 20)[3], 255);
    }

    #[test]
    fn test_full_bright_frame_is_fully_opaque() {
        let image = RgbImage::from_pixel(40, 30, Rgb([230, 230, 230]));
        let mask = BackgroundRemover::default().compute_mask(&image);
        assert_eq!(opaque_count(&mask), 40 * 30);
        assert!((mask.contour_area() - 39.0 * 29.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_speckle_removed_by_opening() {
        let mut image = dark_canvas(50, 50);
        image.put_pixel(10, 10, Rgb([255, 255, 255]));
        image.put_pixel(11, 10, Rgb([255, 255, 255]));
        let binary = BackgroundRemover::default().binarize(&image);
        assert!(binary.pixels().all(|p| p[0] == 0));
    }
}

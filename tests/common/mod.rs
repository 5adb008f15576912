//! Shared helpers for integration tests: synthetic fundus photographs and
//! dataset trees.

#![allow(dead_code)]

use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use std::fs;
use std::path::{Path, PathBuf};

/// Dark frame with a bright reddish disc, the way a retina photo looks
pub fn synthetic_fundus(width: u32, height: u32) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, Rgb([5, 4, 3]));
    let radius = (width.min(height) / 2).saturating_sub(6) as i32;
    let center = ((width / 2) as i32, (height / 2) as i32);
    draw_filled_circle_mut(&mut image, center, radius, Rgb([180, 90, 40]));
    // Vessel-like darker stripe inside the disc
    for x in (width / 4)..(3 * width / 4) {
        for dy in 0..3 {
            image.put_pixel(x, height / 2 + dy, Rgb([120, 40, 20]));
        }
    }
    image
}

/// Wide-field photo whose disc is cut by the left and right frame edges
pub fn edge_to_edge_fundus(width: u32, height: u32) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, Rgb([5, 4, 3]));
    let center = ((width / 2) as i32, (height / 2) as i32);
    draw_filled_circle_mut(&mut image, center, (width / 2 + 6) as i32, Rgb([180, 90, 40]));
    image
}

/// Write a synthetic fundus image, picking the codec from the extension
pub fn write_fundus(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create image directory");
    }
    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);
    synthetic_fundus(width, height)
        .save_with_format(path, format)
        .expect("Failed to write synthetic fundus image");
}

/// Create `root/SUBSET/CLASS` for the default layout
pub fn create_layout(root: &Path) {
    for subset in ["TRAIN", "TEST", "VAL"] {
        for class in ["0", "1"] {
            fs::create_dir_all(root.join(subset).join(class)).expect("Failed to create layout");
        }
    }
}

/// Read a CSV report into header plus rows
pub fn read_report(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open report");
    let header = reader
        .headers()
        .expect("Report has no header")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.expect("Malformed report row").iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}

/// Column value of `row` by header name
pub fn column<'a>(header: &[String], row: &'a [String], name: &str) -> &'a str {
    let index = header
        .iter()
        .position(|h| h == name)
        .unwrap_or_else(|| panic!("Missing column {}", name));
    row.get(index).map_or("", String::as_str)
}

pub fn output_for(root: &Path, subset: &str, class: &str, stem: &str) -> PathBuf {
    root.join(subset).join(class).join(format!("{}.png", stem))
}

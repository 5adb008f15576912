//! 8-bit sRGB <-> CIE L*a*b* conversion
//!
//! The colorimetry (D65 white point, sRGB transfer) comes from `palette`;
//! this module only adds the usual 8-bit encoding: `L` is scaled from 0..100
//! to 0..255, `a` and `b` are offset by 128.

use image::{Rgb, RgbImage};
use palette::{Clamp, FromColor, Lab, Srgb};

fn encode(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Convert one 8-bit sRGB pixel to 8-bit encoded L*a*b*
#[must_use]
pub fn rgb_to_lab(rgb: [u8; 3]) -> [u8; 3] {
    let srgb: Srgb<f32> = Srgb::new(rgb[0], rgb[1], rgb[2]).into_format();
    let lab: Lab = Lab::from_color(srgb.into_linear());
    [
        encode(lab.l * 255.0 / 100.0),
        encode(lab.a + 128.0),
        encode(lab.b + 128.0),
    ]
}

/// Convert one 8-bit encoded L*a*b* pixel back to 8-bit sRGB
///
/// Out-of-gamut colors are clamped to the sRGB cube.
#[must_use]
pub fn lab_to_rgb(lab: [u8; 3]) -> [u8; 3] {
    let lab: Lab = Lab::new(
        f32::from(lab[0]) * 100.0 / 255.0,
        f32::from(lab[1]) - 128.0,
        f32::from(lab[2]) - 128.0,
    );
    let rgb: Srgb<u8> = Srgb::<f32>::from_color(lab).clamp().into_format();
    [rgb.red, rgb.green, rgb.blue]
}

/// Split an RGB image into its L, a and b planes
#[must_use]
pub fn split_lab(image: &RgbImage) -> [Vec<u8>; 3] {
    let len = (image.width() * image.height()) as usize;
    let mut planes = [
        Vec::with_capacity(len),
        Vec::with_capacity(len),
        Vec::with_capacity(len),
    ];
    for pixel in image.pixels() {
        let [l, a, b] = rgb_to_lab(pixel.0);
        planes[0].push(l);
        planes[1].push(a);
        planes[2].push(b);
    }
    planes
}

/// Merge L, a and b planes back into an RGB image
///
/// All planes must hold `width * height` samples.
#[must_use]
pub fn merge_lab(width: u32, height: u32, l: &[u8], a: &[u8], b: &[u8]) -> RgbImage {
    let mut out = RgbImage::new(width, height);
    for (((pixel, &l), &a), &b) in out.pixels_mut().zip(l).zip(a).zip(b) {
        *pixel = Rgb(lab_to_rgb([l, a, b]));
    }
    out
}

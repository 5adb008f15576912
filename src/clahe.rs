//! Contrast Limited Adaptive Histogram Equalization on 8-bit planes
//!
//! The image is divided into a `tiles_x` x `tiles_y` grid. When the size is
//! not a multiple of the grid, histograms are gathered over a virtual image
//! extended on the right and bottom by reflect-101 mirroring. Every tile
//! gets a clipped, equalizing lookup table; output pixels bilinearly blend
//! the tables of the four nearest tile centers.

use crate::error::{FundusError, Result};
use image::GrayImage;

const BINS: usize = 256;

/// Mirror index into `0..len` without repeating the edge sample
fn reflect_101(i: u32, len: u32) -> u32 {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let m = i % period;
    if m < len {
        m
    } else {
        period - m
    }
}

fn clip_histogram(hist: &mut [u32; BINS], clip_limit: u32) {
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > clip_limit {
            excess += *bin - clip_limit;
            *bin = clip_limit;
        }
    }

    let batch = excess / BINS as u32;
    let mut residual = excess - batch * BINS as u32;
    for bin in hist.iter_mut() {
        *bin += batch;
    }

    if residual > 0 {
        let step = (BINS / residual as usize).max(1);
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

fn tile_lut(hist: &[u32; BINS], tile_area: u32) -> [u8; BINS] {
    let scale = 255.0_f32 / tile_area as f32;
    let mut lut = [0u8; BINS];
    let mut sum = 0u32;
    for (out, &count) in lut.iter_mut().zip(hist.iter()) {
        sum += count;
        *out = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Equalize `image` with a clip limit relative to a uniform histogram
///
/// # Errors
/// Returns `FundusError::InvalidConfig` for a zero tile count or a
/// non-positive clip limit.
pub fn clahe(image: &GrayImage, clip_limit: f32, tiles_x: u32, tiles_y: u32) -> Result<GrayImage> {
    if tiles_x == 0 || tiles_y == 0 {
        return Err(FundusError::config_value_error(
            "tile grid",
            format!("{}x{}", tiles_x, tiles_y),
            ">= 1x1",
        ));
    }
    if !(clip_limit.is_finite() && clip_limit > 0.0) {
        return Err(FundusError::config_value_error("clip limit", clip_limit, "> 0"));
    }

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Ok(image.clone());
    }

    let tile_w = width.div_ceil(tiles_x);
    let tile_h = height.div_ceil(tiles_y);
    let tile_area = tile_w * tile_h;
    let abs_clip = ((clip_limit * tile_area as f32 / BINS as f32) as u32).max(1);

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = [0u32; BINS];
            for y in ty * tile_h..(ty + 1) * tile_h {
                let sy = reflect_101(y, height);
                for x in tx * tile_w..(tx + 1) * tile_w {
                    let sx = reflect_101(x, width);
                    hist[image.get_pixel(sx, sy)[0] as usize] += 1;
                }
            }
            clip_histogram(&mut hist, abs_clip);
            luts.push(tile_lut(&hist, tile_area));
        }
    }

    let lut_at = |tx: u32, ty: u32, v: usize| f32::from(luts[(ty * tiles_x + tx) as usize][v]);

    // Tile-space coordinate of every column, shared by all rows
    let columns: Vec<(u32, u32, f32)> = (0..width)
        .map(|x| neighbor_tiles(x, tile_w, tiles_x))
        .collect();

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let (ty1, ty2, ya) = neighbor_tiles(y, tile_h, tiles_y);
        for (x, &(tx1, tx2, xa)) in columns.iter().enumerate() {
            let x = x as u32;
            let v = image.get_pixel(x, y)[0] as usize;
            let top = lut_at(tx1, ty1, v) * (1.0 - xa) + lut_at(tx2, ty1, v) * xa;
            let bottom = lut_at(tx1, ty2, v) * (1.0 - xa) + lut_at(tx2, ty2, v) * xa;
            let value = top * (1.0 - ya) + bottom * ya;
            out.put_pixel(x, y, image::Luma([value.round().clamp(0.0, 255.0) as u8]));
        }
    }

    Ok(out)
}

/// Neighboring tile indices along one axis and the weight of the second one
fn neighbor_tiles(pos: u32, tile_size: u32, tiles: u32) -> (u32, u32, f32) {
    let t = pos as f32 / tile_size as f32 - 0.5;
    let t1 = t.floor();
    let weight = t - t1;
    let first = if t1 < 0.0 { 0 } else { t1 as u32 };
    let second = ((t1 + 1.0).max(0.0) as u32).min(tiles - 1);
    (first.min(tiles - 1), second, weight)
}

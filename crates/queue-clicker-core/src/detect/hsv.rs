//! RGB to HSV conversion and color-range masking.
//!
//! `imageproc` has no HSV support, so the per-pixel conversion lives here and
//! is mapped over the frame with `imageproc::map`.
//!
//! Uses the common 8-bit convention: hue is halved to fit 0..=179, saturation
//! and value span 0..=255. Thresholds tuned in other tools that use this
//! convention carry over unchanged.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::map::map_colors;

use crate::config::{ColorRange, Hsv};

/// Mask value for pixels inside the range.
pub const MASK_ON: u8 = 255;

/// Convert one RGB pixel to 8-bit HSV.
#[must_use]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v == 0 {
        0
    } else {
        ((diff * 255) as f32 / v as f32).round() as i32
    };

    let h = if diff == 0 {
        0
    } else {
        // Position inside the color wheel in units of one 60-degree sector
        let sector = if v == r {
            g - b
        } else if v == g {
            b - r + 2 * diff
        } else {
            r - g + 4 * diff
        };
        let mut h = (30.0 * sector as f32 / diff as f32).round() as i32;
        if h < 0 {
            h += 180;
        }
        h.min(179)
    };

    Hsv::new(h as u8, s as u8, v as u8)
}

/// Binary mask of pixels whose HSV value falls inside `range` (inclusive).
#[must_use]
pub fn in_range_mask(image: &RgbImage, range: &ColorRange) -> GrayImage {
    map_colors(image, |Rgb([r, g, b])| {
        Luma([if range.contains(rgb_to_hsv(r, g, b)) { MASK_ON } else { 0 }])
    })
}

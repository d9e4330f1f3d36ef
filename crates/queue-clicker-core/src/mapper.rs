//! Frame pixel to pointer coordinate mapping.
//!
//! Capture backends may return physical pixels while pointer APIs take
//! logical (scaled) coordinates. A single linear factor derived from the
//! widths covers that mismatch for one display.

use serde::{Deserialize, Serialize};

/// An integer position in pointer space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerPoint {
    pub x: i32,
    pub y: i32,
}

impl PointerPoint {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for PointerPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Logical screen width over buffer width.
///
/// Exactly 1.0 when the widths agree, and also when the buffer is empty so
/// the ratio would be undefined.
#[must_use]
pub fn scale_factor(buffer_width: u32, screen_width: u32) -> f64 {
    if buffer_width == 0 || buffer_width == screen_width {
        1.0
    } else {
        f64::from(screen_width) / f64::from(buffer_width)
    }
}

/// Map a point in frame pixels into pointer space, truncating.
#[must_use]
pub fn map_to_pointer_space(
    buffer_dims: (u32, u32),
    screen_dims: (u32, u32),
    point: (u32, u32),
) -> PointerPoint {
    let scale = scale_factor(buffer_dims.0, screen_dims.0);
    PointerPoint {
        x: (f64::from(point.0) * scale) as i32,
        y: (f64::from(point.1) * scale) as i32,
    }
}

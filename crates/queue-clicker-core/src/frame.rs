//! Captured frames and the capability that produces them.
//!
//! A [`Frame`] pairs the captured pixel buffer with the logical size of the
//! screen it came from. The two often disagree on HiDPI displays: capture
//! returns physical pixels while the pointer works in logical points, and the
//! coordinate mapper reconciles them.
//!
//! The buffer is always RGB-ordered; the HSV conversion in
//! [`crate::detect::hsv`] relies on that.

use image::RgbImage;

use crate::error::Result;

/// One full-screen capture, owned by a single polling iteration.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    /// Logical screen width in pointer coordinates.
    pub screen_width: u32,
    /// Logical screen height in pointer coordinates.
    pub screen_height: u32,
}

impl Frame {
    /// A frame whose pointer space matches its pixel space.
    #[must_use]
    pub fn unscaled(image: RgbImage) -> Self {
        let (screen_width, screen_height) = image.dimensions();
        Self {
            image,
            screen_width,
            screen_height,
        }
    }

    #[must_use]
    pub fn buffer_dims(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    #[must_use]
    pub fn screen_dims(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }
}

/// Produces full-screen frames on demand.
///
/// Implementations must return the same channel order on every call. Errors
/// are fatal to the monitor loop; it never retries a failed capture.
pub trait FrameSource {
    fn capture(&mut self) -> Result<Frame>;
}

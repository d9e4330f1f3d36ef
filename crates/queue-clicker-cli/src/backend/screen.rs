//! Full-screen capture of the primary monitor through xcap.

use image::{DynamicImage, RgbaImage};
use queue_clicker_core::error::{Error, Result};
use queue_clicker_core::frame::{Frame, FrameSource};
use tracing::info;
use xcap::Monitor;

pub struct ScreenSource {
    monitor: Monitor,
}

impl ScreenSource {
    /// The monitor flagged primary, else the first one xcap reports.
    pub fn primary() -> Result<Self> {
        let monitors = Monitor::all().map_err(capture_err)?;
        let index = monitors
            .iter()
            .position(|m| m.is_primary().unwrap_or(false))
            .unwrap_or(0);
        let monitor = monitors
            .into_iter()
            .nth(index)
            .ok_or_else(|| Error::capture("no monitors found"))?;

        info!(
            "Capturing monitor {:?} ({}x{}, scale {})",
            monitor.name().unwrap_or_default(),
            monitor.width().unwrap_or_default(),
            monitor.height().unwrap_or_default(),
            monitor.scale_factor().unwrap_or(1.0)
        );
        Ok(Self { monitor })
    }
}

impl FrameSource for ScreenSource {
    fn capture(&mut self) -> Result<Frame> {
        let shot = self.monitor.capture_image().map_err(capture_err)?;
        let (width, height) = shot.dimensions();
        let rgba = RgbaImage::from_raw(width, height, shot.into_raw())
            .ok_or_else(|| Error::capture("capture buffer does not match its dimensions"))?;

        // Logical size, which is what the pointer moves in
        let screen_width = self.monitor.width().map_err(capture_err)?;
        let screen_height = self.monitor.height().map_err(capture_err)?;

        Ok(Frame {
            image: DynamicImage::ImageRgba8(rgba).to_rgb8(),
            screen_width,
            screen_height,
        })
    }
}

fn capture_err(e: xcap::XCapError) -> Error {
    Error::capture(e.to_string())
}

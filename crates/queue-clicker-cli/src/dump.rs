//! Debug frame dumps.
//!
//! Writes each inspected frame with candidate outlines drawn on it, plus the
//! color mask the detector worked from, as timestamped PNGs.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use queue_clicker_core::config::DetectorConfig;
use queue_clicker_core::detect::{ColorDetector, Region};
use queue_clicker_core::error::{Error, Result};
use queue_clicker_core::frame::Frame;
use queue_clicker_core::monitor::FrameInspector;
use tracing::debug;

const OUTLINE: Rgb<u8> = Rgb([0, 255, 0]);
const OUTLINE_WIDTH: u32 = 2;

pub struct DebugDumper {
    dir: PathBuf,
    detector: ColorDetector,
    written: u64,
}

impl DebugDumper {
    pub fn new(dir: impl Into<PathBuf>, detector: DetectorConfig) -> Self {
        Self {
            dir: dir.into(),
            detector: ColorDetector::new(detector),
            written: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the annotated frame and its mask. Returns both paths.
    pub fn dump(&mut self, image: &RgbImage, candidates: &[Region]) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            Error::inspection(format!("cannot create {}: {e}", self.dir.display()))
        })?;

        let stamp = format!(
            "{}-{:04}",
            Local::now().format("%Y%m%d-%H%M%S%.3f"),
            self.written
        );
        let frame_path = self.dir.join(format!("frame-{stamp}.png"));
        let mask_path = self.dir.join(format!("mask-{stamp}.png"));

        annotate(image, candidates)
            .save(&frame_path)
            .map_err(|e| Error::inspection(format!("{}: {e}", frame_path.display())))?;
        self.detector
            .mask(image)
            .save(&mask_path)
            .map_err(|e| Error::inspection(format!("{}: {e}", mask_path.display())))?;

        self.written += 1;
        debug!("Saved debug frame {}", frame_path.display());
        Ok((frame_path, mask_path))
    }
}

impl FrameInspector for DebugDumper {
    fn inspect(&mut self, frame: &Frame, candidates: &[Region]) -> Result<()> {
        self.dump(&frame.image, candidates).map(|_| ())
    }
}

/// Copy of `image` with a rectangle drawn just inside each candidate box.
pub fn annotate(image: &RgbImage, candidates: &[Region]) -> RgbImage {
    let mut out = image.clone();
    for region in candidates {
        // Nested hollow rects, one per pixel of outline width
        for inset in 0..OUTLINE_WIDTH {
            let width = region.width.saturating_sub(2 * inset);
            let height = region.height.saturating_sub(2 * inset);
            if width == 0 || height == 0 {
                break;
            }
            let rect = Rect::at((region.x + inset) as i32, (region.y + inset) as i32)
                .of_size(width, height);
            draw_hollow_rect_mut(&mut out, rect, OUTLINE);
        }
    }
    out
}

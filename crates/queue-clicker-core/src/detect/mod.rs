//! Color-based button detection.
//!
//! The detector finds solid patches of "button blue" that have the rough
//! geometry of a button. It runs a fixed pipeline over each frame:
//!
//! 1. [`hsv`]: convert to hue/saturation/value and threshold against the
//!    configured [`ColorRange`](crate::config::ColorRange)
//! 2. [`contour`]: extract the outer contour of each connected patch
//! 3. [`filter`]: keep patches whose area, aspect ratio, size and vertical
//!    position look like a button
//!
//! Detection is a pure function of the frame and the configuration. The
//! returned candidates carry no ordering guarantee beyond being stable for
//! identical input; callers try each in turn.

pub mod contour;
pub mod filter;
pub mod hsv;

use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DetectorConfig;

/// A candidate button in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    #[must_use]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Click target: the box center, rounded down.
    #[must_use]
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Bounding box area in pixels.
    #[must_use]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Finds button-shaped patches of the configured color.
#[derive(Debug, Clone, Default)]
pub struct ColorDetector {
    config: DetectorConfig,
}

impl ColorDetector {
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// The binary color mask the detector works from.
    #[must_use]
    pub fn mask(&self, image: &RgbImage) -> GrayImage {
        hsv::in_range_mask(image, &self.config.color)
    }

    /// Candidate regions in `image`.
    #[must_use]
    pub fn detect(&self, image: &RgbImage) -> Vec<Region> {
        let mask = self.mask(image);
        let contours = contour::find_external_contours(&mask);
        let regions = filter::accept(&self.config, &contours, image.height());
        debug!(
            "{} contour(s), {} candidate(s) in {}x{} frame",
            contours.len(),
            regions.len(),
            image.width(),
            image.height()
        );
        regions
    }
}

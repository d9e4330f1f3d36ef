//! Geometric acceptance rules for extracted contours.
//!
//! A contour becomes a candidate only if all of these hold:
//!
//! 1. `min_area < enclosed area < max_area`
//! 2. `min_aspect < width / height < max_aspect`
//! 3. `width >= min_width` and `height >= min_height`
//! 4. the bounding box lies between the top and bottom exclusion bands
//!
//! The bands keep toolbars at the top of the screen and the taskbar at the
//! bottom from being mistaken for buttons.

use crate::config::DetectorConfig;
use crate::detect::contour::Contour;
use crate::detect::Region;

/// Width over height, or 0.0 for a zero-height box.
#[must_use]
pub fn aspect_ratio(width: u32, height: u32) -> f64 {
    if height == 0 {
        0.0
    } else {
        f64::from(width) / f64::from(height)
    }
}

/// Why a contour was turned down. Only used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Area,
    Aspect,
    TooSmall,
    ExcludedBand,
}

/// Check one bounding box and its enclosed area against the configured bounds.
pub fn check(
    config: &DetectorConfig,
    region: &Region,
    area: f64,
    frame_height: u32,
) -> Result<(), Rejection> {
    if !(area > config.min_area && area < config.max_area) {
        return Err(Rejection::Area);
    }

    let aspect = aspect_ratio(region.width, region.height);
    if !(aspect > config.min_aspect && aspect < config.max_aspect) {
        return Err(Rejection::Aspect);
    }

    if region.width < config.min_width || region.height < config.min_height {
        return Err(Rejection::TooSmall);
    }

    let frame_height = f64::from(frame_height);
    let top_limit = frame_height * config.top_exclusion;
    let bottom_limit = frame_height * (1.0 - config.bottom_exclusion);
    let top = f64::from(region.y);
    let bottom = f64::from(region.y) + f64::from(region.height);
    if top < top_limit || bottom > bottom_limit {
        return Err(Rejection::ExcludedBand);
    }

    Ok(())
}

/// Turn contours into accepted candidate regions.
#[must_use]
pub fn accept(config: &DetectorConfig, contours: &[Contour], frame_height: u32) -> Vec<Region> {
    contours
        .iter()
        .filter_map(|contour| {
            let (x, y, width, height) = contour.bounding_rect();
            let region = Region::new(x, y, width, height);
            match check(config, &region, contour.area(), frame_height) {
                Ok(()) => Some(region),
                Err(reason) => {
                    tracing::trace!("Rejected {:?}: {:?}", region, reason);
                    None
                }
            }
        })
        .collect()
}

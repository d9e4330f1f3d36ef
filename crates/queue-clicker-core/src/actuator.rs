//! Synthetic pointer input.
//!
//! The actuator is an external capability; this module only fixes its shape
//! and the exact sequence issued for an accepted match.

use std::time::Duration;

use tracing::debug;

use crate::config::ClickConfig;
use crate::error::Result;
use crate::mapper::PointerPoint;

/// Moves the pointer and presses the primary button, in pointer space.
///
/// Every call blocks until the backend is done. Failures are fatal to the
/// monitor loop; nothing here retries.
pub trait PointerActuator {
    /// Glide to `point` over `duration`.
    fn move_to(&mut self, point: PointerPoint, duration: Duration) -> Result<()>;

    /// Move to `point` over `duration`, then click once.
    fn click(&mut self, point: PointerPoint, duration: Duration) -> Result<()>;

    /// Press the primary button at `point`.
    fn press(&mut self, point: PointerPoint) -> Result<()>;

    /// Release the primary button at `point`.
    fn release(&mut self, point: PointerPoint) -> Result<()>;
}

/// Issue the full click sequence for one accepted match:
/// move, click, then an explicit press and release.
pub fn click_sequence<A: PointerActuator + ?Sized>(
    actuator: &mut A,
    point: PointerPoint,
    config: &ClickConfig,
) -> Result<()> {
    debug!("Click sequence at {}", point);
    actuator.move_to(point, config.move_duration())?;
    actuator.click(point, config.click_duration())?;
    actuator.press(point)?;
    actuator.release(point)?;
    Ok(())
}

//! Synthetic mouse input through enigo.

use std::fmt::Display;
use std::thread::sleep;
use std::time::Duration;

use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use queue_clicker_core::actuator::PointerActuator;
use queue_clicker_core::error::{Error, Result};
use queue_clicker_core::mapper::PointerPoint;
use tracing::debug;

/// Pause between intermediate pointer positions while gliding.
const GLIDE_STEP: Duration = Duration::from_millis(10);

pub struct EnigoActuator {
    enigo: Enigo,
}

impl EnigoActuator {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(input_err)?;
        Ok(Self { enigo })
    }

    /// Move in straight-line steps so the whole motion takes about `duration`.
    fn glide(&mut self, point: PointerPoint, duration: Duration) -> Result<()> {
        let steps = glide_steps(duration);
        let (start_x, start_y) = self.enigo.location().map_err(input_err)?;
        let pause = duration / steps;

        for step in 1..=steps {
            let t = f64::from(step) / f64::from(steps);
            let x = start_x + (f64::from(point.x - start_x) * t).round() as i32;
            let y = start_y + (f64::from(point.y - start_y) * t).round() as i32;
            self.enigo
                .move_mouse(x, y, Coordinate::Abs)
                .map_err(input_err)?;
            if step < steps {
                sleep(pause);
            }
        }
        Ok(())
    }

    fn button(&mut self, direction: Direction) -> Result<()> {
        self.enigo
            .button(Button::Left, direction)
            .map_err(input_err)
    }
}

impl PointerActuator for EnigoActuator {
    fn move_to(&mut self, point: PointerPoint, duration: Duration) -> Result<()> {
        debug!("Moving pointer to {} over {:?}", point, duration);
        self.glide(point, duration)
    }

    fn click(&mut self, point: PointerPoint, duration: Duration) -> Result<()> {
        self.glide(point, duration)?;
        self.button(Direction::Click)
    }

    fn press(&mut self, point: PointerPoint) -> Result<()> {
        self.enigo
            .move_mouse(point.x, point.y, Coordinate::Abs)
            .map_err(input_err)?;
        self.button(Direction::Press)
    }

    fn release(&mut self, point: PointerPoint) -> Result<()> {
        self.enigo
            .move_mouse(point.x, point.y, Coordinate::Abs)
            .map_err(input_err)?;
        self.button(Direction::Release)
    }
}

/// Number of intermediate positions for a glide. Never zero.
fn glide_steps(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis() / GLIDE_STEP.as_millis())
        .unwrap_or(u32::MAX)
        .max(1)
}

fn input_err(e: impl Display) -> Error {
    Error::actuator(e.to_string())
}

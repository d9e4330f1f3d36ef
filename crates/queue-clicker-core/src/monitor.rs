//! The polling loop that ties capture, detection, verification and clicking
//! together.
//!
//! # States
//!
//! ```text
//! Idle ──run()──▶ Running ──click──────▶ Succeeded
//!                   │  ▲ ──stop()──────▶ Cancelled
//!                   └──┘ ──fatal error─▶ Failed
//!                  (tick)
//! ```
//!
//! Each tick captures one frame, detects candidates and tries them in order.
//! The first accepted candidate is clicked and the run ends; at most one click
//! is ever dispatched per run. When nothing is accepted the loop sleeps for
//! the configured interval and ticks again.
//!
//! # Cancellation
//!
//! [`StopHandle::stop`] is cooperative. It is checked only at tick
//! boundaries, so a stop requested during the sleep takes effect after the
//! sleep and before the next capture, and a tick in progress always finishes.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::actuator::{click_sequence, PointerActuator};
use crate::config::MonitorConfig;
use crate::detect::{ColorDetector, Region};
use crate::error::{Error, Result};
use crate::frame::{Frame, FrameSource};
use crate::mapper::{map_to_pointer_space, scale_factor, PointerPoint};
use crate::verify::TextVerifier;

/// Lifecycle of one monitoring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    Idle,
    Running,
    Succeeded,
    Cancelled,
    Failed,
}

impl MonitorState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MonitorState::Succeeded | MonitorState::Cancelled | MonitorState::Failed
        )
    }
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorState::Idle => write!(f, "idle"),
            MonitorState::Running => write!(f, "running"),
            MonitorState::Succeeded => write!(f, "succeeded"),
            MonitorState::Cancelled => write!(f, "cancelled"),
            MonitorState::Failed => write!(f, "failed"),
        }
    }
}

/// Requests cancellation of a monitor, possibly from another thread.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the monitor to stop at the next tick boundary. Idempotent.
    pub fn stop(&self) {
        if !self.0.swap(true, Ordering::SeqCst) {
            info!("Monitoring stop requested");
        }
    }

    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The single suspension point between ticks.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// Blocks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<F: FnMut(Duration)> Sleeper for F {
    fn sleep(&mut self, duration: Duration) {
        self(duration)
    }
}

/// Diagnostic hook that sees every frame with at least one candidate when
/// `debug` is enabled. Its failures are logged and otherwise ignored.
pub trait FrameInspector {
    fn inspect(&mut self, frame: &Frame, candidates: &[Region]) -> Result<()>;
}

/// What was clicked, where, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickReport {
    /// Accepted candidate, in frame pixels.
    pub region: Region,
    /// Where the click landed, in pointer space.
    pub point: PointerPoint,
    /// Pointer units per frame pixel.
    pub scale: f64,
    /// Whether a keyword was read on the button before clicking.
    pub verified: bool,
    /// 1-based tick on which the click happened.
    pub tick: u64,
}

/// How a run ended, other than by error.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Clicked(ClickReport),
    Cancelled,
}

pub struct Monitor<S, A, Z = ThreadSleeper> {
    config: MonitorConfig,
    keywords: Vec<String>,
    source: S,
    detector: ColorDetector,
    verifier: TextVerifier,
    actuator: A,
    sleeper: Z,
    inspector: Option<Box<dyn FrameInspector>>,
    stop: StopHandle,
    state: MonitorState,
    ticks: u64,
}

impl<S: FrameSource, A: PointerActuator> Monitor<S, A> {
    /// Build a monitor. Fails if `config` does not validate.
    pub fn new(
        config: MonitorConfig,
        source: S,
        verifier: TextVerifier,
        actuator: A,
    ) -> Result<Self> {
        config.validate()?;

        info!("Queue clicker initialized");
        info!(
            "Check interval: {}s, Confidence: {}",
            config.check_interval, config.confidence
        );

        Ok(Self {
            keywords: config.normalized_keywords(),
            detector: ColorDetector::new(config.detector.clone()),
            config,
            source,
            verifier,
            actuator,
            sleeper: ThreadSleeper,
            inspector: None,
            stop: StopHandle::new(),
            state: MonitorState::Idle,
            ticks: 0,
        })
    }
}

impl<S: FrameSource, A: PointerActuator, Z: Sleeper> Monitor<S, A, Z> {
    /// Replace how the loop waits between ticks.
    #[must_use]
    pub fn with_sleeper<Z2: Sleeper>(self, sleeper: Z2) -> Monitor<S, A, Z2> {
        Monitor {
            config: self.config,
            keywords: self.keywords,
            source: self.source,
            detector: self.detector,
            verifier: self.verifier,
            actuator: self.actuator,
            sleeper,
            inspector: self.inspector,
            stop: self.stop,
            state: self.state,
            ticks: self.ticks,
        }
    }

    /// Attach a diagnostic hook, used when `debug` is enabled.
    #[must_use]
    pub fn with_inspector(mut self, inspector: Box<dyn FrameInspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    /// Share an existing stop handle, e.g. one already wired to a signal.
    #[must_use]
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Request cancellation at the next tick boundary. Idempotent.
    pub fn stop(&self) {
        self.stop.stop();
    }

    #[must_use]
    pub fn state(&self) -> MonitorState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == MonitorState::Running
    }

    /// Number of ticks started so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Poll until a button is clicked, a stop is requested, or a fatal error
    /// occurs. A monitor runs once; later calls return
    /// [`Error::AlreadyFinished`].
    pub fn run(&mut self) -> Result<Outcome> {
        if self.state != MonitorState::Idle {
            return Err(Error::AlreadyFinished(self.state.to_string()));
        }
        self.state = MonitorState::Running;
        self.log_start();

        loop {
            if self.stop.is_stop_requested() {
                self.state = MonitorState::Cancelled;
                info!("Monitoring stopped by user after {} tick(s)", self.ticks);
                return Ok(Outcome::Cancelled);
            }

            self.ticks += 1;
            match self.tick() {
                Ok(Some(report)) => {
                    self.state = MonitorState::Succeeded;
                    if report.verified {
                        info!("Queue button found and clicked!");
                    } else {
                        info!("Blue button clicked (OCR disabled)");
                    }
                    return Ok(Outcome::Clicked(report));
                }
                Ok(None) => {}
                Err(e) => {
                    self.state = MonitorState::Failed;
                    error!("Error during monitoring: {}", e);
                    return Err(e);
                }
            }

            self.sleeper.sleep(self.config.interval());
        }
    }

    fn log_start(&self) {
        info!("Starting to monitor for queue button...");
        if self.config.use_ocr {
            info!("Looking for keywords: {:?}", self.keywords);
            if !self.verifier.is_available() {
                warn!(
                    "Text recognition is unavailable; OCR verification is on, so no button will be clicked"
                );
            }
        } else {
            info!("OCR verification disabled, the first candidate will be clicked");
        }
    }

    /// One capture → detect → verify → click pass.
    fn tick(&mut self) -> Result<Option<ClickReport>> {
        let frame = self.source.capture()?;
        let candidates = self.detector.detect(&frame.image);
        if candidates.is_empty() {
            return Ok(None);
        }
        debug!("Found {} potential button(s)", candidates.len());

        if self.config.debug {
            if let Some(inspector) = self.inspector.as_mut() {
                if let Err(e) = inspector.inspect(&frame, &candidates) {
                    warn!("Frame inspection failed: {}", e);
                }
            }
        }

        for region in &candidates {
            let verified = self.config.use_ocr;
            if verified && !self.verifier.verify(&frame.image, region, &self.keywords) {
                continue;
            }

            let scale = scale_factor(frame.image.width(), frame.screen_width);
            let point = map_to_pointer_space(frame.buffer_dims(), frame.screen_dims(), region.center());
            info!(
                "Clicking button at {} (frame center {:?}, scale {:.3})",
                point,
                region.center(),
                scale
            );
            click_sequence(&mut self.actuator, point, &self.config.click)?;

            return Ok(Some(ClickReport {
                region: *region,
                point,
                scale,
                verified,
                tick: self.ticks,
            }));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use image::RgbImage;

    use super::*;
    use crate::actuator::test_support::{Action, RecordingActuator};
    use crate::config::VerifierConfig;
    use crate::detect::test_support::{blank, paint, BUTTON_BLUE};
    use crate::error::ErrorCode;
    use crate::verify::test_support::ScriptedRecognizer;

    /// Replays frames in order, repeating the last; can fail on one capture.
    struct FakeSource {
        frames: Vec<Frame>,
        fail_on: Option<usize>,
        captures: Rc<Cell<usize>>,
    }

    impl FakeSource {
        fn new(frames: Vec<Frame>) -> Self {
            Self {
                frames,
                fail_on: None,
                captures: Rc::new(Cell::new(0)),
            }
        }
    }

    impl FrameSource for FakeSource {
        fn capture(&mut self) -> Result<Frame> {
            let index = self.captures.get();
            self.captures.set(index + 1);
            if self.fail_on == Some(index) {
                return Err(Error::capture("display went away"));
            }
            let frame = self
                .frames
                .get(index)
                .or_else(|| self.frames.last())
                .cloned()
                .unwrap_or_else(|| Frame::unscaled(RgbImage::new(1, 1)));
            Ok(frame)
        }
    }

    fn empty_frame() -> Frame {
        Frame::unscaled(blank(800, 600))
    }

    fn frame_with_button() -> Frame {
        let mut image = blank(800, 600);
        paint(&mut image, 300, 300, 200, 40, BUTTON_BLUE);
        Frame::unscaled(image)
    }

    fn frame_with_two_buttons() -> Frame {
        let mut image = blank(800, 600);
        paint(&mut image, 100, 200, 200, 40, BUTTON_BLUE);
        paint(&mut image, 400, 400, 200, 40, BUTTON_BLUE);
        Frame::unscaled(image)
    }

    fn config(use_ocr: bool) -> MonitorConfig {
        MonitorConfig {
            use_ocr,
            keywords: vec!["join queue".into(), "queue".into()],
            ..MonitorConfig::default()
        }
    }

    fn verifier(recognizer: ScriptedRecognizer) -> TextVerifier {
        TextVerifier::new(Box::new(recognizer), VerifierConfig::default())
    }

    fn no_verifier() -> TextVerifier {
        TextVerifier::unavailable("not installed", VerifierConfig::default())
    }

    /// Sleeper that records durations and stops the monitor after `limit` sleeps.
    fn stopping_sleeper(
        stop: StopHandle,
        limit: usize,
    ) -> (impl FnMut(Duration), Rc<RefCell<Vec<Duration>>>) {
        let sleeps = Rc::new(RefCell::new(Vec::new()));
        let recorded = sleeps.clone();
        let sleeper = move |duration: Duration| {
            recorded.borrow_mut().push(duration);
            if recorded.borrow().len() >= limit {
                stop.stop();
            }
        };
        (sleeper, sleeps)
    }

    #[test]
    fn test_clicks_first_candidate_without_ocr() {
        let actuator = RecordingActuator::default();
        let mut monitor = Monitor::new(
            config(false),
            FakeSource::new(vec![frame_with_button()]),
            no_verifier(),
            actuator.clone(),
        )
        .unwrap()
        .with_sleeper(|_: Duration| panic!("should not sleep"));

        let outcome = monitor.run().unwrap();

        assert_eq!(actuator.clicks(), 1);
        assert_eq!(monitor.state(), MonitorState::Succeeded);
        assert_eq!(monitor.ticks(), 1);
        let Outcome::Clicked(report) = outcome else {
            panic!("expected a click, got {outcome:?}");
        };
        assert_eq!(report.region, Region::new(300, 300, 200, 40));
        assert_eq!(report.point, PointerPoint::new(400, 320));
        assert!(!report.verified);
        assert_eq!(report.tick, 1);
    }

    #[test]
    fn test_issues_one_full_click_sequence() {
        let actuator = RecordingActuator::default();
        let mut monitor = Monitor::new(
            config(false),
            FakeSource::new(vec![frame_with_two_buttons()]),
            no_verifier(),
            actuator.clone(),
        )
        .unwrap();

        monitor.run().unwrap();

        let point = PointerPoint::new(200, 220);
        assert_eq!(
            actuator.actions.borrow().as_slice(),
            &[
                Action::Move(point),
                Action::Click(point),
                Action::Press(point),
                Action::Release(point),
            ]
        );
    }

    #[test]
    fn test_keeps_polling_while_verification_fails() {
        let actuator = RecordingActuator::default();
        let source = FakeSource::new(vec![frame_with_button()]);
        let captures = source.captures.clone();
        let stop = StopHandle::new();
        let (sleeper, sleeps) = stopping_sleeper(stop.clone(), 3);

        let mut monitor = Monitor::new(
            config(true),
            source,
            verifier(ScriptedRecognizer::always("leave")),
            actuator.clone(),
        )
        .unwrap()
        .with_stop_handle(stop)
        .with_sleeper(sleeper);

        let outcome = monitor.run().unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(actuator.clicks(), 0);
        assert_eq!(captures.get(), 3);
        assert_eq!(
            sleeps.borrow().as_slice(),
            &[Duration::from_millis(500); 3]
        );
    }

    #[test]
    fn test_clicks_when_keyword_is_read() {
        let actuator = RecordingActuator::default();
        let mut monitor = Monitor::new(
            config(true),
            FakeSource::new(vec![frame_with_button()]),
            verifier(ScriptedRecognizer::always("Join Queue Now")),
            actuator.clone(),
        )
        .unwrap();

        let Outcome::Clicked(report) = monitor.run().unwrap() else {
            panic!("expected a click");
        };

        assert!(report.verified);
        assert_eq!(actuator.clicks(), 1);
    }

    #[test]
    fn test_recognition_error_skips_only_that_candidate() {
        let actuator = RecordingActuator::default();
        let recognizer = ScriptedRecognizer::new(vec![
            Err(Error::recognition("engine crashed")),
            Ok("Join Queue".into()),
        ]);
        let mut monitor = Monitor::new(
            config(true),
            FakeSource::new(vec![frame_with_two_buttons()]),
            verifier(recognizer),
            actuator.clone(),
        )
        .unwrap();

        let Outcome::Clicked(report) = monitor.run().unwrap() else {
            panic!("expected a click");
        };

        assert_eq!(report.region, Region::new(400, 400, 200, 40));
        assert_eq!(actuator.clicks(), 1);
    }

    #[test]
    fn test_unavailable_recognition_never_clicks() {
        let actuator = RecordingActuator::default();
        let stop = StopHandle::new();
        let (sleeper, _) = stopping_sleeper(stop.clone(), 2);
        let mut monitor = Monitor::new(
            config(true),
            FakeSource::new(vec![frame_with_button()]),
            no_verifier(),
            actuator.clone(),
        )
        .unwrap()
        .with_stop_handle(stop)
        .with_sleeper(sleeper);

        assert_eq!(monitor.run().unwrap(), Outcome::Cancelled);
        assert_eq!(actuator.clicks(), 0);
    }

    #[test]
    fn test_stop_during_sleep_cancels_before_next_capture() {
        let actuator = RecordingActuator::default();
        let source = FakeSource::new(vec![empty_frame(), frame_with_button()]);
        let captures = source.captures.clone();
        let stop = StopHandle::new();
        let (sleeper, _) = stopping_sleeper(stop.clone(), 1);

        let mut monitor = Monitor::new(config(false), source, no_verifier(), actuator.clone())
            .unwrap()
            .with_stop_handle(stop)
            .with_sleeper(sleeper);

        assert_eq!(monitor.run().unwrap(), Outcome::Cancelled);
        assert_eq!(monitor.state(), MonitorState::Cancelled);
        // The button frame was never captured, let alone clicked
        assert_eq!(captures.get(), 1);
        assert!(actuator.actions.borrow().is_empty());
    }

    #[test]
    fn test_stop_before_run_cancels_without_capturing() {
        let source = FakeSource::new(vec![frame_with_button()]);
        let captures = source.captures.clone();
        let mut monitor =
            Monitor::new(config(false), source, no_verifier(), RecordingActuator::default())
                .unwrap();

        monitor.stop();
        monitor.stop();

        assert_eq!(monitor.run().unwrap(), Outcome::Cancelled);
        assert_eq!(captures.get(), 0);
    }

    #[test]
    fn test_clicks_on_first_tick_with_a_candidate() {
        let actuator = RecordingActuator::default();
        let mut monitor = Monitor::new(
            config(false),
            FakeSource::new(vec![empty_frame(), empty_frame(), frame_with_button()]),
            no_verifier(),
            actuator.clone(),
        )
        .unwrap()
        .with_sleeper(|_: Duration| {});

        let Outcome::Clicked(report) = monitor.run().unwrap() else {
            panic!("expected a click");
        };

        assert_eq!(report.tick, 3);
        assert_eq!(actuator.clicks(), 1);
    }

    #[test]
    fn test_capture_failure_is_fatal() {
        let actuator = RecordingActuator::default();
        let mut source = FakeSource::new(vec![empty_frame()]);
        source.fail_on = Some(1);
        let mut monitor = Monitor::new(config(false), source, no_verifier(), actuator.clone())
            .unwrap()
            .with_sleeper(|_: Duration| {});

        let err = monitor.run().unwrap_err();

        assert_eq!(err.code(), ErrorCode::CaptureFailed);
        assert_eq!(monitor.state(), MonitorState::Failed);
        assert_eq!(monitor.ticks(), 2);
        assert_eq!(actuator.clicks(), 0);
    }

    #[test]
    fn test_actuator_failure_is_fatal() {
        let actuator = RecordingActuator {
            fail_click: true,
            ..RecordingActuator::default()
        };
        let mut monitor = Monitor::new(
            config(false),
            FakeSource::new(vec![frame_with_button()]),
            no_verifier(),
            actuator,
        )
        .unwrap();

        assert!(matches!(monitor.run(), Err(Error::Actuator(_))));
        assert_eq!(monitor.state(), MonitorState::Failed);
    }

    #[test]
    fn test_terminal_monitor_does_not_restart() {
        let mut monitor = Monitor::new(
            config(false),
            FakeSource::new(vec![frame_with_button()]),
            no_verifier(),
            RecordingActuator::default(),
        )
        .unwrap();

        monitor.run().unwrap();

        assert!(matches!(monitor.run(), Err(Error::AlreadyFinished(_))));
        assert!(monitor.state().is_terminal());
    }

    #[test]
    fn test_hidpi_frame_maps_click_into_pointer_space() {
        let mut image = blank(1600, 1200);
        paint(&mut image, 300, 400, 200, 40, BUTTON_BLUE);
        let frame = Frame {
            image,
            screen_width: 800,
            screen_height: 600,
        };
        let actuator = RecordingActuator::default();
        let mut monitor = Monitor::new(
            config(false),
            FakeSource::new(vec![frame]),
            no_verifier(),
            actuator.clone(),
        )
        .unwrap();

        let Outcome::Clicked(report) = monitor.run().unwrap() else {
            panic!("expected a click");
        };

        assert_eq!(report.scale, 0.5);
        assert_eq!(report.point, PointerPoint::new(200, 210));
        assert_eq!(
            actuator.actions.borrow().first(),
            Some(&Action::Move(PointerPoint::new(200, 210)))
        );
    }

    #[test]
    fn test_invalid_config_is_rejected_at_construction() {
        let bad = MonitorConfig {
            check_interval: -1.0,
            ..MonitorConfig::default()
        };
        let result = Monitor::new(
            bad,
            FakeSource::new(vec![]),
            no_verifier(),
            RecordingActuator::default(),
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_interval_beyond_duration_range_is_rejected_at_construction() {
        let bad = MonitorConfig {
            check_interval: 1e300,
            ..MonitorConfig::default()
        };
        let result = Monitor::new(
            bad,
            FakeSource::new(vec![]),
            no_verifier(),
            RecordingActuator::default(),
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    struct CountingInspector(Rc<Cell<usize>>);

    impl FrameInspector for CountingInspector {
        fn inspect(&mut self, _frame: &Frame, candidates: &[Region]) -> Result<()> {
            self.0.set(self.0.get() + candidates.len());
            Err(Error::inspection("disk full"))
        }
    }

    #[test]
    fn test_inspector_runs_only_in_debug_and_cannot_fail_the_run() {
        for debug in [false, true] {
            let seen = Rc::new(Cell::new(0));
            let mut monitor = Monitor::new(
                MonitorConfig {
                    debug,
                    ..config(false)
                },
                FakeSource::new(vec![frame_with_button()]),
                no_verifier(),
                RecordingActuator::default(),
            )
            .unwrap()
            .with_inspector(Box::new(CountingInspector(seen.clone())));

            assert!(matches!(monitor.run(), Ok(Outcome::Clicked(_))));
            assert_eq!(seen.get(), usize::from(debug));
        }
    }
}

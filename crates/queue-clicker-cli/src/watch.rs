//! The `watch` command: banner, countdown, then the monitor loop on the real
//! screen, mouse and OCR engine.
//!
//! The monitor and its backends are built and run on one blocking thread
//! (several backends are not `Send`). The async side only waits for either
//! that thread or a shutdown signal, and forwards signals through a
//! [`StopHandle`].

use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

use anyhow::Context;
use queue_clicker_core::config::MonitorConfig;
use queue_clicker_core::monitor::{Monitor, Outcome, StopHandle};
use queue_clicker_core::verify::TextVerifier;
use tracing::info;

use crate::args::WatchArgs;
use crate::backend::{EnigoActuator, ScreenSource, Tesseract};
use crate::dump::DebugDumper;
use crate::settings;

pub fn run(config_path: Option<&Path>, args: &WatchArgs) -> anyhow::Result<()> {
    let config = settings::resolve_watch(config_path, args).context("invalid configuration")?;
    let debug_dir = args
        .debug_dir
        .clone()
        .unwrap_or_else(settings::default_debug_dir);
    let countdown = Duration::from_secs(args.countdown);

    print_banner(&config);

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(supervise(config, debug_dir, countdown))?;

    match outcome {
        Outcome::Clicked(report) => {
            println!("Clicked queue button at {} (tick {})", report.point, report.tick);
        }
        Outcome::Cancelled => println!("Stopped without clicking"),
    }
    Ok(())
}

/// Run the blocking loop, stopping it cooperatively on SIGINT or SIGTERM.
async fn supervise(
    config: MonitorConfig,
    debug_dir: PathBuf,
    countdown: Duration,
) -> anyhow::Result<Outcome> {
    let stop = StopHandle::new();
    let worker_stop = stop.clone();
    let mut worker =
        tokio::task::spawn_blocking(move || watch_blocking(config, debug_dir, countdown, worker_stop));

    tokio::select! {
        joined = &mut worker => return joined?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, stopping after the current check");
        }
        _ = crate::sigterm() => {
            info!("Received SIGTERM, stopping after the current check");
        }
    }

    stop.stop();
    worker.await?
}

fn watch_blocking(
    config: MonitorConfig,
    debug_dir: PathBuf,
    countdown: Duration,
    stop: StopHandle,
) -> anyhow::Result<Outcome> {
    if !wait_countdown(countdown, &stop) {
        info!("Cancelled during countdown");
        return Ok(Outcome::Cancelled);
    }

    let source = ScreenSource::primary().context("failed to open the screen for capture")?;
    let actuator = EnigoActuator::new().context("failed to set up pointer input")?;
    let verifier = if config.use_ocr {
        Tesseract::verifier(config.verifier.clone())
    } else {
        TextVerifier::unavailable("OCR disabled", config.verifier.clone())
    };

    let debug = config.debug;
    let detector = config.detector.clone();
    let mut monitor = Monitor::new(config, source, verifier, actuator)?.with_stop_handle(stop);
    if debug {
        let dumper = DebugDumper::new(debug_dir, detector);
        info!("Saving debug frames to {}", dumper.dir().display());
        monitor = monitor.with_inspector(Box::new(dumper));
    }

    Ok(monitor.run()?)
}

/// Sleep through the countdown one second at a time. Returns `false` if a
/// stop was requested before it finished.
fn wait_countdown(countdown: Duration, stop: &StopHandle) -> bool {
    let mut remaining = countdown.as_secs();
    while remaining > 0 {
        if stop.is_stop_requested() {
            return false;
        }
        info!("Starting in {}...", remaining);
        sleep(Duration::from_secs(1));
        remaining -= 1;
    }
    !stop.is_stop_requested()
}

fn print_banner(config: &MonitorConfig) {
    println!("queue-clicker {}", env!("CARGO_PKG_VERSION"));
    if config.use_ocr {
        println!("  Clicks a blue button labelled: {}", config.keywords.join(", "));
    } else {
        println!("  OCR off: clicks the first blue button found");
    }
    println!("  Checks the screen every {}s", config.check_interval);
    println!("  Switch to the window with the button, then wait.");
    println!("  Press Ctrl+C to stop.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_countdown_starts_immediately() {
        assert!(wait_countdown(Duration::ZERO, &StopHandle::new()));
    }

    #[test]
    fn test_stop_before_countdown_cancels() {
        let stop = StopHandle::new();
        stop.stop();
        // Returns before the first one-second sleep
        assert!(!wait_countdown(Duration::from_secs(30), &stop));
    }

    #[test]
    fn test_cancelled_countdown_never_touches_the_screen() {
        let stop = StopHandle::new();
        stop.stop();

        let outcome = watch_blocking(
            MonitorConfig::default(),
            std::env::temp_dir(),
            Duration::from_secs(5),
            stop,
        )
        .unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
    }
}

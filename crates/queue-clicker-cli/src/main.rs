//! queue-clicker CLI entry point.

mod args;
mod backend;
mod detect;
mod dump;
mod settings;
mod watch;

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use queue_clicker_core::config::MonitorConfig;
use queue_clicker_core::error::Error as CoreError;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::args::{Cli, Commands};
use crate::settings::SettingsError;

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config_path = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Watch(args) => watch::run(config_path, args),
        Commands::Detect(args) => detect::run(config_path, args),
        Commands::Defaults => print_defaults(),
    };

    if let Err(e) = result {
        eprintln!("{}", render_failure(&e));
        std::process::exit(1);
    }
}

/// The error chain on one line, plus a hint when a pipeline error is behind
/// it. Fatal monitor errors are already in the log by the time they get here.
fn render_failure(e: &anyhow::Error) -> String {
    match core_error(e) {
        Some(core) => format!("Error: {:#}\nHint: {}", e, core.suggestion()),
        None => format!("Error: {:#}", e),
    }
}

/// First pipeline error anywhere in the chain, including one wrapped by a
/// settings error.
fn core_error(e: &anyhow::Error) -> Option<&CoreError> {
    e.chain().find_map(|cause| {
        cause
            .downcast_ref::<CoreError>()
            .or_else(|| cause.downcast_ref::<SettingsError>().and_then(SettingsError::core))
    })
}

/// Stderr logging filtered by `RUST_LOG` (INFO by default), plus an
/// append-only plain-text copy in the log file unless disabled.
fn init_tracing(cli: &Cli) {
    let log_path = if cli.no_log_file {
        None
    } else {
        cli.log_file.clone().or_else(settings::default_log_path)
    };

    let mut file_error = None;
    let file_layer = match log_path {
        Some(path) => match open_log_file(&path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            ),
            Err(e) => {
                file_error = Some(format!("cannot open log file {}: {}", path.display(), e));
                None
            }
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if let Some(message) = file_error {
        warn!("{}, logging to stderr only", message);
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn print_defaults() -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&MonitorConfig::default())?);
    Ok(())
}

/// Wait for SIGTERM signal (Unix only).
///
/// If signal registration fails, logs a warning and waits indefinitely.
#[cfg(unix)]
async fn sigterm() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!(
                "Failed to register SIGTERM handler: {}, only Ctrl+C will stop the watch",
                e
            );
            std::future::pending::<()>().await;
        }
    }
}

/// SIGTERM is not available on non-Unix platforms; use a never-completing future.
#[cfg(not(unix))]
async fn sigterm() {
    std::future::pending::<()>().await;
}

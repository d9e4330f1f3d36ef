//! CLI argument parsing with clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Watch the screen for a "join queue" button and click it once.
///
/// Finds button-blue patches of button-like shape, optionally confirms the
/// label with tesseract OCR, then moves the pointer there and clicks.
#[derive(Debug, Parser)]
#[command(name = "queue-clicker", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON config file [default: <config dir>/queue-clicker/config.json if present]
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Append logs to this file [default: <data dir>/queue-clicker/queue-clicker.log]
    #[arg(long, global = true, value_name = "FILE", conflicts_with = "no_log_file")]
    pub log_file: Option<PathBuf>,

    /// Log to stderr only
    #[arg(long, global = true)]
    pub no_log_file: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Count down, then poll the screen until the button is clicked
    #[command(after_help = "\
Examples:
  queue-clicker watch                          # OCR-verified, 5s countdown
  queue-clicker watch --no-ocr                 # Click the first blue button found
  queue-clicker watch -k 'ready up' -k ready   # Custom keywords
  queue-clicker watch --interval 1 --countdown 0
  queue-clicker watch --debug                  # Save annotated frames

Press Ctrl+C to stop watching.")]
    Watch(WatchArgs),

    /// Run detection on a saved screenshot and print candidates as JSON
    #[command(after_help = "\
Examples:
  queue-clicker detect shot.png                # Candidate regions only
  queue-clicker detect shot.png --verify       # Also read each label with OCR")]
    Detect(DetectArgs),

    /// Print the default configuration as JSON
    Defaults,
}

#[derive(Debug, clap::Args)]
pub struct WatchArgs {
    /// Seconds to wait before the first capture
    #[arg(long, default_value_t = 5, value_name = "SECS")]
    pub countdown: u64,

    /// Seconds between screen checks
    #[arg(short, long, value_name = "SECS")]
    pub interval: Option<f64>,

    /// Match confidence threshold (0.0-1.0)
    #[arg(long, value_name = "VALUE")]
    pub confidence: Option<f64>,

    /// Keyword that confirms a button; repeat to give several (replaces the defaults)
    #[arg(short, long = "keyword", value_name = "TEXT")]
    pub keywords: Vec<String>,

    /// Click the first candidate without reading its label
    #[arg(long)]
    pub no_ocr: bool,

    /// Save every frame with candidates as annotated PNGs
    #[arg(long)]
    pub debug: bool,

    /// Where debug frames go [default: <cache dir>/queue-clicker/debug]
    #[arg(long, value_name = "DIR", requires = "debug")]
    pub debug_dir: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct DetectArgs {
    /// Screenshot to analyse (PNG, JPEG, ...)
    pub image: PathBuf,

    /// Read each candidate's label with OCR and report keyword matches
    #[arg(long)]
    pub verify: bool,

    /// Keyword for --verify; repeat to give several (replaces the defaults)
    #[arg(short, long = "keyword", value_name = "TEXT")]
    pub keywords: Vec<String>,
}

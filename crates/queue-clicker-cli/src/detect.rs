//! The `detect` command: run detection on a saved screenshot.

use std::path::Path;

use anyhow::Context;
use image::RgbImage;
use queue_clicker_core::config::MonitorConfig;
use queue_clicker_core::detect::{ColorDetector, Region};
use queue_clicker_core::verify::TextVerifier;
use serde::Serialize;

use crate::args::DetectArgs;
use crate::backend::Tesseract;
use crate::settings;

#[derive(Debug, Serialize)]
pub struct DetectReport {
    pub width: u32,
    pub height: u32,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Serialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub region: Region,
    pub center: (u32, u32),
    /// Keyword match, present only when verification ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<bool>,
}

pub fn run(config_path: Option<&Path>, args: &DetectArgs) -> anyhow::Result<()> {
    let mut config = settings::load(config_path)?;
    if !args.keywords.is_empty() {
        config.keywords = args.keywords.clone();
    }
    config.validate().context("invalid configuration")?;

    let image = image::open(&args.image)
        .with_context(|| format!("failed to open {}", args.image.display()))?
        .to_rgb8();
    let verifier = args
        .verify
        .then(|| Tesseract::verifier(config.verifier.clone()));

    let report = analyse(&image, &config, verifier.as_ref());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Detect candidates in `image` and, given a verifier, check each label.
pub fn analyse(
    image: &RgbImage,
    config: &MonitorConfig,
    verifier: Option<&TextVerifier>,
) -> DetectReport {
    let keywords = config.normalized_keywords();
    let candidates = ColorDetector::new(config.detector.clone())
        .detect(image)
        .into_iter()
        .map(|region| Candidate {
            region,
            center: region.center(),
            matched: verifier.map(|v| v.verify(image, &region, &keywords)),
        })
        .collect();

    DetectReport {
        width: image.width(),
        height: image.height(),
        candidates,
    }
}

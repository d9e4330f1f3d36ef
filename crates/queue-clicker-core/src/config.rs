//! Tuning knobs for detection, verification, clicking and polling.
//!
//! Every struct deserializes with per-field defaults, so a config file only
//! needs to name the values it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest hue value in the 8-bit convention (hue is stored halved, 0..=179).
pub const MAX_HUE: u8 = 179;

/// Upper bound for each step of the click sequence.
pub const MAX_CLICK_STEP_MS: u64 = 10_000;

/// A hue/saturation/value triple in 8-bit convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    #[must_use]
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

/// Inclusive acceptance band for "button blue".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    pub lower: Hsv,
    pub upper: Hsv,
}

impl ColorRange {
    #[must_use]
    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.lower.h..=self.upper.h).contains(&hsv.h)
            && (self.lower.s..=self.upper.s).contains(&hsv.s)
            && (self.lower.v..=self.upper.v).contains(&hsv.v)
    }
}

impl Default for ColorRange {
    fn default() -> Self {
        Self {
            lower: Hsv::new(100, 100, 100),
            upper: Hsv::new(130, 255, 255),
        }
    }
}

/// Geometric filters applied to every extracted contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub color: ColorRange,
    /// Enclosed contour area must be strictly greater than this.
    pub min_area: f64,
    /// Enclosed contour area must be strictly less than this.
    pub max_area: f64,
    /// Width/height must be strictly greater than this.
    pub min_aspect: f64,
    /// Width/height must be strictly less than this.
    pub max_aspect: f64,
    /// Bounding box width floor, inclusive.
    pub min_width: u32,
    /// Bounding box height floor, inclusive.
    pub min_height: u32,
    /// Fraction of the frame height at the top where nothing is accepted.
    pub top_exclusion: f64,
    /// Fraction of the frame height at the bottom where nothing is accepted.
    pub bottom_exclusion: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            color: ColorRange::default(),
            min_area: 2000.0,
            max_area: 50000.0,
            min_aspect: 2.0,
            max_aspect: 8.0,
            min_width: 60,
            min_height: 20,
            top_exclusion: 0.2,
            bottom_exclusion: 0.1,
        }
    }
}

/// Cropping and binarization used before text recognition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Pixels added on every side of the candidate before cropping.
    pub margin: u32,
    /// Intensities strictly above this become white, the rest black.
    pub threshold: u8,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            margin: 20,
            threshold: 150,
        }
    }
}

/// Timing of the move → click → press/release sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickConfig {
    pub move_duration_ms: u64,
    pub click_duration_ms: u64,
}

impl ClickConfig {
    #[must_use]
    pub fn move_duration(&self) -> Duration {
        Duration::from_millis(self.move_duration_ms)
    }

    #[must_use]
    pub fn click_duration(&self) -> Duration {
        Duration::from_millis(self.click_duration_ms)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("move_duration_ms", self.move_duration_ms),
            ("click_duration_ms", self.click_duration_ms),
        ] {
            if value > MAX_CLICK_STEP_MS {
                return Err(Error::invalid_config(format!(
                    "click.{name} must be at most {MAX_CLICK_STEP_MS}, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            move_duration_ms: 200,
            click_duration_ms: 100,
        }
    }
}

fn default_keywords() -> Vec<String> {
    ["join queue", "queue", "join", "enter queue"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Everything the monitor loop is constructed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between polls.
    pub check_interval: f64,
    /// Reserved match threshold. Part of the construction contract, not used
    /// by the color detector.
    pub confidence: f64,
    /// Lowercase phrases, any one of which confirms a candidate.
    pub keywords: Vec<String>,
    /// Require a keyword match before clicking. When off, the first candidate
    /// of a frame is clicked.
    pub use_ocr: bool,
    /// Hand every frame with candidates to the diagnostic inspector.
    pub debug: bool,
    pub detector: DetectorConfig,
    pub verifier: VerifierConfig,
    pub click: ClickConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: 0.5,
            confidence: 0.7,
            keywords: default_keywords(),
            use_ocr: true,
            debug: false,
            detector: DetectorConfig::default(),
            verifier: VerifierConfig::default(),
            click: ClickConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Poll interval as a `Duration`. Values `validate` would reject
    /// saturate instead of panicking.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.check_interval).unwrap_or(Duration::MAX)
    }

    /// Keywords lowercased, which is the form the verifier compares against.
    #[must_use]
    pub fn normalized_keywords(&self) -> Vec<String> {
        self.keywords.iter().map(|k| k.trim().to_lowercase()).collect()
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.check_interval <= 0.0
            || Duration::try_from_secs_f64(self.check_interval).is_err()
        {
            return Err(Error::invalid_config(format!(
                "check_interval must be a positive number of seconds, got {}",
                self.check_interval
            )));
        }
        self.click.validate()?;
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(Error::invalid_config(format!(
                "confidence must be between 0.0 and 1.0, got {}",
                self.confidence
            )));
        }
        if self.use_ocr && self.normalized_keywords().iter().all(String::is_empty) {
            return Err(Error::invalid_config(
                "keywords must not be empty when OCR verification is enabled",
            ));
        }
        self.detector.validate()
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        let ColorRange { lower, upper } = self.color;
        if lower.h > upper.h || lower.s > upper.s || lower.v > upper.v {
            return Err(Error::invalid_config(format!(
                "color lower bound {lower:?} exceeds upper bound {upper:?}"
            )));
        }
        if upper.h > MAX_HUE {
            return Err(Error::invalid_config(format!(
                "hue bounds are 0..={MAX_HUE}, got {}",
                upper.h
            )));
        }
        if !(self.min_area >= 0.0 && self.min_area < self.max_area) {
            return Err(Error::invalid_config(format!(
                "area bounds must satisfy 0 <= min < max, got {}..{}",
                self.min_area, self.max_area
            )));
        }
        if !(self.min_aspect >= 0.0 && self.min_aspect < self.max_aspect) {
            return Err(Error::invalid_config(format!(
                "aspect bounds must satisfy 0 <= min < max, got {}..{}",
                self.min_aspect, self.max_aspect
            )));
        }
        let band = 0.0..1.0;
        if !band.contains(&self.top_exclusion)
            || !band.contains(&self.bottom_exclusion)
            || self.top_exclusion + self.bottom_exclusion >= 1.0
        {
            return Err(Error::invalid_config(format!(
                "exclusion bands must be fractions in [0, 1) leaving part of the frame, got top {} bottom {}",
                self.top_exclusion, self.bottom_exclusion
            )));
        }
        Ok(())
    }
}

//! Keyword confirmation of candidate buttons via text recognition.
//!
//! Recognition is a capability that may be missing at runtime (no OCR engine
//! installed). That is decided once, when the [`TextVerifier`] is built:
//! either it holds a working [`TextRecognizer`], or it is the stub variant
//! that confirms nothing. A missing engine therefore never turns into
//! "click whatever is blue"; whether unverified clicks are acceptable is the
//! monitor's `use_ocr` decision, not the verifier's.

use image::imageops;
use image::{GrayImage, RgbImage};
use imageproc::contrast::{self, ThresholdType};
use tracing::debug;

use crate::config::VerifierConfig;
use crate::detect::Region;
use crate::error::Result;

/// Extracts text from a single-channel image.
pub trait TextRecognizer {
    /// Engine name for log messages.
    fn name(&self) -> &str;

    fn recognize(&self, image: &GrayImage) -> Result<String>;
}

/// Whether text recognition is usable in this process.
pub enum Recognition {
    Available(Box<dyn TextRecognizer>),
    Unavailable { reason: String },
}

impl std::fmt::Debug for Recognition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recognition::Available(recognizer) => f
                .debug_tuple("Available")
                .field(&recognizer.name())
                .finish(),
            Recognition::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

#[derive(Debug)]
pub struct TextVerifier {
    recognition: Recognition,
    config: VerifierConfig,
}

impl TextVerifier {
    #[must_use]
    pub fn new(recognizer: Box<dyn TextRecognizer>, config: VerifierConfig) -> Self {
        Self {
            recognition: Recognition::Available(recognizer),
            config,
        }
    }

    /// A verifier that reports no match for every region.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>, config: VerifierConfig) -> Self {
        Self {
            recognition: Recognition::Unavailable {
                reason: reason.into(),
            },
            config,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self.recognition, Recognition::Available(_))
    }

    #[must_use]
    pub fn recognition(&self) -> &Recognition {
        &self.recognition
    }

    /// Prepare the padded, binarized crop that is handed to the recognizer.
    #[must_use]
    pub fn prepare(&self, image: &RgbImage, region: &Region) -> GrayImage {
        let crop = crop_with_margin(image, region, self.config.margin);
        binarize(&imageops::grayscale(&crop), self.config.threshold)
    }

    /// Whether the text on and around `region` contains any of `keywords`.
    ///
    /// Recognition failures count as "no match" for this region only.
    pub fn verify(&self, image: &RgbImage, region: &Region, keywords: &[String]) -> bool {
        let recognizer = match &self.recognition {
            Recognition::Available(recognizer) => recognizer,
            Recognition::Unavailable { reason } => {
                debug!(
                    "Text recognition unavailable ({}), skipping verification",
                    reason
                );
                return false;
            }
        };

        let prepared = self.prepare(image, region);
        let text = match recognizer.recognize(&prepared) {
            Ok(text) => text,
            Err(e) => {
                debug!("{} error on {:?}: {}", recognizer.name(), region, e);
                return false;
            }
        };

        let matched = matches_keywords(&text, keywords);
        debug!(
            "{} read {:?} at {:?}, match: {}",
            recognizer.name(),
            text.trim(),
            region,
            matched
        );
        matched
    }
}

/// Case-insensitive substring match of any keyword in `text`.
///
/// Whitespace runs (including line breaks the recognizer inserts between
/// words) count as a single space.
#[must_use]
pub fn matches_keywords(text: &str, keywords: &[String]) -> bool {
    let normalized = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    keywords.iter().any(|keyword| {
        let keyword = keyword.trim().to_lowercase();
        !keyword.is_empty() && normalized.contains(&keyword)
    })
}

/// Crop `region` grown by `margin` on each side, clamped to the image.
#[must_use]
pub fn crop_with_margin(image: &RgbImage, region: &Region, margin: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let x1 = region.x.saturating_sub(margin).min(width);
    let y1 = region.y.saturating_sub(margin).min(height);
    let x2 = region
        .x
        .saturating_add(region.width)
        .saturating_add(margin)
        .min(width);
    let y2 = region
        .y
        .saturating_add(region.height)
        .saturating_add(margin)
        .min(height);

    imageops::crop_imm(image, x1, y1, x2 - x1, y2 - y1).to_image()
}

/// Pixels strictly above `threshold` become white, the rest black.
#[must_use]
pub fn binarize(image: &GrayImage, threshold: u8) -> GrayImage {
    contrast::threshold(image, threshold, ThresholdType::Binary)
}

//! Text recognition by shelling out to the tesseract binary.
//!
//! rusty-tesseract drives the `tesseract` executable, which reads images
//! from disk, so each crop goes through a temporary PNG.

use std::collections::HashMap;

use image::GrayImage;
use queue_clicker_core::config::VerifierConfig;
use queue_clicker_core::error::{Error, Result};
use queue_clicker_core::verify::{TextRecognizer, TextVerifier};
use rusty_tesseract::{Args, Image};
use tracing::{info, warn};

pub struct Tesseract {
    args: Args,
}

impl Tesseract {
    pub fn new() -> Self {
        Self {
            args: Args {
                lang: "eng".to_string(),
                config_variables: HashMap::new(),
                dpi: Some(150),
                psm: Some(6), // Single uniform block of text
                oem: Some(3),
            },
        }
    }

    /// A verifier backed by tesseract, or the no-match stub when the binary
    /// cannot be run.
    pub fn verifier(config: VerifierConfig) -> TextVerifier {
        match rusty_tesseract::get_tesseract_version() {
            Ok(version) => {
                info!(
                    "Using {}",
                    version.lines().next().unwrap_or("tesseract").trim()
                );
                TextVerifier::new(Box::new(Self::new()), config)
            }
            Err(e) => {
                warn!("Tesseract is not available: {:?}", e);
                TextVerifier::unavailable(format!("tesseract not available: {e:?}"), config)
            }
        }
    }
}

impl Default for Tesseract {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for Tesseract {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &GrayImage) -> Result<String> {
        let file = tempfile::Builder::new()
            .prefix("queue-clicker-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| Error::recognition(format!("failed to create temp file: {e}")))?;
        image
            .save(file.path())
            .map_err(|e| Error::recognition(format!("failed to write crop: {e}")))?;

        let input = Image::from_path(file.path())
            .map_err(|e| Error::recognition(format!("failed to load crop: {e:?}")))?;
        rusty_tesseract::image_to_string(&input, &self.args)
            .map_err(|e| Error::recognition(format!("{e:?}")))
    }
}

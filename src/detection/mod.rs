pub mod annotate;
pub mod postprocessing;
pub mod preprocessing;
pub mod yolo;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader};

use crate::config::ModelConfig;
use crate::scoring::Scorer;
use yolo::{YoloClassifier, YoloDetector};

pub use yolo::load_model;

/// Load both models named in `config` and wire them into a scorer
pub fn load_scorer(config: &ModelConfig) -> Result<Scorer> {
    config.validate()?;
    let detector = YoloDetector::load(config)?;
    let classifier = YoloClassifier::load(config)?;
    log::info!("Models loaded (input size {})", config.input_size);
    Ok(Scorer::new(Arc::new(detector), Arc::new(classifier)))
}

/// Decode an image file, guessing the format from its contents
pub fn decode_image(path: &Path) -> Result<DynamicImage> {
    ImageReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read {}", path.display()))?
        .decode()
        .with_context(|| format!("Failed to decode {}", path.display()))
}

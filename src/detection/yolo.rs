use std::path::Path;

use anyhow::{Context, Result};
use image::DynamicImage;
use rten::Model;
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;

use crate::config::{MAX_DETECTIONS, ModelConfig};
use crate::detection::{postprocessing, preprocessing};
use crate::models::{Classification, Detection};
use crate::scoring::{Classifier, Detector};

/// Load an `.rten` model file, failing with the expected location when it is missing
pub fn load_model(path: &Path) -> Result<Model> {
    if !path.exists() {
        anyhow::bail!(
            "Model not found at {}. Convert the trained weights to .rten and pass the path explicitly.",
            path.display()
        );
    }
    log::info!("Loading model {}", path.display());
    Model::load_file(path).with_context(|| format!("Failed to load model {}", path.display()))
}

/// YOLOv8 object detector run through rten
pub struct YoloDetector {
    model: Model,
    input_size: u32,
    confidence_threshold: f32,
    iou_threshold: f32,
}

impl YoloDetector {
    pub fn new(model: Model, config: &ModelConfig) -> Self {
        Self {
            model,
            input_size: config.input_size,
            confidence_threshold: config.confidence_threshold,
            iou_threshold: config.iou_threshold,
        }
    }

    pub fn load(config: &ModelConfig) -> Result<Self> {
        Ok(Self::new(load_model(&config.detector_path)?, config))
    }
}

impl Detector for YoloDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let letterboxed = preprocessing::letterbox(image, self.input_size);
        let size = self.input_size as usize;
        let input = NdTensor::from_data([1, 3, size, size], preprocessing::to_chw(&letterboxed.image));

        let output: NdTensor<f32, 3> = self
            .model
            .run_one(input.view().into(), None)
            .map_err(|e| anyhow::anyhow!("Failed to run detector: {}", e))?
            .try_into()
            .map_err(|e| anyhow::anyhow!("Unexpected detector output: {:?}", e))?;

        let [_, channels, anchors] = output.shape();
        let candidates = postprocessing::decode_boxes(
            &output.to_vec(),
            channels,
            anchors,
            self.confidence_threshold,
            &letterboxed,
            (image.width(), image.height()),
        )?;
        log::trace!("{} candidates above {}", candidates.len(), self.confidence_threshold);

        Ok(postprocessing::nms(candidates, self.iou_threshold, MAX_DETECTIONS))
    }

    fn name(&self) -> &str {
        "Stage Detector"
    }
}

/// YOLOv8 image classifier run through rten
pub struct YoloClassifier {
    model: Model,
    input_size: u32,
}

impl YoloClassifier {
    pub fn new(model: Model, config: &ModelConfig) -> Self {
        Self {
            model,
            input_size: config.input_size,
        }
    }

    pub fn load(config: &ModelConfig) -> Result<Self> {
        Ok(Self::new(load_model(&config.classifier_path)?, config))
    }
}

impl Classifier for YoloClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<Classification> {
        let cropped = preprocessing::center_crop(image, self.input_size);
        let size = self.input_size as usize;
        let input = NdTensor::from_data([1, 3, size, size], preprocessing::to_chw(&cropped));

        let output: NdTensor<f32, 2> = self
            .model
            .run_one(input.view().into(), None)
            .map_err(|e| anyhow::anyhow!("Failed to run classifier: {}", e))?
            .try_into()
            .map_err(|e| anyhow::anyhow!("Unexpected classifier output: {:?}", e))?;

        let row = output.to_vec();
        postprocessing::top1(&row)
    }

    fn name(&self) -> &str {
        "Stage Classifier"
    }
}

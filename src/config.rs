use std::path::PathBuf;

pub const DEFAULT_DETECTOR_MODEL: &str = "detect-best320.rten";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "cls_best320.rten";
pub const DEFAULT_INPUT_SIZE: u32 = 320;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;
pub const MAX_DETECTIONS: usize = 300;

/// Where the weight files live and how the models are run
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub detector_path: PathBuf,
    pub classifier_path: PathBuf,
    /// Square model input edge in pixels
    pub input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            detector_path: PathBuf::from(DEFAULT_DETECTOR_MODEL),
            classifier_path: PathBuf::from(DEFAULT_CLASSIFIER_MODEL),
            input_size: DEFAULT_INPUT_SIZE,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.input_size == 0 || self.input_size % 32 != 0 {
            anyhow::bail!("Input size must be a positive multiple of 32, got {}", self.input_size);
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            anyhow::bail!(
                "Confidence threshold must be within [0, 1], got {}",
                self.confidence_threshold
            );
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            anyhow::bail!("IoU threshold must be within [0, 1], got {}", self.iou_threshold);
        }
        Ok(())
    }
}

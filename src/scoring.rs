use std::sync::Arc;

use anyhow::{Context, Result};
use image::DynamicImage;

use crate::models::{Classification, Detection, ScoreReport, StageTable};

/// Object detector over a full image
pub trait Detector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>>;

    /// Human-readable name (used in log output)
    fn name(&self) -> &str;
}

/// Image classifier returning its top-1 prediction
pub trait Classifier: Send + Sync {
    fn classify(&self, image: &DynamicImage) -> Result<Classification>;

    fn name(&self) -> &str;
}

/// Combines detector and classifier outputs into a single severity score
#[derive(Clone)]
pub struct Scorer {
    detector: Arc<dyn Detector>,
    classifier: Arc<dyn Classifier>,
    table: StageTable,
}

impl Scorer {
    pub fn new(detector: Arc<dyn Detector>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            detector,
            classifier,
            table: StageTable::default(),
        }
    }

    pub fn with_table(mut self, table: StageTable) -> Self {
        self.table = table;
        self
    }

    pub fn table(&self) -> &StageTable {
        &self.table
    }

    /// Score one decoded image
    pub fn score(&self, image: &DynamicImage) -> Result<ScoreReport> {
        let detections = self
            .detector
            .detect(image)
            .with_context(|| format!("{} failed", self.detector.name()))?;
        log::debug!("{} returned {} boxes", self.detector.name(), detections.len());

        let (detection_label, detection_score) = best_detection(&self.table, &detections);

        let classification = self
            .classifier
            .classify(image)
            .with_context(|| format!("{} failed", self.classifier.name()))?;

        // Classifier confidence is reported only, not used as a weight.
        let classification_label = StageTable::label_for_class(classification.class_index);
        let classification_score = self.table.severity(&classification_label);

        let final_score = (detection_score + f64::from(classification_score)) / 2.0;
        log::debug!(
            "detection {detection_label:?} {detection_score:.3}, classification {classification_label} {classification_score}, final {final_score:.3}"
        );

        Ok(ScoreReport {
            detection_label,
            detection_score,
            classification_label,
            classification_score,
            final_score,
            classification_confidence: classification.confidence,
            detections,
        })
    }
}

/// Highest `severity * confidence` over all boxes, with its stage label,
/// computed in `f64`.
/// Only a strictly greater score replaces the current best.
pub fn best_detection(table: &StageTable, detections: &[Detection]) -> (String, f64) {
    let mut best_label = String::new();
    let mut best_score = 0.0f64;

    for detection in detections {
        let label = StageTable::label_for_class(detection.class_index);
        // f32 rounding here can move a score across a color boundary
        let score = f64::from(table.severity(&label)) * f64::from(detection.confidence);
        if score > best_score {
            best_score = score;
            best_label = label;
        }
    }

    (best_label, best_score)
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::testing::{FixedClassifier, FixedDetector};
    use crate::models::{BoundingBox, Severity};

    fn det(class_index: usize, confidence: f32) -> Detection {
        Detection {
            class_index,
            confidence,
            bbox: BoundingBox { x1: 0.0, y1: 0.0, x2: 1.0, y2: 1.0 },
        }
    }

    fn scorer(detections: Vec<Detection>, class_index: usize, confidence: f32) -> Scorer {
        Scorer::new(
            Arc::new(FixedDetector(detections)),
            Arc::new(FixedClassifier(Classification { class_index, confidence })),
        )
    }

    fn blank() -> DynamicImage {
        DynamicImage::new_rgb8(4, 4)
    }

    #[test]
    fn no_detections_gives_zero_and_empty_label() {
        let (label, score) = best_detection(&StageTable::default(), &[]);
        assert_eq!(label, "");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn best_detection_weights_by_confidence() {
        let table = StageTable::default();
        // stage4 * 0.3 = 1.2 loses to stage2 * 0.9 = 1.8
        let (label, score) = best_detection(&table, &[det(3, 0.3), det(1, 0.9)]);
        assert_eq!(label, "stage2");
        assert!((score - 1.8).abs() < 1e-6);
    }

    #[test]
    fn ties_keep_first_box() {
        let table = StageTable::default();
        // stage1 * 1.0 == stage2 * 0.5
        let (label, _) = best_detection(&table, &[det(0, 1.0), det(1, 0.5)]);
        assert_eq!(label, "stage1");
    }

    #[test]
    fn unknown_class_never_becomes_best() {
        let (label, score) = best_detection(&StageTable::default(), &[det(9, 0.99)]);
        assert_eq!(label, "");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn classification_confidence_is_not_a_weight() -> Result<()> {
        let low = scorer(Vec::new(), 3, 0.1).score(&blank())?;
        let high = scorer(Vec::new(), 3, 0.99).score(&blank())?;
        assert_eq!(low.classification_score, high.classification_score);
        assert_eq!(low.final_score, high.final_score);
        assert_eq!(low.classification_score, 4);
        assert_eq!(low.final_score, 2.0);
        assert!((low.classification_confidence - 0.1).abs() < 1e-6);
        assert_eq!(low.severity(), Severity::Stable);
        Ok(())
    }

    #[test]
    fn worked_example_lands_in_attention() -> Result<()> {
        let report = scorer(vec![det(1, 0.8)], 2, 0.9).score(&blank())?;
        assert_eq!(report.detection_label, "stage2");
        assert!((report.detection_score - 1.6).abs() < 1e-6);
        assert_eq!(report.classification_label, "stage3");
        assert_eq!(report.classification_score, 3);
        assert!((report.final_score - 2.3).abs() < 1e-6);
        assert_eq!(report.severity(), Severity::Attention);
        assert_eq!(report.detections.len(), 1);
        Ok(())
    }

    #[test]
    fn weighting_does_not_round_up_to_follow_up() -> Result<()> {
        // stage2 * 0.7f32 is just under 1.4, so the average is just under 2.7
        let report = scorer(vec![det(1, 0.7)], 3, 0.9).score(&blank())?;
        assert!(report.final_score < 2.7);
        assert_eq!(report.severity(), Severity::Attention);
        Ok(())
    }

    #[test]
    fn final_score_stays_in_range() -> Result<()> {
        let max = scorer(vec![det(3, 1.0)], 3, 1.0).score(&blank())?;
        assert_eq!(max.final_score, 4.0);
        let min = scorer(Vec::new(), 7, 1.0).score(&blank())?;
        assert_eq!(min.final_score, 0.0);
        assert_eq!(min.classification_label, "stage8");
        Ok(())
    }

    #[test]
    fn detector_failure_fails_the_score() {
        struct Broken;
        impl Detector for Broken {
            fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>> {
                anyhow::bail!("model not loaded")
            }
            fn name(&self) -> &str {
                "broken detector"
            }
        }

        let scorer = Scorer::new(
            Arc::new(Broken),
            Arc::new(FixedClassifier(Classification { class_index: 0, confidence: 1.0 })),
        );
        let err = scorer.score(&blank()).unwrap_err();
        assert!(format!("{err:#}").contains("model not loaded"));
        assert!(err.to_string().contains("broken detector"));
    }
}

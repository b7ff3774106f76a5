//! Integration tests for scoring through the public API with canned models.
//!
//! Tests cover:
//! - The single-image scenario and max-over-boxes detection score
//! - Scores computed right at the 2.0 and 2.7 color boundaries
//! - Custom stage tables, classifier failure and JSON output

mod common;

use std::sync::Arc;

use common::*;
use image::DynamicImage;
use stagescore::{
    BoundingBox, Classification, Classifier, Detection, Detector, ScoreReport, Scorer, Severity,
    StageTable, decode_image,
};

fn blank_image() -> DynamicImage {
    DynamicImage::new_rgb8(32, 32)
}

fn detection(class_index: usize, confidence: f32) -> Detection {
    Detection {
        class_index,
        confidence,
        bbox: BoundingBox { x1: 1.0, y1: 1.0, x2: 8.0, y2: 8.0 },
    }
}

/// Detector returning the same boxes for every image
struct CannedDetector(Vec<Detection>);

impl Detector for CannedDetector {
    fn detect(&self, _image: &DynamicImage) -> anyhow::Result<Vec<Detection>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "canned detector"
    }
}

/// Classifier returning the same top-1 for every image
struct CannedClassifier(Classification);

impl Classifier for CannedClassifier {
    fn classify(&self, _image: &DynamicImage) -> anyhow::Result<Classification> {
        Ok(self.0)
    }

    fn name(&self) -> &str {
        "canned classifier"
    }
}

/// Classifier that always fails, like a model given an unusable input
struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn classify(&self, _image: &DynamicImage) -> anyhow::Result<Classification> {
        anyhow::bail!("inference failed")
    }

    fn name(&self) -> &str {
        "failing classifier"
    }
}

fn canned_scorer(detections: Vec<Detection>, top1: usize, top1_confidence: f32) -> Scorer {
    Scorer::new(
        Arc::new(CannedDetector(detections)),
        Arc::new(CannedClassifier(Classification {
            class_index: top1,
            confidence: top1_confidence,
        })),
    )
}

#[test]
fn test_single_image_scenario_needs_attention() -> anyhow::Result<()> {
    let dir = create_folder(&["only.png"], &[]);
    let mut session = Session::default();
    let path = session.open(&dir.path().join("only.png"))?;

    let scorer = canned_scorer(vec![detection(1, 0.8)], 2, 0.9);
    let report: ScoreReport = scorer.score(&decode_image(&path)?)?;

    assert_eq!(report.detection_label, "stage2");
    assert!((report.detection_score - 1.6).abs() < 1e-6);
    assert_eq!(report.classification_label, "stage3");
    assert_eq!(report.classification_score, 3);
    assert!((report.final_score - 2.3).abs() < 1e-6);
    assert_eq!(report.severity(), Severity::Attention);
    assert_eq!(report.severity().message(), "needs attention");
    Ok(())
}

#[test]
fn test_detection_score_is_max_weighted_severity() -> anyhow::Result<()> {
    let detections = vec![detection(0, 0.99), detection(3, 0.6), detection(2, 0.7)];
    let report = canned_scorer(detections, 0, 0.5).score(&blank_image())?;

    // stage4 * 0.6 = 2.4 beats stage3 * 0.7 = 2.1 and stage1 * 0.99
    assert_eq!(report.detection_label, "stage4");
    assert!((report.detection_score - 2.4).abs() < 1e-6);
    assert!((report.final_score - 1.7).abs() < 1e-6);
    assert_eq!(report.severity(), Severity::Stable);
    Ok(())
}

#[test]
fn test_no_detections_scores_classifier_alone() -> anyhow::Result<()> {
    let report = canned_scorer(Vec::new(), 3, 0.2).score(&blank_image())?;

    assert_eq!(report.detection_label, "");
    assert_eq!(report.detection_score, 0.0);
    assert_eq!(report.final_score, 2.0);
    assert_eq!(report.severity(), Severity::Stable);
    Ok(())
}

#[test]
fn test_high_scores_recommend_follow_up() -> anyhow::Result<()> {
    let report = canned_scorer(vec![detection(3, 0.9)], 3, 0.1).score(&blank_image())?;

    assert!((report.final_score - 3.8).abs() < 1e-6);
    assert_eq!(report.severity(), Severity::FollowUp);
    assert_eq!(report.severity().message(), "recommend clinical follow-up");
    Ok(())
}

#[test]
fn test_score_just_under_follow_up_stays_yellow() -> anyhow::Result<()> {
    // 0.7f32 sits just below 0.7, so stage2 * 0.7 with a stage4 top-1
    // averages to slightly under 2.7
    let report = canned_scorer(vec![detection(1, 0.7)], 3, 0.9).score(&blank_image())?;

    assert_eq!(report.detection_score, 2.0 * f64::from(0.7f32));
    assert!(report.final_score < 2.7, "got {}", report.final_score);
    assert_eq!(report.severity(), Severity::Attention);
    assert!(report.summary_line("edge.png").ends_with("Final Score: 2.70"));
    Ok(())
}

#[test]
fn test_score_at_follow_up_boundary_is_red() -> anyhow::Result<()> {
    // stage3 * 0.8f32 is a hair above 2.4; with a stage3 top-1 the average reaches 2.7
    let report = canned_scorer(vec![detection(2, 0.8)], 2, 0.6).score(&blank_image())?;

    assert!(report.final_score >= 2.7, "got {}", report.final_score);
    assert!((report.final_score - 2.7).abs() < 1e-6);
    assert_eq!(report.severity(), Severity::FollowUp);
    Ok(())
}

#[test]
fn test_computed_score_of_exactly_two_is_green() -> anyhow::Result<()> {
    // stage4 * 0.5 = 2.0, stage2 top-1 = 2
    let report = canned_scorer(vec![detection(3, 0.5)], 1, 0.9).score(&blank_image())?;

    assert_eq!(report.final_score, 2.0);
    assert_eq!(report.severity(), Severity::Stable);
    assert_eq!(report.severity().message(), "condition is stable");
    Ok(())
}

#[test]
fn test_custom_stage_table_changes_severities() -> anyhow::Result<()> {
    let table = StageTable::new([("stage1", 4), ("stage2", 0)]);
    let scorer = canned_scorer(vec![detection(0, 0.5)], 1, 0.9).with_table(table);
    let report = scorer.score(&blank_image())?;

    assert_eq!(report.detection_score, 2.0);
    assert_eq!(report.classification_score, 0);
    assert_eq!(report.final_score, 1.0);
    Ok(())
}

#[test]
fn test_classifier_failure_aborts_the_image() {
    let scorer = Scorer::new(
        Arc::new(CannedDetector(vec![detection(1, 0.8)])),
        Arc::new(FailingClassifier),
    );

    let result = scorer.score(&blank_image());

    assert!(result.is_err(), "Score must fail when the classifier fails");
    let error_msg = format!("{:#}", result.unwrap_err());
    assert!(error_msg.contains("inference failed"), "got: {}", error_msg);
}

#[test]
fn test_report_serializes_for_json_output() -> anyhow::Result<()> {
    let report = canned_scorer(vec![detection(1, 0.8)], 2, 0.9).score(&blank_image())?;
    let json: serde_json::Value = serde_json::to_value(&report)?;

    assert_eq!(json["detection_label"], "stage2");
    assert_eq!(json["classification_score"], 3);
    assert_eq!(json["detections"].as_array().map(Vec::len), Some(1));
    assert_eq!(
        serde_json::to_value(report.severity())?,
        serde_json::json!("attention")
    );
    Ok(())
}

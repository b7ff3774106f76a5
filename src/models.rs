use serde::Serialize;

/// Axis-aligned box in original image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union <= 0.0 {
            return 0.0;
        }
        intersection / union
    }

    /// Clamp the box to an image of the given size
    pub fn clamp_to(&self, width: u32, height: u32) -> BoundingBox {
        let w = width as f32;
        let h = height as f32;
        BoundingBox {
            x1: self.x1.clamp(0.0, w),
            y1: self.y1.clamp(0.0, h),
            x2: self.x2.clamp(0.0, w),
            y2: self.y2.clamp(0.0, h),
        }
    }
}

/// One box produced by the object detector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub class_index: usize,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Top-1 output of the image classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub class_index: usize,
    pub confidence: f32,
}

/// Fixed mapping from stage labels to integer severities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTable {
    entries: Vec<(String, u8)>,
}

impl StageTable {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u8)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(label, severity)| (label.into(), severity))
                .collect(),
        }
    }

    /// Label a model class index maps to (`0` -> `"stage1"`)
    pub fn label_for_class(class_index: usize) -> String {
        format!("stage{}", class_index + 1)
    }

    /// Severity of a label, 0 when the label is not in the table
    pub fn severity(&self, label: &str) -> u8 {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, severity)| *severity)
            .unwrap_or(0)
    }

    pub fn severity_for_class(&self, class_index: usize) -> u8 {
        self.severity(&Self::label_for_class(class_index))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }
}

impl Default for StageTable {
    fn default() -> Self {
        Self::new([("stage1", 1), ("stage2", 2), ("stage3", 3), ("stage4", 4)])
    }
}

/// Everything the scorer reports for one image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    /// Stage label of the highest scoring box, empty when no box scored
    pub detection_label: String,
    pub detection_score: f64,
    pub classification_label: String,
    pub classification_score: u8,
    pub final_score: f64,
    pub classification_confidence: f32,
    /// Boxes the detector returned, kept for annotation
    pub detections: Vec<Detection>,
}

impl ScoreReport {
    pub fn severity(&self) -> Severity {
        Severity::from_score(self.final_score)
    }

    /// Single result line shown in the viewer and printed by `score`
    pub fn summary_line(&self, image_name: &str) -> String {
        format!(
            "Image: {}, OD Label: {}, OD Score: {:.2}, IC Label: {}, IC Score: {}, IC Confidence: {:.2}, Final Score: {:.2}",
            image_name,
            self.detection_label,
            self.detection_score,
            self.classification_label,
            self.classification_score,
            self.classification_confidence,
            self.final_score,
        )
    }
}

/// Bucket a final score falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Stable,
    Attention,
    FollowUp,
}

impl Severity {
    /// `>= 2.7` is follow-up, `(2.0, 2.7)` attention, everything else stable.
    pub fn from_score(score: f64) -> Self {
        if score >= 2.7 {
            Severity::FollowUp
        } else if score > 2.0 {
            Severity::Attention
        } else {
            Severity::Stable
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Severity::FollowUp => "recommend clinical follow-up",
            Severity::Attention => "needs attention",
            Severity::Stable => "condition is stable",
        }
    }

    /// Indicator color as 8-bit RGB
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Severity::FollowUp => [255, 0, 0],
            Severity::Attention => [255, 255, 0],
            Severity::Stable => [0, 128, 0],
        }
    }
}

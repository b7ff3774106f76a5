pub mod config;
pub mod detection;
pub mod models;
pub mod scoring;
pub mod session;

pub use config::ModelConfig;
pub use detection::{decode_image, load_scorer};
pub use models::{BoundingBox, Classification, Detection, ScoreReport, Severity, StageTable};
pub use scoring::{Classifier, Detector, Scorer};
pub use session::{Session, SessionError};

#[cfg(feature = "gui")]
pub mod gui;

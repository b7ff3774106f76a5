use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};

use stagescore::detection::annotate;
use stagescore::{ModelConfig, decode_image, load_scorer};

#[derive(Parser)]
#[command(name = "stagescore")]
#[command(about = "Score images with a stage detector and classifier")]
struct Cli {
    /// Detector weights (.rten)
    #[arg(long, global = true, value_name = "PATH", default_value = stagescore::config::DEFAULT_DETECTOR_MODEL)]
    detector: PathBuf,

    /// Classifier weights (.rten)
    #[arg(long, global = true, value_name = "PATH", default_value = stagescore::config::DEFAULT_CLASSIFIER_MODEL)]
    classifier: PathBuf,

    /// Square model input size in pixels
    #[arg(long, global = true, default_value_t = stagescore::config::DEFAULT_INPUT_SIZE)]
    input_size: u32,

    /// Minimum detection confidence
    #[arg(long, global = true, default_value_t = stagescore::config::DEFAULT_CONFIDENCE_THRESHOLD)]
    confidence: f32,

    /// IoU threshold for non-maximum suppression
    #[arg(long, global = true, default_value_t = stagescore::config::DEFAULT_IOU_THRESHOLD)]
    iou: f32,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Image to open in the viewer on startup
    #[arg(value_name = "IMAGE")]
    image: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Score a single image without opening a window
    Score {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Save a copy of the image with detection boxes drawn
        #[arg(long, value_name = "FILE")]
        annotate: Option<PathBuf>,
    },
}

impl Cli {
    fn model_config(&self) -> ModelConfig {
        ModelConfig {
            detector_path: self.detector.clone(),
            classifier_path: self.classifier.clone(),
            input_size: self.input_size,
            confidence_threshold: self.confidence,
            iou_threshold: self.iou,
        }
    }
}

fn init_logging(verbose: bool) {
    // RUST_LOG wins unless -v was given
    let mut logger = if !verbose && std::env::var_os("RUST_LOG").is_some() {
        Builder::from_env(Env::default())
    } else {
        let mut b = Builder::new();
        b.filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        });
        b
    };

    logger
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

fn score(
    config: &ModelConfig,
    image_path: PathBuf,
    json: bool,
    annotate_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let scorer = load_scorer(config)?;

    log::info!("Loading image: {}", image_path.display());
    let img = decode_image(&image_path)?;
    log::debug!("Image loaded: {}x{}", img.width(), img.height());

    let report = scorer.score(&img)?;

    if let Some(out) = annotate_path {
        annotate::save_annotated(&img, scorer.table(), &report.detections, &out)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("{}", report.summary_line(&name));
        println!("Status: {}", report.severity().message());
    }

    Ok(())
}

#[cfg(feature = "gui")]
fn view(config: &ModelConfig, image: Option<PathBuf>) -> anyhow::Result<()> {
    let scorer = load_scorer(config)?;
    stagescore::gui::run(scorer, image)?;
    Ok(())
}

#[cfg(not(feature = "gui"))]
fn view(_config: &ModelConfig, _image: Option<PathBuf>) -> anyhow::Result<()> {
    anyhow::bail!("Built without the `gui` feature; use the `score` subcommand")
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let config = args.model_config();
    match args.command {
        Some(Command::Score {
            image_path,
            json,
            annotate: annotate_path,
        }) => score(&config, image_path, json, annotate_path),
        None => view(&config, args.image),
    }
}

use std::path::PathBuf;
use std::process;

use clap::Parser;

use facelens_core::annotation::infrastructure::box_outline_annotator::BoxOutlineAnnotator;
use facelens_core::detection::infrastructure::onnx_ultraface_detector::{
    OnnxUltrafaceDetector, UltrafaceVariant, DEFAULT_CONFIDENCE,
};
use facelens_core::imaging::infrastructure::image_crate_codec::ImageCrateCodec;
use facelens_core::pipeline::detect_image_use_case::DetectImageUseCase;
use facelens_core::shared::constants::DEFAULT_MAX_EDGE;
use facelens_core::shared::model_resolver;

mod assets;
mod routes;
mod state;

use state::AppState;

/// Local web UI for face detection on uploaded images and webcam captures.
#[derive(Parser)]
#[command(name = "facelens-web")]
struct Cli {
    /// Address to serve on.
    #[arg(long, default_value = "127.0.0.1:8501")]
    bind: String,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Detection model: short (selfie-range) or full (full-range).
    #[arg(long, default_value = "full")]
    model: String,

    /// Downscale inputs so the longest edge is at most this many pixels.
    #[arg(long, default_value_t = DEFAULT_MAX_EDGE)]
    max_edge: u32,

    /// Directory with pre-fetched model files (skips downloading).
    #[arg(long)]
    model_dir: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    // Model resolution may download; do it before the runtime starts so the
    // blocking HTTP client never runs on an executor thread.
    let variant = parse_variant(&cli.model)?;
    log::info!("Resolving model: {}", variant.model_name());
    let model_path = model_resolver::resolve(
        variant.model_name(),
        variant.model_url(),
        cli.model_dir.as_deref(),
        Some(Box::new(download_progress)),
    )?;
    eprintln!();

    let detector = OnnxUltrafaceDetector::new(&model_path, variant, cli.confidence)?;
    let pipeline = DetectImageUseCase::new(
        Box::new(ImageCrateCodec::new()),
        Box::new(detector),
        Box::new(BoxOutlineAnnotator::default()),
        Box::new(ImageCrateCodec::new()),
        cli.max_edge,
    );

    let detector_note = format!(
        "UltraFace {} model, confidence {:.2}, max edge {} px",
        variant.label(),
        cli.confidence,
        cli.max_edge
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(AppState::new(pipeline, detector_note), &cli.bind))
}

async fn serve(state: AppState, bind: &str) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    log::info!("listening on http://{bind}");
    eprintln!("FaceLens running on http://{bind}");
    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if cli.max_edge == 0 {
        return Err("Max edge must be a positive number of pixels".into());
    }
    Ok(())
}

fn parse_variant(model: &str) -> Result<UltrafaceVariant, Box<dyn std::error::Error>> {
    match model {
        "short" => Ok(UltrafaceVariant::ShortRange),
        "full" => Ok(UltrafaceVariant::FullRange),
        other => Err(format!("Model must be 'short' or 'full', got '{other}'").into()),
    }
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}

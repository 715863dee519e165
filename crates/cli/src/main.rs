use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use facelens_core::annotation::infrastructure::box_outline_annotator::BoxOutlineAnnotator;
use facelens_core::detection::infrastructure::onnx_ultraface_detector::{
    OnnxUltrafaceDetector, UltrafaceVariant, DEFAULT_CONFIDENCE,
};
use facelens_core::imaging::infrastructure::image_crate_codec::ImageCrateCodec;
use facelens_core::pipeline::detect_image_use_case::{DetectImageUseCase, DetectionReport};
use facelens_core::shared::constants::{DEFAULT_MAX_EDGE, IMAGE_EXTENSIONS};
use facelens_core::shared::model_resolver;

/// Face detection for images: draws bounding boxes around detected faces.
#[derive(Parser)]
#[command(name = "facelens")]
struct Cli {
    /// Input image file.
    input: PathBuf,

    /// Output file for the annotated image (PNG).
    output: PathBuf,

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

    /// Print the detection report as JSON on stdout.
    #[arg(long)]
    json: bool,
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

    let variant = parse_variant(&cli.model)?;
    let mut use_case = build_use_case(&cli, variant)?;

    let bytes = fs::read(&cli.input)?;
    let report = use_case.execute(&bytes)?;

    fs::write(&cli.output, &report.annotated_png)?;
    log::info!(
        "{} faces in {:.1} ms, output written to {}",
        report.faces.len(),
        report.latency_ms,
        cli.output.display()
    );

    if cli.json {
        println!("{}", report_to_json(&report));
    }

    Ok(())
}

fn build_use_case(
    cli: &Cli,
    variant: UltrafaceVariant,
) -> Result<DetectImageUseCase, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {}", variant.model_name());
    let model_path = model_resolver::resolve(
        variant.model_name(),
        variant.model_url(),
        cli.model_dir.as_deref(),
        Some(Box::new(download_progress)),
    )?;
    eprintln!();

    let detector = OnnxUltrafaceDetector::new(&model_path, variant, cli.confidence)?;

    Ok(DetectImageUseCase::new(
        Box::new(ImageCrateCodec::new()),
        Box::new(detector),
        Box::new(BoxOutlineAnnotator::default()),
        Box::new(ImageCrateCodec::new()),
        cli.max_edge,
    ))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !has_image_extension(&cli.input) {
        return Err(format!(
            "Unsupported input type: {} (expected one of: {})",
            cli.input.display(),
            IMAGE_EXTENSIONS.join(", ")
        )
        .into());
    }
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

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
}

fn report_to_json(report: &DetectionReport) -> String {
    let faces: Vec<serde_json::Value> = report
        .faces
        .iter()
        .map(|f| {
            serde_json::json!({
                "x": f.x,
                "y": f.y,
                "width": f.width,
                "height": f.height,
                "score": f.score,
            })
        })
        .collect();

    serde_json::json!({
        "count": report.faces.len(),
        "width": report.width,
        "height": report.height,
        "latency_ms": report.latency_ms,
        "faces": faces,
    })
    .to_string()
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facelens_core::detection::domain::face_box::FaceBox;

    #[test]
    fn test_parse_variant() {
        assert_eq!(parse_variant("short").unwrap(), UltrafaceVariant::ShortRange);
        assert_eq!(parse_variant("full").unwrap(), UltrafaceVariant::FullRange);
        assert!(parse_variant("tiny").is_err());
    }

    #[test]
    fn test_has_image_extension() {
        assert!(has_image_extension(Path::new("photo.jpg")));
        assert!(has_image_extension(Path::new("photo.PNG")));
        assert!(has_image_extension(Path::new("dir.d/scan.tiff")));
        assert!(!has_image_extension(Path::new("notes.txt")));
        assert!(!has_image_extension(Path::new("photo")));
    }

    #[test]
    fn test_report_to_json_shape() {
        let report = DetectionReport {
            faces: vec![FaceBox {
                x: 10,
                y: 20,
                width: 30,
                height: 40,
                score: 0.875,
            }],
            width: 640,
            height: 480,
            latency_ms: 12.5,
            annotated_png: vec![],
        };

        let parsed: serde_json::Value = serde_json::from_str(&report_to_json(&report)).unwrap();
        assert_eq!(parsed["count"], 1);
        assert_eq!(parsed["width"], 640);
        assert_eq!(parsed["faces"][0]["x"], 10);
        assert_eq!(parsed["faces"][0]["score"], 0.875);
    }
}

use std::sync::{Arc, Mutex};

use facelens_core::imaging::infrastructure::image_crate_codec::CodecError;
use facelens_core::pipeline::detect_image_use_case::{DetectImageUseCase, DetectionReport};

/// Reject request bodies larger than this (raw upload bytes).
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Failure from the detection pipeline, split by who is at fault.
#[derive(Debug)]
pub enum DetectError {
    /// The uploaded bytes are not a decodable image.
    BadImage(String),
    /// Inference, annotation, or encoding failed server-side.
    Internal(String),
}

/// Shared server state: the detection pipeline behind a mutex.
///
/// The detector holds a mutable ONNX session, so requests serialize on it.
/// Fine for a single-user local tool.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Mutex<DetectImageUseCase>>,
    detector_note: Arc<String>,
}

impl AppState {
    pub fn new(pipeline: DetectImageUseCase, detector_note: String) -> Self {
        Self {
            pipeline: Arc::new(Mutex::new(pipeline)),
            detector_note: Arc::new(detector_note),
        }
    }

    /// One-line summary of the active model and thresholds, shown on the page.
    pub fn detector_note(&self) -> &str {
        &self.detector_note
    }

    /// Runs detection on a blocking thread so inference doesn't stall the
    /// async executor.
    pub async fn detect(&self, bytes: Vec<u8>) -> Result<DetectionReport, DetectError> {
        let pipeline = self.pipeline.clone();
        tokio::task::spawn_blocking(move || {
            let mut pipeline = pipeline
                .lock()
                .map_err(|_| DetectError::Internal("detector lock poisoned".to_string()))?;
            pipeline.execute(&bytes).map_err(classify)
        })
        .await
        .map_err(|e| DetectError::Internal(e.to_string()))?
    }
}

/// Decode failures are the client's fault; everything else is ours.
fn classify(e: Box<dyn std::error::Error>) -> DetectError {
    match e.downcast_ref::<CodecError>() {
        Some(CodecError::Decode(_)) => DetectError::BadImage(e.to_string()),
        _ => DetectError::Internal(e.to_string()),
    }
}

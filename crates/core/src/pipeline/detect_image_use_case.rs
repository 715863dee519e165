use std::time::Instant;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::face_box::{FaceBox, DEFAULT_IOU_THRESHOLD};
use crate::detection::domain::face_detector::FaceDetector;
use crate::imaging::domain::image_decoder::ImageDecoder;
use crate::imaging::domain::image_encoder::{EncodeFormat, ImageEncoder};
use crate::imaging::infrastructure::image_crate_codec::downscale_to_fit;

/// Result of running the single-image pipeline.
#[derive(Clone, Debug)]
pub struct DetectionReport {
    /// Deduplicated face boxes in the coordinates of the (possibly
    /// downscaled) annotated image.
    pub faces: Vec<FaceBox>,
    /// Dimensions of the annotated image.
    pub width: u32,
    pub height: u32,
    /// Wall time of detect + annotate, in milliseconds.
    pub latency_ms: f64,
    /// The annotated image, PNG-encoded.
    pub annotated_png: Vec<u8>,
}

/// Single-image detection pipeline: decode → downscale → detect → dedupe →
/// annotate → encode.
pub struct DetectImageUseCase {
    decoder: Box<dyn ImageDecoder>,
    detector: Box<dyn FaceDetector>,
    annotator: Box<dyn FrameAnnotator>,
    encoder: Box<dyn ImageEncoder>,
    max_edge: u32,
}

impl DetectImageUseCase {
    pub fn new(
        decoder: Box<dyn ImageDecoder>,
        detector: Box<dyn FaceDetector>,
        annotator: Box<dyn FrameAnnotator>,
        encoder: Box<dyn ImageEncoder>,
        max_edge: u32,
    ) -> Self {
        Self {
            decoder,
            detector,
            annotator,
            encoder,
            max_edge,
        }
    }

    /// Runs the pipeline on encoded image bytes.
    ///
    /// Latency covers detection and annotation only, matching what a caller
    /// perceives as "inference time"; decode and encode are excluded.
    pub fn execute(&mut self, bytes: &[u8]) -> Result<DetectionReport, Box<dyn std::error::Error>> {
        let frame = self.decoder.decode(bytes)?;
        let mut frame = downscale_to_fit(frame, self.max_edge)?;

        let started = Instant::now();
        let detected = self.detector.detect(&frame)?;
        let faces = FaceBox::deduplicate(&detected, DEFAULT_IOU_THRESHOLD);
        self.annotator.annotate(&mut frame, &faces)?;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        log::debug!("detected {} faces in {latency_ms:.1} ms", faces.len());

        let width = frame.width();
        let height = frame.height();
        let annotated_png = self.encoder.encode(&frame, EncodeFormat::Png)?;

        Ok(DetectionReport {
            faces,
            width,
            height,
            latency_ms,
            annotated_png,
        })
    }
}

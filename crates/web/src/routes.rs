use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use facelens_core::pipeline::detect_image_use_case::DetectionReport;
use facelens_core::pipeline::display_label::label_from_filename;

use crate::assets;
use crate::state::{AppState, DetectError, MAX_UPLOAD_BYTES};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/app.js", get(app_js))
        .route("/healthz", get(|| async { "ok" }))
        .route("/api/detect", post(detect))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(state.detector_note()))
}

/// Fills the page's footer with the active detector settings.
fn render_index(detector_note: &str) -> String {
    assets::INDEX_HTML.replace("__DETECTOR_NOTE__", detector_note)
}

async fn app_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        assets::APP_JS,
    )
}

#[derive(Debug, Deserialize)]
pub struct DetectParams {
    /// Explicit display label; wins over `filename`.
    pub label: Option<String>,
    /// Original filename, used to derive a label when none is given.
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FaceJson {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    pub label: String,
    pub count: usize,
    pub width: u32,
    pub height: u32,
    pub latency_ms: f64,
    pub faces: Vec<FaceJson>,
    /// Annotated image as a `data:image/png;base64,` URL.
    pub image: String,
}

/// `POST /api/detect` — raw image bytes in, detection report out.
async fn detect(
    State(state): State<AppState>,
    Query(params): Query<DetectParams>,
    body: Bytes,
) -> Result<Json<DetectResponse>, (StatusCode, String)> {
    if body.is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "empty image body".into()));
    }

    let report = state.detect(body.to_vec()).await.map_err(|e| {
        if let DetectError::Internal(msg) = &e {
            log::error!("detect failed: {msg}");
        }
        error_response(e)
    })?;

    log::info!(
        "detect: {} faces, {}x{}, {:.1} ms",
        report.faces.len(),
        report.width,
        report.height,
        report.latency_ms
    );

    Ok(Json(build_response(&params, &report)))
}

/// Undecodable uploads are the client's problem; pipeline failures are not.
fn error_response(err: DetectError) -> (StatusCode, String) {
    match err {
        DetectError::BadImage(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        DetectError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
    }
}

fn build_response(params: &DetectParams, report: &DetectionReport) -> DetectResponse {
    let label = match (&params.label, &params.filename) {
        (Some(label), _) if !label.is_empty() => label.clone(),
        (_, Some(filename)) => label_from_filename(filename),
        _ => "Unknown".to_string(),
    };

    DetectResponse {
        label,
        count: report.faces.len(),
        width: report.width,
        height: report.height,
        latency_ms: report.latency_ms,
        faces: report
            .faces
            .iter()
            .map(|f| FaceJson {
                x: f.x,
                y: f.y,
                width: f.width,
                height: f.height,
                score: f.score,
            })
            .collect(),
        image: format!(
            "data:image/png;base64,{}",
            BASE64.encode(&report.annotated_png)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facelens_core::detection::domain::face_box::FaceBox;

    fn report() -> DetectionReport {
        DetectionReport {
            faces: vec![FaceBox {
                x: 5,
                y: 6,
                width: 7,
                height: 8,
                score: 0.75,
            }],
            width: 320,
            height: 240,
            latency_ms: 9.5,
            annotated_png: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_response_serializes_expected_shape() {
        let params = DetectParams {
            label: None,
            filename: Some("jane_doe.jpg".into()),
        };
        let resp = build_response(&params, &report());
        let json: serde_json::Value = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["label"], "Jane Doe");
        assert_eq!(json["count"], 1);
        assert_eq!(json["width"], 320);
        assert_eq!(json["faces"][0]["x"], 5);
        assert_eq!(json["faces"][0]["score"], 0.75);
    }

    #[test]
    fn test_explicit_label_wins_over_filename() {
        let params = DetectParams {
            label: Some("Front Door".into()),
            filename: Some("jane_doe.jpg".into()),
        };
        assert_eq!(build_response(&params, &report()).label, "Front Door");
    }

    #[test]
    fn test_empty_label_falls_back_to_filename() {
        let params = DetectParams {
            label: Some(String::new()),
            filename: Some("jane_doe.jpg".into()),
        };
        assert_eq!(build_response(&params, &report()).label, "Jane Doe");
    }

    #[test]
    fn test_no_label_no_filename_is_unknown() {
        let params = DetectParams {
            label: None,
            filename: None,
        };
        assert_eq!(build_response(&params, &report()).label, "Unknown");
    }

    #[test]
    fn test_index_renders_detector_note() {
        let page = render_index("UltraFace full-range, confidence 0.60");
        assert!(page.contains("UltraFace full-range, confidence 0.60"));
        assert!(!page.contains("__DETECTOR_NOTE__"));
    }

    #[test]
    fn test_bad_image_maps_to_unprocessable_entity() {
        let (status, msg) = error_response(DetectError::BadImage("not an image".into()));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(msg, "not an image");
    }

    #[test]
    fn test_internal_failure_maps_to_server_error() {
        let (status, _) = error_response(DetectError::Internal("session failed".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_image_is_png_data_url() {
        let params = DetectParams {
            label: None,
            filename: None,
        };
        let resp = build_response(&params, &report());
        assert!(resp.image.starts_with("data:image/png;base64,"));
        // [1, 2, 3] → "AQID"
        assert!(resp.image.ends_with("AQID"));
    }
}

pub const SHORT_RANGE_MODEL_NAME: &str = "version-RFB-320.onnx";
pub const SHORT_RANGE_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/main/validated/vision/body_analysis/ultraface/models/version-RFB-320.onnx";

pub const FULL_RANGE_MODEL_NAME: &str = "version-RFB-640.onnx";
pub const FULL_RANGE_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/main/validated/vision/body_analysis/ultraface/models/version-RFB-640.onnx";

/// Longest edge an input image is downscaled to before detection.
pub const DEFAULT_MAX_EDGE: u32 = 1024;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

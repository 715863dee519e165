pub mod onnx_ultraface_detector;

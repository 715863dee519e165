pub mod face_box;
pub mod face_detector;

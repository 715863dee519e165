use crate::detection::domain::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Draws detection overlays onto a frame in place.
pub trait FrameAnnotator: Send {
    fn annotate(
        &self,
        frame: &mut Frame,
        boxes: &[FaceBox],
    ) -> Result<(), Box<dyn std::error::Error>>;
}

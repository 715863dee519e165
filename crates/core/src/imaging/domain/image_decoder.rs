use crate::shared::frame::Frame;

/// Decodes encoded image bytes (JPEG, PNG, ...) into an RGB frame.
///
/// Implementations handle container/codec details; the pipeline works with
/// the abstract `Frame` type.
pub trait ImageDecoder: Send {
    fn decode(&self, bytes: &[u8]) -> Result<Frame, Box<dyn std::error::Error>>;
}

use crate::shared::frame::Frame;

/// Target container format for encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodeFormat {
    Png,
    Jpeg,
}

/// Encodes an RGB frame into image bytes.
pub trait ImageEncoder: Send {
    fn encode(
        &self,
        frame: &Frame,
        format: EncodeFormat,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error>>;
}

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Default outline thickness in pixels.
const DEFAULT_THICKNESS: i32 = 2;

/// Height of the filled tag strip drawn along the top edge of each box.
/// UI captions anchor to this strip.
const TAG_HEIGHT: i32 = 14;

/// Overlay color: the theme's accent green.
const BOX_COLOR: [u8; 3] = [34, 197, 94];

/// CPU annotator drawing a rectangle outline plus a tag strip per face.
///
/// All writes are clipped to the frame, so boxes touching or crossing an
/// edge render partially instead of panicking.
pub struct BoxOutlineAnnotator {
    thickness: i32,
    color: [u8; 3],
}

impl BoxOutlineAnnotator {
    pub fn new(thickness: i32) -> Self {
        Self {
            thickness: thickness.max(1),
            color: BOX_COLOR,
        }
    }
}

impl Default for BoxOutlineAnnotator {
    fn default() -> Self {
        Self::new(DEFAULT_THICKNESS)
    }
}

impl FrameAnnotator for BoxOutlineAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        boxes: &[FaceBox],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let fw = frame.width() as i32;
        let fh = frame.height() as i32;
        let channels = frame.channels() as usize;
        let data = frame.data_mut();

        let t = self.thickness;
        for b in boxes {
            // Four edges as filled strips
            fill_rect(data, fw, fh, channels, b.x, b.y, b.width, t, self.color);
            fill_rect(
                data,
                fw,
                fh,
                channels,
                b.x,
                b.y + b.height - t,
                b.width,
                t,
                self.color,
            );
            fill_rect(data, fw, fh, channels, b.x, b.y, t, b.height, self.color);
            fill_rect(
                data,
                fw,
                fh,
                channels,
                b.x + b.width - t,
                b.y,
                t,
                b.height,
                self.color,
            );

            // Tag strip above the box, or inside its top edge when the box
            // starts too close to the frame top.
            let tag_y = if b.y >= TAG_HEIGHT { b.y - TAG_HEIGHT } else { b.y };
            fill_rect(data, fw, fh, channels, b.x, tag_y, b.width, TAG_HEIGHT, self.color);
        }

        Ok(())
    }
}

/// Fills a rectangle with `color`, clipped to the frame bounds.
fn fill_rect(
    data: &mut [u8],
    fw: i32,
    fh: i32,
    channels: usize,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: [u8; 3],
) {
    let x1 = x.max(0);
    let y1 = y.max(0);
    let x2 = (x + w).min(fw);
    let y2 = (y + h).min(fh);

    for row in y1..y2 {
        for col in x1..x2 {
            let offset = ((row * fw + col) as usize) * channels;
            data[offset..offset + 3].copy_from_slice(&color);
        }
    }
}

use embedded_graphics::pixelcolor::Rgb888;
use image::imageops;

use crate::detection::domain::detection_settings::DetectionSettings;
use crate::detection::domain::detector_bank::{face_params, DetectorBank, EYE_PARAMS, SMILE_PARAMS};
use crate::detection::domain::object_detector::{DetectParams, ObjectDetector};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;
use crate::shared::frame_canvas::FrameCanvas;

pub const FACE_COLOR: Rgb888 = Rgb888::new(0, 255, 0);
pub const EYE_COLOR: Rgb888 = Rgb888::new(0, 0, 255);
pub const SMILE_COLOR: Rgb888 = Rgb888::new(255, 0, 0);

pub const FACE_LABEL: &str = "Face";
const BOX_THICKNESS: u32 = 2;
/// Distance from the top of the face box to the label baseline.
const LABEL_OFFSET: i32 = 10;

/// Runs face detection on `frame` and draws the results into it.
///
/// Eyes and smiles are searched for inside each face and drawn through a
/// view of the face region, so their boxes land at the face offset in the
/// full frame. Returns the number of faces the detector reported.
///
/// Only the face detector's errors are returned; eye and smile failures
/// are logged and skipped for that face.
pub fn detect_and_annotate(
    frame: &mut Frame,
    bank: &DetectorBank,
    settings: &DetectionSettings,
) -> Result<usize, Box<dyn std::error::Error>> {
    if !settings.enabled {
        return Ok(0);
    }

    let gray = frame.to_luma();
    let faces = bank.face().detect(
        &gray,
        &face_params(settings.scale_factor(), settings.min_neighbors()),
    )?;

    let eye = bank.eye().filter(|_| settings.detect_eyes);
    let smile = bank.smile().filter(|_| settings.detect_smile);
    let format = frame.format();
    let (width, height) = (frame.width(), frame.height());

    for face in &faces {
        let face = face.clamp_to(width, height);
        if face.is_empty() {
            continue;
        }
        FrameCanvas::new(frame.as_ndarray_mut(), format).draw_box(&face, FACE_COLOR, BOX_THICKNESS);

        if eye.is_some() || smile.is_some() {
            let face_gray =
                imageops::crop_imm(&gray, face.x, face.y, face.width, face.height).to_image();
            let mut region = FrameCanvas::new(frame.region_mut(&face), format);
            let passes = [
                (eye, &EYE_PARAMS, EYE_COLOR, "eye"),
                (smile, &SMILE_PARAMS, SMILE_COLOR, "smile"),
            ];
            for (detector, params, color, what) in passes {
                let Some(detector) = detector else { continue };
                for b in detect_or_warn(detector, &face_gray, params, what) {
                    region.draw_box(&b, color, BOX_THICKNESS);
                }
            }
        }

        FrameCanvas::new(frame.as_ndarray_mut(), format).draw_label(
            FACE_LABEL,
            face.x as i32,
            face.y as i32 - LABEL_OFFSET,
            FACE_COLOR,
        );
    }

    Ok(faces.len())
}

fn detect_or_warn(
    detector: &dyn ObjectDetector,
    image: &image::GrayImage,
    params: &DetectParams,
    what: &str,
) -> Vec<BoundingBox> {
    match detector.detect(image, params) {
        Ok(boxes) => boxes,
        Err(e) => {
            log::warn!("{what} detection failed: {e}");
            Vec::new()
        }
    }
}

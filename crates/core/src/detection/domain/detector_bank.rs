use std::fmt;
use std::sync::Arc;

use crate::detection::domain::object_detector::{DetectParams, ObjectDetector};
use crate::shared::constants::{
    EYE_MIN_NEIGHBORS, EYE_SCALE_FACTOR, FACE_MIN_SIZE, SMILE_MIN_NEIGHBORS, SMILE_MIN_SIZE,
    SMILE_SCALE_FACTOR,
};

/// Parameters for the eye detector, which ignores user settings.
pub const EYE_PARAMS: DetectParams = DetectParams {
    scale_factor: EYE_SCALE_FACTOR,
    min_neighbors: EYE_MIN_NEIGHBORS,
    min_size: (0, 0),
};

/// Parameters for the smile detector, which ignores user settings.
pub const SMILE_PARAMS: DetectParams = DetectParams {
    scale_factor: SMILE_SCALE_FACTOR,
    min_neighbors: SMILE_MIN_NEIGHBORS,
    min_size: SMILE_MIN_SIZE,
};

/// Face detector parameters for the given user settings.
pub fn face_params(scale_factor: f64, min_neighbors: u32) -> DetectParams {
    DetectParams {
        scale_factor,
        min_neighbors,
        min_size: FACE_MIN_SIZE,
    }
}

/// The three detectors used per frame.
///
/// The face detector is mandatory. Eye and smile detectors are optional;
/// an empty slot means the cascade failed to load and the matching toggle
/// stays off. Cloning shares the underlying detectors.
#[derive(Clone)]
pub struct DetectorBank {
    face: Arc<dyn ObjectDetector>,
    eye: Option<Arc<dyn ObjectDetector>>,
    smile: Option<Arc<dyn ObjectDetector>>,
}

impl DetectorBank {
    pub fn new(
        face: Arc<dyn ObjectDetector>,
        eye: Option<Arc<dyn ObjectDetector>>,
        smile: Option<Arc<dyn ObjectDetector>>,
    ) -> Self {
        Self { face, eye, smile }
    }

    pub fn face(&self) -> &dyn ObjectDetector {
        self.face.as_ref()
    }

    pub fn eye(&self) -> Option<&dyn ObjectDetector> {
        self.eye.as_deref()
    }

    pub fn smile(&self) -> Option<&dyn ObjectDetector> {
        self.smile.as_deref()
    }

    pub fn has_eye(&self) -> bool {
        self.eye.is_some()
    }

    pub fn has_smile(&self) -> bool {
        self.smile.is_some()
    }
}

impl fmt::Debug for DetectorBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorBank")
            .field("eye", &self.has_eye())
            .field("smile", &self.has_smile())
            .finish()
    }
}

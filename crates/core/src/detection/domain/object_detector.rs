use image::GrayImage;

use crate::shared::bounding_box::BoundingBox;

/// Per-call tuning passed to a detector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectParams {
    /// Ratio between successive search scales, > 1.0.
    pub scale_factor: f64,
    /// Overlapping candidates a detection needs to be kept.
    pub min_neighbors: u32,
    /// Smallest window considered, `(width, height)`.
    pub min_size: (u32, u32),
}

/// Domain interface for a pattern detector over grayscale images.
///
/// Returned boxes are in the coordinates of `image` and lie within it.
/// Implementations hold no per-call state, so the same instance may be
/// shared and reused across frames.
pub trait ObjectDetector: Send + Sync {
    fn detect(
        &self,
        image: &GrayImage,
        params: &DetectParams,
    ) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>>;
}

use std::path::PathBuf;

/// Properties of an opened frame source, reported once at open time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// One-line description for status text and logs.
    pub fn describe(&self) -> String {
        let name = self
            .source_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Camera".to_string());
        if self.fps > 0.0 {
            format!("{name} ({}x{} @ {:.0} fps)", self.width, self.height, self.fps)
        } else {
            format!("{name} ({}x{})", self.width, self.height)
        }
    }
}

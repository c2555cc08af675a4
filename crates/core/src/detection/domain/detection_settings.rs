use serde::{Deserialize, Serialize};

pub const SCALE_FACTOR_RANGE: (f64, f64) = (1.01, 1.5);
pub const MIN_NEIGHBORS_RANGE: (u32, u32) = (1, 10);

/// User-controlled detection options.
///
/// `scale_factor` and `min_neighbors` are kept inside their slider
/// ranges by the setters and when deserialising.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDetectionSettings")]
pub struct DetectionSettings {
    pub enabled: bool,
    scale_factor: f64,
    min_neighbors: u32,
    pub detect_eyes: bool,
    pub detect_smile: bool,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            scale_factor: 1.1,
            min_neighbors: 5,
            detect_eyes: false,
            detect_smile: false,
        }
    }
}

impl DetectionSettings {
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn min_neighbors(&self) -> u32 {
        self.min_neighbors
    }

    pub fn set_scale_factor(&mut self, value: f64) {
        self.scale_factor = clamp_scale_factor(value);
    }

    pub fn set_min_neighbors(&mut self, value: u32) {
        self.min_neighbors = value.clamp(MIN_NEIGHBORS_RANGE.0, MIN_NEIGHBORS_RANGE.1);
    }
}

fn clamp_scale_factor(value: f64) -> f64 {
    if value.is_nan() {
        return DetectionSettings::default().scale_factor;
    }
    value.clamp(SCALE_FACTOR_RANGE.0, SCALE_FACTOR_RANGE.1)
}

#[derive(Deserialize)]
#[serde(default)]
struct RawDetectionSettings {
    enabled: bool,
    scale_factor: f64,
    min_neighbors: u32,
    detect_eyes: bool,
    detect_smile: bool,
}

impl Default for RawDetectionSettings {
    fn default() -> Self {
        let d = DetectionSettings::default();
        Self {
            enabled: d.enabled,
            scale_factor: d.scale_factor,
            min_neighbors: d.min_neighbors,
            detect_eyes: d.detect_eyes,
            detect_smile: d.detect_smile,
        }
    }
}

impl From<RawDetectionSettings> for DetectionSettings {
    fn from(raw: RawDetectionSettings) -> Self {
        let mut settings = Self {
            enabled: raw.enabled,
            detect_eyes: raw.detect_eyes,
            detect_smile: raw.detect_smile,
            ..Self::default()
        };
        settings.set_scale_factor(raw.scale_factor);
        settings.set_min_neighbors(raw.min_neighbors);
        settings
    }
}

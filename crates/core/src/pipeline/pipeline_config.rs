use serde::{Deserialize, Serialize};

use crate::detection::domain::detection_settings::DetectionSettings;
use crate::filtering::domain::filter_mode::FilterMode;

/// Per-tick configuration, owned by the caller and read by every
/// capture loop step.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub filter: FilterMode,
    pub detection: DetectionSettings,
}

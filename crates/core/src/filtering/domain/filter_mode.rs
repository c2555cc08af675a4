use serde::{Deserialize, Serialize};

/// Cosmetic filter applied to every frame before detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    #[default]
    None,
    Grayscale,
    Sepia,
    Blur,
    EdgeDetection,
}

impl FilterMode {
    pub const ALL: &[FilterMode] = &[
        FilterMode::None,
        FilterMode::Grayscale,
        FilterMode::Sepia,
        FilterMode::Blur,
        FilterMode::EdgeDetection,
    ];
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterMode::None => write!(f, "None"),
            FilterMode::Grayscale => write!(f, "Grayscale"),
            FilterMode::Sepia => write!(f, "Sepia"),
            FilterMode::Blur => write!(f, "Blur"),
            FilterMode::EdgeDetection => write!(f, "Edge Detection"),
        }
    }
}

impl std::str::FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "none" => Ok(FilterMode::None),
            "grayscale" | "gray" | "grey" => Ok(FilterMode::Grayscale),
            "sepia" => Ok(FilterMode::Sepia),
            "blur" => Ok(FilterMode::Blur),
            "edgedetection" | "edges" | "edge" => Ok(FilterMode::EdgeDetection),
            other => Err(format!("unknown filter '{other}'")),
        }
    }
}

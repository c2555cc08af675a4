use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use facewatch_core::pipeline::pipeline_config::PipelineConfig;
use facewatch_core::shared::constants::SNAPSHOT_DIR;
use facewatch_core::video::domain::frame_source::SourceSelection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    #[default]
    System,
    Dark,
    Light,
}

impl Appearance {
    pub const ALL: &[Appearance] = &[Appearance::System, Appearance::Dark, Appearance::Light];
}

impl std::fmt::Display for Appearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Appearance::System => write!(f, "System"),
            Appearance::Dark => write!(f, "Dark"),
            Appearance::Light => write!(f, "Light"),
        }
    }
}

/// Everything the viewer remembers between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pipeline: PipelineConfig,
    pub source: SourceSelection,
    pub snapshot_dir: PathBuf,
    pub appearance: Appearance,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            source: SourceSelection::default(),
            snapshot_dir: PathBuf::from(SNAPSHOT_DIR),
            appearance: Appearance::System,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Facewatch").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Defaults on a missing or unreadable file.
    pub fn load_from(path: &Path) -> Self {
        let mut settings: Self = fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default();
        if settings.source.file.as_deref().is_some_and(|f| !f.is_file()) {
            log::info!("Remembered video file is gone, forgetting it");
            settings.source.file = None;
        }
        settings
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            self.save_to(&path);
        }
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Could not create settings directory {}: {e}", parent.display());
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    log::warn!("Could not save settings to {}: {e}", path.display());
                }
            }
            Err(e) => log::warn!("Could not serialize settings: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facewatch_core::filtering::domain::filter_mode::FilterMode;
    use facewatch_core::video::domain::frame_source::SourceKind;
    use tempfile::TempDir;

    #[test]
    fn test_appearance_choices_in_picker_order() {
        let labels: Vec<String> = Appearance::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["System", "Dark", "Light"]);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load_from(&tmp.path().join("settings.json"));
        assert_eq!(settings, Settings::default());
        assert!(settings.pipeline.detection.enabled);
        assert_eq!(settings.source.kind, SourceKind::Camera);
    }

    #[test]
    fn test_garbage_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_save_then_load_keeps_choices() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("settings.json");
        let video = tmp.path().join("clip.mp4");
        fs::write(&video, b"").unwrap();

        let mut settings = Settings::default();
        settings.pipeline.filter = FilterMode::Sepia;
        settings.pipeline.detection.set_min_neighbors(8);
        settings.source.kind = SourceKind::VideoFile;
        settings.source.file = Some(video.clone());
        settings.appearance = Appearance::Dark;
        settings.save_to(&path);

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_unwritable_directory_leaves_nothing_behind() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, b"a file, not a directory").unwrap();
        let path = blocker.join("settings.json");

        Settings::default().save_to(&path);

        assert!(!path.exists());
        assert_eq!(fs::read(&blocker).unwrap(), b"a file, not a directory");
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_vanished_video_file_is_dropped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        let mut settings = Settings::default();
        settings.source.file = Some(tmp.path().join("deleted.mp4"));
        settings.save_to(&path);

        assert!(Settings::load_from(&path).source.file.is_none());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, r#"{"appearance": "light", "pipeline": {"filter": "blur"}}"#).unwrap();
        let settings = Settings::load_from(&path);
        assert_eq!(settings.appearance, Appearance::Light);
        assert_eq!(settings.pipeline.filter, FilterMode::Blur);
        assert_eq!(settings.pipeline.detection.min_neighbors(), 5);
        assert_eq!(settings.snapshot_dir, PathBuf::from(SNAPSHOT_DIR));
    }
}

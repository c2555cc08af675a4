use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Which kind of source the user has selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Camera,
    VideoFile,
}

impl SourceKind {
    pub const ALL: &[SourceKind] = &[SourceKind::Camera, SourceKind::VideoFile];
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Camera => write!(f, "Camera"),
            SourceKind::VideoFile => write!(f, "Video File"),
        }
    }
}

/// A fully specified source, ready to open.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    Camera { index: u32 },
    VideoFile(PathBuf),
}

impl SourceConfig {
    /// Builds a config from the shell's selection.
    ///
    /// Selecting a video file before one has been chosen is an error.
    pub fn from_selection(
        kind: SourceKind,
        camera_index: u32,
        file: Option<&Path>,
    ) -> Result<Self, SourceError> {
        match kind {
            SourceKind::Camera => Ok(SourceConfig::Camera {
                index: camera_index,
            }),
            SourceKind::VideoFile => file
                .map(|p| SourceConfig::VideoFile(p.to_path_buf()))
                .ok_or(SourceError::NoFileSelected),
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceConfig::Camera { .. } => SourceKind::Camera,
            SourceConfig::VideoFile(_) => SourceKind::VideoFile,
        }
    }
}

impl fmt::Display for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceConfig::Camera { index } => write!(f, "camera {index}"),
            SourceConfig::VideoFile(path) => write!(f, "{}", path.display()),
        }
    }
}

/// What the user has picked in the source controls.
///
/// `file` is remembered across switches so going back to "Video File"
/// reopens the last chosen file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSelection {
    pub kind: SourceKind,
    pub camera_index: u32,
    pub file: Option<PathBuf>,
}

impl SourceSelection {
    pub fn to_config(&self) -> Result<SourceConfig, SourceError> {
        SourceConfig::from_selection(self.kind, self.camera_index, self.file.as_deref())
    }
}

pub type BoxedSourceError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("no video file selected")]
    NoFileSelected,
    #[error("could not open camera {index}: {source}")]
    Camera {
        index: u32,
        #[source]
        source: BoxedSourceError,
    },
    #[error("could not open video file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: BoxedSourceError,
    },
}

/// Pull-based supplier of frames.
///
/// `next_frame` returns `Ok(None)` at end of stream for files and when a
/// camera delivers nothing. File sources restart from their first frame
/// after `rewind`. `close` releases the device or file and may be called
/// more than once.
pub trait FrameSource {
    fn kind(&self) -> SourceKind;

    fn metadata(&self) -> &VideoMetadata;

    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    fn rewind(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    fn close(&mut self);
}

/// Opens sources from configs.
pub trait SourceOpener {
    fn open(&self, config: &SourceConfig) -> Result<Box<dyn FrameSource>, SourceError>;
}

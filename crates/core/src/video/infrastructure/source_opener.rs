use crate::video::domain::frame_source::{FrameSource, SourceConfig, SourceError, SourceOpener};
use crate::video::infrastructure::camera_source::CameraSource;
use crate::video::infrastructure::ffmpeg_file_source::FfmpegFileSource;

/// Opens cameras through nokhwa and files through ffmpeg.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSourceOpener;

impl SourceOpener for DefaultSourceOpener {
    fn open(&self, config: &SourceConfig) -> Result<Box<dyn FrameSource>, SourceError> {
        match config {
            SourceConfig::Camera { index } => Ok(Box::new(CameraSource::open(*index)?)),
            SourceConfig::VideoFile(path) => Ok(Box::new(FfmpegFileSource::open(path)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::domain::frame_source::SourceKind;
    use crate::video::infrastructure::ffmpeg_file_source::tests::create_test_video;
    use std::path::PathBuf;

    #[test]
    fn test_opens_video_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        create_test_video(&path, 3, 64, 48, 25);

        let mut source = DefaultSourceOpener
            .open(&SourceConfig::VideoFile(path))
            .unwrap();
        assert_eq!(source.kind(), SourceKind::VideoFile);
        assert!(source.next_frame().unwrap().is_some());
        source.close();
    }

    #[test]
    fn test_missing_file_reports_path() {
        let path = PathBuf::from("/nonexistent/clip.mp4");
        let err = DefaultSourceOpener
            .open(&SourceConfig::VideoFile(path.clone()))
            .err()
            .unwrap();
        match err {
            SourceError::File { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}

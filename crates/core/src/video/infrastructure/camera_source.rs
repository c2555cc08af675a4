use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use crate::shared::frame::{Frame, PixelFormat};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_source::{BoxedSourceError, FrameSource, SourceError, SourceKind};

/// Live camera source backed by nokhwa.
///
/// A failed capture is reported as an error for that pull only; the
/// stream stays open and the next pull tries again.
pub struct CameraSource {
    camera: Option<Camera>,
    index: u32,
    metadata: VideoMetadata,
    frame_index: usize,
}

impl CameraSource {
    pub fn open(index: u32) -> Result<Self, SourceError> {
        Self::open_inner(index).map_err(|source| SourceError::Camera { index, source })
    }

    fn open_inner(index: u32) -> Result<Self, BoxedSourceError> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)?;
        camera.open_stream()?;

        let resolution = camera.resolution();
        let metadata = VideoMetadata {
            width: resolution.width(),
            height: resolution.height(),
            fps: camera.frame_rate() as f64,
            total_frames: 0,
            codec: format!("{:?}", camera.frame_format()),
            source_path: None,
        };
        log::info!("Opened camera {index}: {}", metadata.describe());

        Ok(Self {
            camera: Some(camera),
            index,
            metadata,
            frame_index: 0,
        })
    }
}

impl FrameSource for CameraSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Camera
    }

    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let Some(camera) = self.camera.as_mut() else {
            return Ok(None);
        };
        let buffer = camera.frame()?;
        let decoded = buffer.decode_image::<RgbFormat>()?;
        let (width, height) = decoded.dimensions();
        let frame = Frame::new(
            decoded.into_raw(),
            width,
            height,
            PixelFormat::Rgb,
            self.frame_index,
        );
        self.frame_index += 1;
        Ok(Some(frame))
    }

    /// Cameras have no start position to return to.
    fn rewind(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                log::warn!("Failed to stop camera {}: {e}", self.index);
            }
            log::debug!("Closed camera {}", self.index);
        }
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires camera hardware
    fn test_capture_single_frame() {
        let mut camera = CameraSource::open(0).unwrap();
        let frame = camera.next_frame().unwrap().unwrap();
        assert_eq!(frame.width(), camera.metadata().width);
        assert_eq!(frame.format(), PixelFormat::Rgb);
        camera.close();
        camera.close();
    }

    #[test]
    fn test_missing_camera_is_camera_error() {
        // Index far beyond any attached device.
        if let Err(err) = CameraSource::open(250) {
            assert!(matches!(err, SourceError::Camera { index: 250, .. }));
        }
    }
}

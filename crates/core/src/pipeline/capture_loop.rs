use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;

use crate::detection::domain::detector_bank::DetectorBank;
use crate::detection::domain::face_annotator::detect_and_annotate;
use crate::filtering::infrastructure::frame_filter::apply_filter;
use crate::pipeline::pipeline_config::PipelineConfig;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::presenter::DisplaySurface;
use crate::pipeline::snapshot::{save_snapshot, SnapshotError};
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::{
    FrameSource, SourceError, SourceKind, SourceOpener, SourceSelection,
};
use crate::video::domain::image_writer::ImageWriter;

pub const STATUS_READY: &str = "Ready";
pub const STATUS_NO_SOURCE: &str = "No video source available";
pub const STATUS_NO_FILE: &str = "No video file selected";
pub const STATUS_OPEN_FAILED: &str = "Error: Could not open video source";
pub const STATUS_CAMERA_UNAVAILABLE: &str = "Camera frame unavailable";
pub const STATUS_VIDEO_ENDED: &str = "Video ended";

/// What a single [`CaptureLoop::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Stopped,
    NoSource,
    /// The camera gave no frame this tick.
    SourceFailed,
    /// The file ran out and was rewound.
    Restarted,
    /// A frame was shown. `face_count` is `None` when detection did not run.
    Presented { face_count: Option<usize> },
}

/// Pull, filter, detect, present: one frame per step.
///
/// Owns the open source exclusively and releases it before opening
/// another one and on stop. The last unfiltered frame is kept for
/// snapshots.
pub struct CaptureLoop {
    bank: DetectorBank,
    opener: Box<dyn SourceOpener>,
    source: Option<Box<dyn FrameSource>>,
    surface: DisplaySurface,
    logger: Box<dyn PipelineLogger>,
    last_frame: Option<Frame>,
    status: String,
    stopped: bool,
}

impl CaptureLoop {
    pub fn new(
        bank: DetectorBank,
        opener: Box<dyn SourceOpener>,
        surface_size: (u32, u32),
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            bank,
            opener,
            source: None,
            surface: DisplaySurface::new(surface_size.0, surface_size.1),
            logger,
            last_frame: None,
            status: STATUS_READY.to_string(),
            stopped: false,
        }
    }

    pub fn bank(&self) -> &DetectorBank {
        &self.bank
    }

    pub fn surface(&self) -> &DisplaySurface {
        &self.surface
    }

    pub fn logger(&self) -> &dyn PipelineLogger {
        self.logger.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Replaces the status line. Changes are passed on to the logger.
    pub fn set_status(&mut self, status: impl Into<String>) {
        let status = status.into();
        if status != self.status {
            self.logger.info(&status);
            self.status = status;
        }
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Last frame pulled from the source, before filtering and annotation.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Releases the current source, then opens the selected one.
    ///
    /// On failure the loop is left without a source and the status says
    /// why; the error is returned so the shell can report it.
    pub fn switch_source(&mut self, selection: &SourceSelection) -> Result<(), SourceError> {
        self.release_source();

        let config = match selection.to_config() {
            Ok(config) => config,
            Err(e) => {
                self.set_status(STATUS_NO_FILE);
                return Err(e);
            }
        };

        match self.opener.open(&config) {
            Ok(source) => {
                log::info!("Opened {config}: {}", source.metadata().describe());
                self.source = Some(source);
                self.set_status(match selection.kind {
                    SourceKind::Camera => "Source: Camera".to_string(),
                    SourceKind::VideoFile => format!("Source: {config}"),
                });
                Ok(())
            }
            Err(e) => {
                log::error!("{e}");
                self.set_status(STATUS_OPEN_FAILED);
                Err(e)
            }
        }
    }

    /// Stops the loop for good. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if !self.stopped {
            log::debug!("Capture loop stopping");
        }
        self.stopped = true;
        self.release_source();
    }

    pub fn step(&mut self, config: &PipelineConfig) -> TickOutcome {
        if self.stopped {
            return TickOutcome::Stopped;
        }
        let Some(source) = self.source.as_mut() else {
            self.set_status(STATUS_NO_SOURCE);
            return TickOutcome::NoSource;
        };

        let started = Instant::now();
        let pulled = source.next_frame().unwrap_or_else(|e| {
            log::debug!("Frame read failed: {e}");
            None
        });
        let Some(frame) = pulled else {
            let (status, outcome) = match source.kind() {
                SourceKind::Camera => (STATUS_CAMERA_UNAVAILABLE, TickOutcome::SourceFailed),
                SourceKind::VideoFile => {
                    if let Err(e) = source.rewind() {
                        log::warn!("Rewind failed: {e}");
                    }
                    (STATUS_VIDEO_ENDED, TickOutcome::Restarted)
                }
            };
            self.set_status(status);
            return outcome;
        };
        self.logger.timing("capture", elapsed_ms(started));

        let t = Instant::now();
        let mut shown = apply_filter(&frame, config.filter).into_owned();
        self.logger.timing("filter", elapsed_ms(t));

        let face_count = if config.detection.enabled {
            let t = Instant::now();
            let result = detect_and_annotate(&mut shown, &self.bank, &config.detection);
            self.logger.timing("detect", elapsed_ms(t));
            match result {
                Ok(count) => {
                    self.set_status(format!("Detected {count} faces"));
                    self.logger.metric("faces", count as f64);
                    Some(count)
                }
                Err(e) => {
                    log::warn!("Face detection failed on frame {}: {e}", frame.index());
                    None
                }
            }
        } else {
            None
        };

        let t = Instant::now();
        self.surface.present(&shown);
        self.logger.timing("present", elapsed_ms(t));

        self.last_frame = Some(frame);
        self.logger.frame_done();
        TickOutcome::Presented { face_count }
    }

    /// Saves the last unfiltered frame into `dir`.
    pub fn snapshot(
        &mut self,
        dir: &Path,
        writer: &dyn ImageWriter,
    ) -> Result<PathBuf, SnapshotError> {
        let frame = self.last_frame.as_ref().ok_or(SnapshotError::NoFrame)?;
        let path = save_snapshot(frame, dir, writer, Local::now().naive_local())?;
        self.set_status(format!("Snapshot saved: {}", path.display()));
        Ok(path)
    }

    fn release_source(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.close();
        }
    }
}

impl Drop for CaptureLoop {
    fn drop(&mut self) {
        self.release_source();
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

use std::path::PathBuf;

use iced::widget::{column, container, image, text};
use iced::{window, Element, Length, Subscription, Task, Theme};

use facewatch_core::detection::domain::detector_bank::DetectorBank;
use facewatch_core::filtering::domain::filter_mode::FilterMode;
use facewatch_core::pipeline::capture_loop::{CaptureLoop, TickOutcome};
use facewatch_core::pipeline::pipeline_logger::NullPipelineLogger;
use facewatch_core::shared::constants::{DISPLAY_SURFACE_SIZE, FRAME_INTERVAL, VIDEO_EXTENSIONS};
use facewatch_core::video::domain::frame_source::{SourceError, SourceKind, SourceSelection};
use facewatch_core::video::infrastructure::image_file_writer::ImageFileWriter;
use facewatch_core::video::infrastructure::source_opener::DefaultSourceOpener;

use crate::panels;
use crate::settings::{Appearance, Settings};
use crate::theme;

#[derive(Debug, Clone)]
pub enum Message {
    Tick,
    SourceSelected(SourceKind),
    Browse,
    FileChosen(Option<PathBuf>),
    FilterSelected(FilterMode),
    DetectionToggled(bool),
    ScaleChanged(f64),
    NeighborsChanged(u32),
    EyesToggled(bool),
    SmileToggled(bool),
    Snapshot,
    OpenSnapshots,
    AppearanceSelected(Appearance),
    DialogClosed,
    CloseRequested(window::Id),
}

pub struct App {
    capture: CaptureLoop,
    settings: Settings,
    frame: Option<image::Handle>,
}

impl App {
    pub fn new(bank: DetectorBank) -> (Self, Task<Message>) {
        let mut settings = Settings::load();
        if !bank.has_eye() {
            settings.pipeline.detection.detect_eyes = false;
        }
        if !bank.has_smile() {
            settings.pipeline.detection.detect_smile = false;
        }

        let capture = CaptureLoop::new(
            bank,
            Box::new(DefaultSourceOpener),
            DISPLAY_SURFACE_SIZE,
            Box::new(NullPipelineLogger),
        );
        let mut app = Self {
            capture,
            settings,
            frame: None,
        };
        let task = app.open_source(false);
        let bank = app.capture.bank();
        let missing: Vec<&str> = [("eye", bank.has_eye()), ("smile", bank.has_smile())]
            .into_iter()
            .filter_map(|(name, loaded)| (!loaded).then_some(name))
            .collect();
        if !missing.is_empty() {
            let status = format!(
                "{} ({} detection unavailable)",
                app.capture.status(),
                missing.join(" and ")
            );
            app.capture.set_status(status);
        }
        (app, task)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                if let TickOutcome::Presented { .. } = self.capture.step(&self.settings.pipeline) {
                    let surface = self.capture.surface();
                    self.frame = Some(image::Handle::from_rgba(
                        surface.width(),
                        surface.height(),
                        surface.pixels().to_vec(),
                    ));
                }
            }
            Message::SourceSelected(kind) => {
                self.settings.source.kind = kind;
                self.settings.save();
                return self.open_source(true);
            }
            Message::Browse => return browse(),
            Message::FileChosen(Some(path)) => {
                self.settings.source.kind = SourceKind::VideoFile;
                self.settings.source.file = Some(path);
                self.settings.save();
                return self.open_source(false);
            }
            Message::FileChosen(None) => {}
            Message::FilterSelected(mode) => {
                self.settings.pipeline.filter = mode;
                self.settings.save();
                self.capture.set_status(format!("Filter: {mode}"));
            }
            Message::DetectionToggled(enabled) => {
                self.settings.pipeline.detection.enabled = enabled;
                self.settings.save();
                let state = if enabled { "On" } else { "Off" };
                self.capture.set_status(format!("Face Detection: {state}"));
            }
            Message::ScaleChanged(value) => {
                self.settings.pipeline.detection.set_scale_factor(value);
                self.settings.save();
            }
            Message::NeighborsChanged(value) => {
                self.settings.pipeline.detection.set_min_neighbors(value);
                self.settings.save();
            }
            Message::EyesToggled(on) => {
                self.settings.pipeline.detection.detect_eyes = on && self.capture.bank().has_eye();
                self.settings.save();
            }
            Message::SmileToggled(on) => {
                self.settings.pipeline.detection.detect_smile =
                    on && self.capture.bank().has_smile();
                self.settings.save();
            }
            Message::Snapshot => {
                let dir = self.settings.snapshot_dir.clone();
                if let Err(e) = self.capture.snapshot(&dir, &ImageFileWriter::new()) {
                    log::warn!("Snapshot failed: {e}");
                    self.capture.set_status(format!("Snapshot failed: {e}"));
                }
            }
            Message::OpenSnapshots => {
                let dir = &self.settings.snapshot_dir;
                if let Err(e) = std::fs::create_dir_all(dir).and_then(|_| open::that(dir)) {
                    log::warn!("Could not open {}: {e}", dir.display());
                }
            }
            Message::AppearanceSelected(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::DialogClosed => {}
            Message::CloseRequested(_) => {
                self.capture.stop();
                self.settings.save();
                return iced::exit();
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let video: Element<'_, Message> = match &self.frame {
            Some(handle) => image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => text("").into(),
        };
        let video = container(video)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(theme::video_surface);

        let status = container(text(self.capture.status().to_string()).size(13))
            .padding([3, 6])
            .width(Length::Fill)
            .style(theme::status_bar);

        let bank = self.capture.bank();
        column![
            container(text("Advanced Face Detection").size(22))
                .width(Length::Fill)
                .center_x(Length::Fill),
            panels::source_panel::view(&self.settings.source, self.settings.appearance),
            video,
            panels::controls_panel::view(
                &self.settings.pipeline,
                self.capture.last_frame().is_some()
            ),
            status,
            panels::detection_panel::view(
                &self.settings.pipeline.detection,
                bank.has_eye(),
                bank.has_smile()
            ),
        ]
        .spacing(10)
        .padding(10)
        .height(Length::Fill)
        .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let close = window::close_requests().map(Message::CloseRequested);
        if self.capture.is_stopped() {
            close
        } else {
            Subscription::batch([
                iced::time::every(FRAME_INTERVAL).map(|_| Message::Tick),
                close,
            ])
        }
    }

    /// Switch the capture loop to the selected source, raising a dialog on
    /// failure. With `browse_if_missing`, a video file selection without a
    /// file also opens the file picker.
    fn open_source(&mut self, browse_if_missing: bool) -> Task<Message> {
        self.frame = None;
        match switch_source(&mut self.capture, &self.settings.source) {
            SourceSwitch::Opened => Task::none(),
            SourceSwitch::NeedsFile if browse_if_missing => browse(),
            SourceSwitch::NeedsFile => Task::none(),
            SourceSwitch::Failed(message) => error_dialog(message),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SourceSwitch {
    Opened,
    /// Video file chosen without a file; the old source is released anyway.
    NeedsFile,
    Failed(String),
}

fn switch_source(capture: &mut CaptureLoop, selection: &SourceSelection) -> SourceSwitch {
    match capture.switch_source(selection) {
        Ok(()) => SourceSwitch::Opened,
        Err(SourceError::NoFileSelected) => SourceSwitch::NeedsFile,
        Err(e) => SourceSwitch::Failed(format!("Could not open video source: {e}")),
    }
}

fn browse() -> Task<Message> {
    Task::perform(
        async {
            rfd::AsyncFileDialog::new()
                .set_title("Select Video File")
                .add_filter("Video files", VIDEO_EXTENSIONS)
                .add_filter("All files", &["*"])
                .pick_file()
                .await
                .map(|h| h.path().to_path_buf())
        },
        Message::FileChosen,
    )
}

fn error_dialog(description: String) -> Task<Message> {
    Task::perform(
        async move {
            rfd::AsyncMessageDialog::new()
                .set_level(rfd::MessageLevel::Error)
                .set_title("Error")
                .set_description(description)
                .set_buttons(rfd::MessageButtons::Ok)
                .show()
                .await;
        },
        |_| Message::DialogClosed,
    )
}

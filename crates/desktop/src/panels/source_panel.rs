use iced::widget::{button, pick_list, row, text, Space};
use iced::{Alignment, Element, Length};

use facewatch_core::video::domain::frame_source::{SourceKind, SourceSelection};

use crate::app::Message;
use crate::settings::Appearance;

/// Source picker on the left, theme picker on the right.
pub fn view<'a>(source: &SourceSelection, appearance: Appearance) -> Element<'a, Message> {
    let file_label = source
        .file
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    row![
        text("Video Source:"),
        pick_list(SourceKind::ALL, Some(source.kind), Message::SourceSelected).width(160),
        button(text("Browse...")).on_press(Message::Browse),
        text(file_label).size(13),
        Space::new().width(Length::Fill),
        text("Theme:"),
        pick_list(Appearance::ALL, Some(appearance), Message::AppearanceSelected).width(110),
    ]
    .spacing(10)
    .align_y(Alignment::Center)
    .into()
}

use iced::widget::{button, checkbox, pick_list, row, text, Space};
use iced::{Alignment, Element, Length};

use facewatch_core::filtering::domain::filter_mode::FilterMode;
use facewatch_core::pipeline::pipeline_config::PipelineConfig;

use crate::app::Message;

pub fn view<'a>(config: &PipelineConfig, can_snapshot: bool) -> Element<'a, Message> {
    row![
        checkbox(config.detection.enabled)
            .label("Face Detection")
            .on_toggle(Message::DetectionToggled),
        Space::new().width(10),
        text("Filter:"),
        pick_list(FilterMode::ALL, Some(config.filter), Message::FilterSelected).width(160),
        Space::new().width(Length::Fill),
        button(text("Open Snapshots")).on_press(Message::OpenSnapshots),
        button(text("Take Snapshot")).on_press_maybe(can_snapshot.then_some(Message::Snapshot)),
    ]
    .spacing(10)
    .align_y(Alignment::Center)
    .into()
}

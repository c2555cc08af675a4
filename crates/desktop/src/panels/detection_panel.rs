use iced::widget::{checkbox, column, container, row, slider, text};
use iced::{Alignment, Element, Length};

use facewatch_core::detection::domain::detection_settings::{
    DetectionSettings, MIN_NEIGHBORS_RANGE, SCALE_FACTOR_RANGE,
};

use crate::app::Message;
use crate::theme;

const LABEL_WIDTH: f32 = 110.0;
const SLIDER_WIDTH: f32 = 200.0;

/// Scale and neighbour sliders plus the eye and smile toggles.
///
/// A toggle whose cascade failed to load is shown but cannot be checked.
pub fn view<'a>(
    settings: &DetectionSettings,
    has_eye: bool,
    has_smile: bool,
) -> Element<'a, Message> {
    let (scale_lo, scale_hi) = SCALE_FACTOR_RANGE;
    let (neighbors_lo, neighbors_hi) = MIN_NEIGHBORS_RANGE;

    let scale = row![
        text("Scale Factor:").width(LABEL_WIDTH),
        slider(scale_lo..=scale_hi, settings.scale_factor(), Message::ScaleChanged)
            .step(0.01)
            .width(SLIDER_WIDTH),
        text(format!("{:.2}", settings.scale_factor())).width(40),
        checkbox(settings.detect_eyes && has_eye)
            .label("Detect Eyes")
            .on_toggle_maybe(has_eye.then_some(Message::EyesToggled)),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let neighbors = row![
        text("Min Neighbors:").width(LABEL_WIDTH),
        slider(
            neighbors_lo..=neighbors_hi,
            settings.min_neighbors(),
            Message::NeighborsChanged
        )
        .width(SLIDER_WIDTH),
        text(settings.min_neighbors().to_string()).width(40),
        checkbox(settings.detect_smile && has_smile)
            .label("Detect Smile")
            .on_toggle_maybe(has_smile.then_some(Message::SmileToggled)),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    container(column![text("Detection Settings").size(15), scale, neighbors].spacing(8))
        .padding(10)
        .width(Length::Fill)
        .style(theme::settings_group)
        .into()
}

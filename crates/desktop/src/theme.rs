use iced::border::Border;
use iced::widget::container;
use iced::{color, Color, Theme};
use iced::theme::Palette;

use crate::settings::Appearance;

pub fn resolve_theme(appearance: Appearance) -> Theme {
    let is_dark = match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => detect_system_dark_mode(),
    };
    if is_dark {
        Theme::custom("Facewatch Dark", dark_palette())
    } else {
        Theme::custom("Facewatch Light", light_palette())
    }
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x20, 0x22, 0x25),
        text: color!(0xd8, 0xd8, 0xd8),
        primary: color!(0x3d, 0xb8, 0x6b),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xf0, 0xf0, 0xf0),
        text: color!(0x1d, 0x1d, 0x1f),
        primary: color!(0x1f, 0x8f, 0x4e),
        success: color!(0x34, 0xc7, 0x59),
        warning: color!(0xff, 0x9f, 0x0a),
        danger: color!(0xff, 0x3b, 0x30),
    }
}

/// Black canvas behind the video, like an empty display.
pub fn video_surface(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Color::BLACK.into()),
        ..container::Style::default()
    }
}

/// Sunken strip for the status line.
pub fn status_bar(theme: &Theme) -> container::Style {
    let palette = theme.extended_palette();
    container::Style {
        background: Some(palette.background.weak.color.into()),
        border: Border {
            color: palette.background.strong.color,
            width: 1.0,
            radius: 2.0.into(),
        },
        ..container::Style::default()
    }
}

/// Framed group for the detection settings.
pub fn settings_group(theme: &Theme) -> container::Style {
    let palette = theme.extended_palette();
    container::Style {
        border: Border {
            color: palette.background.strong.color,
            width: 1.0,
            radius: 4.0.into(),
        },
        ..container::Style::default()
    }
}

fn detect_system_dark_mode() -> bool {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .trim()
                    .eq_ignore_ascii_case("dark")
            })
            .unwrap_or(true)
    }
    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}

mod app;
mod panels;
mod settings;
mod theme;

use std::process;

use facewatch_core::detection::infrastructure::cascade_loader::load_detector_bank;

use app::App;

fn main() -> iced::Result {
    env_logger::init();

    let bank = match load_detector_bank(None) {
        Ok(bank) => bank,
        Err(e) => {
            log::error!("{e}");
            rfd::MessageDialog::new()
                .set_level(rfd::MessageLevel::Error)
                .set_title("Error")
                .set_description(format!("Could not load the face detector: {e}"))
                .set_buttons(rfd::MessageButtons::Ok)
                .show();
            process::exit(1);
        }
    };

    iced::application(move || App::new(bank.clone()), App::update, App::view)
        .title("Beautiful Face Detection App")
        .theme(App::theme)
        .subscription(App::subscription)
        .window(iced::window::Settings {
            size: iced::Size::new(1000.0, 700.0),
            exit_on_close_request: false,
            ..Default::default()
        })
        .run()
}

mod api;
mod app;
mod application;
mod config;
mod domain;
mod ui;
mod utils;

use iced::{window, Size};

fn main() -> iced::Result {
    tracing_subscriber::fmt::init();

    iced::application(app::DownloadApp::new, app::update, app::view)
        .title("Instagram Post Downloader")
        .subscription(app::subscription)
        .window(window::Settings {
            size: Size::new(640.0, 720.0),
            resizable: false,
            ..Default::default()
        })
        .run()
}

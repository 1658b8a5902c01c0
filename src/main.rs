mod api;
mod app;
mod application;
mod config;
mod cover;
mod domain;
mod resolver;
mod shell;
mod ui;
mod utils;

use iced::window;
use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("media_cover=info")),
        )
        .init();

    iced::application(app::CoverApp::default, app::update, app::view)
        .title("Media Cover")
        .subscription(app::subscription)
        .theme(app::theme)
        .window(window::Settings {
            size: app::INITIAL_SIZE,
            ..Default::default()
        })
        .run()
}

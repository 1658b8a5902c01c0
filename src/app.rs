use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use iced::widget::{image, scrollable, stack};
use iced::{event, keyboard, window, Event, Size, Subscription, Task, Theme};

use crate::api::{ClientConfig, MediaClient};
use crate::application::download_coordinator::SaveSettings;
use crate::application::DownloadCoordinator;
use crate::config::CoverConfig;
use crate::cover::{CoverController, PageScroll, Viewport};
use crate::domain::{DownloadResult, MediaKind};
use crate::resolver::{MediaResolver, PageSnapshot};
use crate::shell::{CommandRegistry, NativeNotifier, NativeSaveDialog};
use crate::ui::{cover_view, CoverMessage, PageMessage, PageView};

pub const INITIAL_SIZE: Size = Size::new(1024.0, 768.0);

pub struct CoverApp {
    view: PageView,
    config: CoverConfig,
    /// Where `config` is saved back; `None` keeps changes in memory
    config_path: Option<PathBuf>,
    resolver: MediaResolver,
    covers: CoverController,
    client: MediaClient,
    coordinator: DownloadCoordinator,
    commands: CommandRegistry<Message>,
    page: Option<PageSnapshot>,
    viewport: Viewport,
    preview: Option<image::Handle>,
    downloads_in_flight: usize,
}

impl Default for CoverApp {
    fn default() -> Self {
        let config_path = CoverConfig::default_path();
        let config = config_path
            .as_deref()
            .map(|path| {
                CoverConfig::load_from(path).unwrap_or_else(|e| {
                    tracing::warn!("Using default config, {}: {}", path.display(), e);
                    CoverConfig::default()
                })
            })
            .unwrap_or_default();
        Self::new(config, config_path)
    }
}

impl CoverApp {
    pub fn new(config: CoverConfig, config_path: Option<PathBuf>) -> Self {
        let resolver = MediaResolver::from_config(&config.locator).unwrap_or_else(|e| {
            tracing::warn!("Bad locator config, using sibling offsets: {}", e);
            MediaResolver::default()
        });
        let client = MediaClient::new(ClientConfig {
            max_download_bytes: config.max_download_bytes,
            ..ClientConfig::default()
        });
        let coordinator = DownloadCoordinator::new(
            client.clone(),
            Arc::new(NativeSaveDialog),
            Arc::new(NativeNotifier),
            SaveSettings {
                download_dir: config.download_dir.clone(),
                random_name_length: config.random_name_length,
                notification_icon: config.notification_icon.clone(),
            },
        );

        let mut commands = CommandRegistry::default();
        commands
            .on_command("context-menu", || Message::Page(PageMessage::RightClickPressed))
            .on_command("close-cover", || Message::Cover(CoverMessage::BackgroundClicked))
            .on_command("toggle-dark-mode", || Message::ToggleDarkMode);

        let mut view = PageView::default();
        if let Some(path) = std::env::args().nth(1) {
            view.snapshot_path = path;
        }

        Self {
            view,
            covers: CoverController::new(config.fill_ratio),
            config,
            config_path,
            resolver,
            client,
            coordinator,
            commands,
            page: None,
            viewport: Viewport::new(INITIAL_SIZE.width, INITIAL_SIZE.height),
            preview: None,
            downloads_in_flight: 0,
        }
    }

    fn right_click(&mut self) -> Task<Message> {
        if self.covers.is_open() {
            tracing::debug!("Cover already open, ignoring right-click");
            return Task::none();
        }
        let Some(page) = &self.page else {
            self.view.status_message = "Load a page snapshot first".to_string();
            return Task::none();
        };

        let target = match page.select_first(&self.view.target_selector) {
            Ok(Some(target)) => target,
            Ok(None) => {
                self.view.status_message = "No element matches that selector".to_string();
                return Task::none();
            }
            Err(e) => {
                self.view.status_message = e.to_string();
                return Task::none();
            }
        };

        let Some(media) = self.resolver.resolve_context_menu(page, target) else {
            tracing::debug!("No media behind {}", self.view.target_selector);
            return Task::none();
        };

        let url = media.source_url.clone();
        let kind = media.kind;
        if let Err(e) = self.covers.open(media, self.viewport) {
            tracing::debug!("{}", e);
            return Task::none();
        }
        self.preview = None;

        if kind == MediaKind::Picture {
            let client = self.client.clone();
            return Task::perform(
                async move {
                    let preview = client
                        .fetch_bytes(&url)
                        .await
                        .map(|bytes| {
                            let size = image_dimensions(&bytes);
                            (bytes, size)
                        })
                        .map_err(|e| e.to_string());
                    (url, preview)
                },
                |(url, preview)| Message::PreviewLoaded(url, preview),
            );
        }
        Task::none()
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Page(PageMessage),
    Cover(CoverMessage),
    SnapshotLoaded(Result<String, String>),
    /// (Source URL, (image bytes, decoded width and height))
    PreviewLoaded(String, Result<(Vec<u8>, Option<(u32, u32)>), String>),
    /// `None` when the save dialog was dismissed
    DownloadFinished(Option<DownloadResult>),
    HostCommand(&'static str),
    ToggleDarkMode,
    ViewportResized(Size),
}

pub fn update(app: &mut CoverApp, message: Message) -> Task<Message> {
    match message {
        Message::Page(page_msg) => {
            app.view.update(page_msg.clone());

            match page_msg {
                PageMessage::LoadPressed if !app.view.snapshot_path.is_empty() => {
                    let path = app.view.snapshot_path.clone();
                    app.view.status_message = format!("Loading {}", path);
                    return Task::perform(
                        async move { tokio::fs::read_to_string(path).await.map_err(|e| e.to_string()) },
                        Message::SnapshotLoaded,
                    );
                }
                PageMessage::RightClickPressed => return app.right_click(),
                _ => {}
            }
        }
        Message::SnapshotLoaded(result) => match result {
            Ok(html) => {
                let page_url = Some(app.view.page_url.trim()).filter(|u| !u.is_empty());
                match PageSnapshot::parse(&html, page_url) {
                    Ok(page) => {
                        app.page = Some(page);
                        app.view.status_message = "Page loaded, pick a target to right-click".to_string();
                    }
                    Err(e) => app.view.status_message = e.to_string(),
                }
            }
            Err(e) => {
                app.view.status_message = format!("Failed to read snapshot: {}", e);
            }
        },
        Message::PreviewLoaded(url, result) => {
            let current = app.covers.current().map(|c| c.media.source_url.as_str());
            if current != Some(url.as_str()) {
                return Task::none();
            }
            match result {
                Ok((bytes, size)) => {
                    if let Some((width, height)) = size {
                        app.covers.set_natural_size(width, height, app.viewport);
                    }
                    app.preview = Some(image::Handle::from_bytes(bytes));
                }
                Err(e) => tracing::warn!("Preview of {} failed: {}", url, e),
            }
        }
        Message::Cover(CoverMessage::BackgroundClicked) => {
            if app.covers.click_background().is_some() {
                app.preview = None;
            }
        }
        Message::Cover(CoverMessage::MediaClicked) => {
            if let Some(media) = app.covers.click_media() {
                app.downloads_in_flight += 1;
                app.view.status_message = format!("Saving {} file(s)...", app.downloads_in_flight);
                let coordinator = app.coordinator.clone();
                return Task::perform(
                    async move { coordinator.save_media(media).await },
                    Message::DownloadFinished,
                );
            }
        }
        Message::DownloadFinished(result) => {
            app.downloads_in_flight = app.downloads_in_flight.saturating_sub(1);
            app.view.status_message = match result {
                Some(result) => result.message,
                None => "Save cancelled".to_string(),
            };
        }
        Message::HostCommand(name) => {
            return Task::batch(app.commands.dispatch(name).into_iter().map(Task::done));
        }
        Message::ToggleDarkMode => {
            app.config.dark_mode = !app.config.dark_mode;
            if let Some(path) = &app.config_path {
                if let Err(e) = app.config.save_to(path) {
                    tracing::warn!("Failed to save config: {}", e);
                }
            }
        }
        Message::ViewportResized(size) => {
            app.viewport = Viewport::new(size.width, size.height);
            app.covers.relayout(app.viewport);
        }
    }
    Task::none()
}

pub fn view(app: &CoverApp) -> iced::Element<'_, Message> {
    let page = app.view.view().map(Message::Page);
    let page = match app.covers.page_scroll() {
        PageScroll::Auto => scrollable(page).into(),
        PageScroll::Hidden => page,
    };

    match app.covers.current() {
        Some(cover) => stack![page, cover_view(cover, app.preview.as_ref()).map(Message::Cover)].into(),
        None => page,
    }
}

pub fn theme(app: &CoverApp) -> Theme {
    if app.config.dark_mode {
        Theme::Dark
    } else {
        Theme::Light
    }
}

pub fn subscription(_app: &CoverApp) -> Subscription<Message> {
    event::listen_with(handle_event)
}

fn handle_event(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::Resized(size)) => Some(Message::ViewportResized(size)),
        Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) => {
            shortcut_command(&key, modifiers).map(Message::HostCommand)
        }
        _ => None,
    }
}

/// Reads only the image header, the pixels are decoded by the image widget.
fn image_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ::image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// Menu accelerators, forwarded to the command registry by name.
fn shortcut_command(key: &keyboard::Key, modifiers: keyboard::Modifiers) -> Option<&'static str> {
    use keyboard::key::Named;

    match key {
        keyboard::Key::Named(Named::Escape) => Some("close-cover"),
        keyboard::Key::Named(Named::ContextMenu) => Some("context-menu"),
        keyboard::Key::Named(Named::F10) if modifiers.shift() => Some("context-menu"),
        keyboard::Key::Character(c) if modifiers.command() && c.as_str() == "d" => {
            Some("toggle-dark-mode")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_page(html: &str) -> CoverApp {
        let dir = std::env::temp_dir();
        let mut app = CoverApp::new(
            CoverConfig {
                download_dir: dir,
                ..CoverConfig::default()
            },
            None,
        );
        app.page = Some(PageSnapshot::parse(html, None).unwrap());
        app
    }

    fn right_click(app: &mut CoverApp, selector: &str) {
        let _ = update(app, Message::Page(PageMessage::TargetChanged(selector.to_string())));
        let _ = update(app, Message::Page(PageMessage::RightClickPressed));
    }

    #[test]
    fn test_right_click_opens_video_cover() {
        let mut app = app_with_page(
            r#"<div><div><video src="v.mp4"></video></div><i></i><a id="hit"></a></div>"#,
        );
        right_click(&mut app, "#hit");

        let cover = app.covers.current().unwrap();
        assert_eq!(cover.media.kind, MediaKind::Video);
        assert_eq!(app.covers.page_scroll(), PageScroll::Hidden);
    }

    #[test]
    fn test_right_click_without_media_keeps_closed() {
        let mut app = app_with_page(r#"<div><p></p><a id="hit"></a></div>"#);
        right_click(&mut app, "#hit");
        assert!(!app.covers.is_open());
    }

    #[test]
    fn test_second_right_click_keeps_first_cover() {
        let mut app = app_with_page(
            r#"<div><div><video src="one.mp4"></video></div><i></i><a id="a"></a><div><video src="two.mp4"></video></div><i></i><a id="b"></a></div>"#,
        );
        right_click(&mut app, "#a");
        right_click(&mut app, "#b");
        assert_eq!(app.covers.current().unwrap().media.source_url, "one.mp4");
    }

    #[test]
    fn test_background_click_closes_cover() {
        let mut app = app_with_page(
            r#"<div><div><video src="v.mp4"></video></div><i></i><a id="hit"></a></div>"#,
        );
        right_click(&mut app, "#hit");
        let _ = update(&mut app, Message::Cover(CoverMessage::BackgroundClicked));
        assert!(!app.covers.is_open());
        assert_eq!(app.covers.page_scroll(), PageScroll::Auto);
    }

    #[test]
    fn test_stale_preview_is_ignored() {
        let mut app = app_with_page(r#"<div><div><img src="p.jpg"></div><a id="hit"></a></div>"#);
        right_click(&mut app, "#hit");
        let _ = update(
            &mut app,
            Message::PreviewLoaded("other.jpg".to_string(), Ok((vec![1, 2, 3], Some((4, 4))))),
        );
        assert!(app.preview.is_none());
    }

    #[test]
    fn test_media_clicks_start_independent_downloads() {
        let mut app = app_with_page(
            r#"<div><div><video src="v.mp4"></video></div><i></i><a id="hit"></a></div>"#,
        );
        right_click(&mut app, "#hit");

        let _ = update(&mut app, Message::Cover(CoverMessage::MediaClicked));
        let _ = update(&mut app, Message::Cover(CoverMessage::MediaClicked));

        assert!(app.covers.is_open());
        assert_eq!(app.downloads_in_flight, 2);
        assert_eq!(app.view.status_message, "Saving 2 file(s)...");

        let _ = update(&mut app, Message::DownloadFinished(None));
        assert_eq!(app.downloads_in_flight, 1);
        assert!(app.covers.is_open());
    }

    #[test]
    fn test_media_click_without_cover_does_nothing() {
        let mut app = app_with_page("<p></p>");
        let _ = update(&mut app, Message::Cover(CoverMessage::MediaClicked));
        assert_eq!(app.downloads_in_flight, 0);
    }

    #[test]
    fn test_toggle_dark_mode_command_saves_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut app = CoverApp::new(CoverConfig::default(), Some(path.clone()));
        assert_eq!(theme(&app), Theme::Light);

        let _ = update(&mut app, Message::HostCommand("toggle-dark-mode"));
        for message in app.commands.dispatch("toggle-dark-mode") {
            let _ = update(&mut app, message);
        }

        assert_eq!(theme(&app), Theme::Dark);
        let saved = CoverConfig::load_from(&path).unwrap();
        assert!(saved.dark_mode);
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("\"dark_mode\": true"));
    }

    #[test]
    fn test_image_dimensions_from_header() {
        let mut png = Vec::new();
        ::image::RgbImage::new(4, 3)
            .write_to(&mut Cursor::new(&mut png), ::image::ImageFormat::Png)
            .unwrap();
        assert_eq!(image_dimensions(&png), Some((4, 3)));
        assert_eq!(image_dimensions(b"not an image"), None);
    }

    #[test]
    fn test_shortcuts() {
        use keyboard::key::Named;

        assert_eq!(
            shortcut_command(&keyboard::Key::Named(Named::Escape), keyboard::Modifiers::empty()),
            Some("close-cover")
        );
        assert_eq!(
            shortcut_command(&keyboard::Key::Named(Named::F10), keyboard::Modifiers::SHIFT),
            Some("context-menu")
        );
        assert_eq!(
            shortcut_command(&keyboard::Key::Named(Named::F10), keyboard::Modifiers::empty()),
            None
        );
    }
}

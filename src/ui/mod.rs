use iced::{
    mouse,
    widget::{button, column, container, image, mouse_area, row, text, text_input, Space},
    Color, Element, Length,
};

use crate::cover::Cover;
use crate::domain::MediaKind;

/// Form used to load a page snapshot and pick the right-click target
pub struct PageView {
    pub snapshot_path: String,
    pub page_url: String,
    pub target_selector: String,
    pub status_message: String,
}

impl Default for PageView {
    fn default() -> Self {
        Self {
            snapshot_path: String::new(),
            page_url: String::new(),
            target_selector: String::new(),
            status_message: "Load a page snapshot to start".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PageMessage {
    SnapshotPathChanged(String),
    PageUrlChanged(String),
    TargetChanged(String),
    LoadPressed,
    RightClickPressed,
}

#[derive(Debug, Clone)]
pub enum CoverMessage {
    BackgroundClicked,
    MediaClicked,
}

impl PageView {
    pub fn update(&mut self, message: PageMessage) {
        match message {
            PageMessage::SnapshotPathChanged(path) => self.snapshot_path = path,
            PageMessage::PageUrlChanged(url) => self.page_url = url,
            PageMessage::TargetChanged(selector) => self.target_selector = selector,
            PageMessage::LoadPressed | PageMessage::RightClickPressed => {
                // Will be handled by the app
            }
        }
    }

    pub fn view(&self) -> Element<'_, PageMessage> {
        column![
            text("Media Cover").size(32),
            Space::new().height(Length::Fixed(20.0)),
            text("Page snapshot:").size(16),
            row![
                text_input("Path to saved page HTML...", &self.snapshot_path)
                    .on_input(PageMessage::SnapshotPathChanged)
                    .padding(10),
                button("Load")
                    .on_press(PageMessage::LoadPressed)
                    .padding([10, 20]),
            ]
            .spacing(10),
            text_input("Page URL (optional)...", &self.page_url)
                .on_input(PageMessage::PageUrlChanged)
                .padding(10),
            Space::new().height(Length::Fixed(10.0)),
            text("Right-click target:").size(16),
            row![
                text_input("CSS selector of the clicked element...", &self.target_selector)
                    .on_input(PageMessage::TargetChanged)
                    .on_submit(PageMessage::RightClickPressed)
                    .padding(10),
                button("Right-click")
                    .on_press(PageMessage::RightClickPressed)
                    .padding([10, 20]),
            ]
            .spacing(10),
            Space::new().height(Length::Fixed(10.0)),
            text(&self.status_message).size(14),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}

fn sized<'a>(
    content: impl Into<Element<'a, CoverMessage>>,
    (width, height): (Option<f32>, Option<f32>),
) -> container::Container<'a, CoverMessage> {
    container(content)
        .width(width.map_or(Length::Shrink, Length::Fixed))
        .height(height.map_or(Length::Shrink, Length::Fixed))
}

/// Full-window overlay with the enlarged media.
pub fn cover_view<'a>(cover: &'a Cover, preview: Option<&'a image::Handle>) -> Element<'a, CoverMessage> {
    let size = cover.layout.size();

    let media: Element<'a, CoverMessage> = match (cover.media.kind, preview) {
        (MediaKind::Picture, Some(handle)) => sized(
            image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill),
            size,
        )
        .into(),
        (MediaKind::Picture, None) => sized(text("Loading...").size(16), size).into(),
        (MediaKind::Video, _) => {
            let mut flags = Vec::new();
            if cover.autoplay() {
                flags.push("autoplay");
            }
            if cover.controls() {
                flags.push("controls");
            }
            sized(
                column![
                    text("Video").size(24),
                    text(&cover.media.source_url).size(12),
                    text(flags.join(" / ")).size(12),
                    text("Click to save as mp4").size(14),
                ]
                .spacing(8),
                size,
            )
            .padding(20)
            .style(|_theme| container::Style {
                background: Some(Color::from_rgb(0.1, 0.1, 0.1).into()),
                text_color: Some(Color::WHITE),
                ..Default::default()
            })
            .into()
        }
    };

    let interaction = if cover.pointer_cursor() {
        mouse::Interaction::Pointer
    } else {
        mouse::Interaction::Idle
    };

    let media = mouse_area(media)
        .on_press(CoverMessage::MediaClicked)
        .interaction(interaction);

    mouse_area(
        container(media)
            .center(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.85).into()),
                ..Default::default()
            }),
    )
    .on_press(CoverMessage::BackgroundClicked)
    .into()
}

pub mod locator;
pub mod snapshot;

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use crate::config::LocatorConfig;
use crate::domain::{MediaKind, MediaTarget};

pub use locator::{MediaContainerLocator, SiblingOffsetLocator};
pub use snapshot::{PageSnapshot, SnapshotError};

use snapshot::first_descendant;

static VIDEO: LazyLock<Selector> = LazyLock::new(|| Selector::parse("video").unwrap());
static SOURCE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("source").unwrap());
static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

/// Turns a context-menu target on the hosted page into a [`MediaTarget`].
///
/// Every lookup is best effort: the page is not ours, so a missing node or
/// attribute just means "no media here".
pub struct MediaResolver {
    locator: Box<dyn MediaContainerLocator>,
}

impl Default for MediaResolver {
    fn default() -> Self {
        Self::new(SiblingOffsetLocator::default())
    }
}

impl MediaResolver {
    pub fn new(locator: impl MediaContainerLocator + 'static) -> Self {
        Self {
            locator: Box::new(locator),
        }
    }

    pub fn from_config(config: &LocatorConfig) -> Result<Self, SnapshotError> {
        Ok(Self {
            locator: locator::from_config(config)?,
        })
    }

    pub fn resolve_context_menu(
        &self,
        page: &PageSnapshot,
        target: ElementRef<'_>,
    ) -> Option<MediaTarget> {
        if target.value().name().eq_ignore_ascii_case("button") {
            let mut root = target;
            for _ in 0..self.locator.button_ancestor_depth() {
                root = root.parent().and_then(ElementRef::wrap)?;
            }
            return self
                .resolve_video(page, root, true)
                .or_else(|| self.resolve_picture(page, root, true));
        }

        self.resolve_video(page, target, false)
            .or_else(|| self.resolve_picture(page, target, false))
    }

    pub fn resolve_video(
        &self,
        page: &PageSnapshot,
        target: ElementRef<'_>,
        true_target: bool,
    ) -> Option<MediaTarget> {
        let container = if true_target {
            target
        } else {
            self.locator.video_container(target)?
        };
        let video = first_descendant(container, &VIDEO)?;

        let src = match non_empty_attr(video, "src") {
            Some(src) => src,
            None => {
                let source = first_descendant(video, &SOURCE)?;
                non_empty_attr(source, "src")?
            }
        };

        let (width, height) = first_descendant(container, &IMG)
            .map(natural_size)
            .unwrap_or((0, 0));

        tracing::debug!("Resolved video cover: {}", src);
        Some(
            MediaTarget::new(MediaKind::Video, page.resolve_url(src))
                .with_natural_size(width, height),
        )
    }

    pub fn resolve_picture(
        &self,
        page: &PageSnapshot,
        target: ElementRef<'_>,
        true_target: bool,
    ) -> Option<MediaTarget> {
        let container = if true_target {
            target
        } else {
            self.locator.picture_container(target)?
        };
        let img = first_descendant(container, &IMG)?;
        let src = non_empty_attr(img, "src")?;
        let (width, height) = natural_size(img);

        tracing::debug!("Resolved picture cover: {}", src);
        Some(
            MediaTarget::new(MediaKind::Picture, page.resolve_url(src))
                .with_natural_size(width, height),
        )
    }
}

fn non_empty_attr<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn natural_size(img: ElementRef<'_>) -> (u32, u32) {
    let dim = |name: &str| {
        img.value()
            .attr(name)
            .and_then(|v| v.trim().trim_end_matches("px").parse::<u32>().ok())
            .unwrap_or(0)
    };
    (dim("width"), dim("height"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::locator::ClosestAncestorLocator;

    fn resolve(html: &str, target: &str) -> Option<MediaTarget> {
        let page = PageSnapshot::parse(html, None).unwrap();
        let target = page.select_first(target).unwrap().unwrap();
        MediaResolver::default().resolve_context_menu(&page, target)
    }

    #[test]
    fn test_video_falls_back_to_source_child() {
        let html = r#"<div>
            <div class="media"><video src=""><source src="x.mp4"></video></div><div class="spacer"></div><a id="hit"></a>
        </div>"#;
        let media = resolve(html, "#hit").unwrap();
        assert_eq!(media.kind, MediaKind::Video);
        assert_eq!(media.source_url, "x.mp4");
    }

    #[test]
    fn test_video_without_any_source_is_a_miss() {
        let html = r#"<div><div><video></video></div><i></i><a id="hit"></a></div>"#;
        assert!(resolve(html, "#hit").is_none());
    }

    #[test]
    fn test_video_takes_precedence() {
        let html = r#"<div><div><video src="v.mp4"></video></div><div><img src="p.jpg"></div><a id="hit"></a></div>"#;
        let media = resolve(html, "#hit").unwrap();
        assert_eq!(media.kind, MediaKind::Video);
        assert_eq!(media.source_url, "v.mp4");
    }

    #[test]
    fn test_picture_with_natural_size() {
        let html = r#"<div><i></i><div><img src="p.jpg" width="400" height="300"></div><a id="hit"></a></div>"#;
        let media = resolve(html, "#hit").unwrap();
        assert_eq!(media.kind, MediaKind::Picture);
        assert_eq!(media.source_url, "p.jpg");
        assert_eq!((media.natural_width, media.natural_height), (400, 300));
    }

    #[test]
    fn test_video_size_comes_from_poster_img() {
        let html = r#"<div><div><img src="poster.jpg" width="640" height="360"><video src="v.mp4"></video></div><i></i><a id="hit"></a></div>"#;
        let media = resolve(html, "#hit").unwrap();
        assert_eq!(media.kind, MediaKind::Video);
        assert_eq!((media.natural_width, media.natural_height), (640, 360));
    }

    #[test]
    fn test_empty_img_src_is_a_miss() {
        let html = r#"<div><div><img src=""></div><a id="hit"></a></div>"#;
        assert!(resolve(html, "#hit").is_none());
    }

    #[test]
    fn test_unresolvable_targets() {
        assert!(resolve(r#"<a id="hit"></a>"#, "#hit").is_none());
        assert!(resolve(r#"<div><p></p><a id="hit"></a></div>"#, "#hit").is_none());
        // whitespace text node sits where the picture container should be
        assert!(resolve("<div><div><img src=\"p.jpg\"></div> <a id=\"hit\"></a></div>", "#hit").is_none());
    }

    #[test]
    fn test_button_climbs_to_post_root() {
        let html = r#"<section id="post"><img src="p.jpg"><div><div><button id="more"></button></div></div></section>"#;
        let media = resolve(html, "#more").unwrap();
        assert_eq!(media.kind, MediaKind::Picture);
        assert_eq!(media.source_url, "p.jpg");
    }

    #[test]
    fn test_button_prefers_video_in_post_root() {
        let html = r#"<section><img src="poster.jpg"><video><source src="clip.mp4"></video><div><div><button id="more"></button></div></div></section>"#;
        let media = resolve(html, "#more").unwrap();
        assert_eq!(media.kind, MediaKind::Video);
        assert_eq!(media.source_url, "clip.mp4");
    }

    #[test]
    fn test_button_without_enough_ancestors() {
        // body -> html -> document, which is not an element
        assert!(resolve(r#"<button id="b"></button>"#, "#b").is_none());
    }

    #[test]
    fn test_relative_source_uses_page_url() {
        let html = r#"<div><div><img src="/m/p.jpg"></div><a id="hit"></a></div>"#;
        let page = PageSnapshot::parse(html, Some("https://site.example/feed")).unwrap();
        let target = page.select_first("#hit").unwrap().unwrap();
        let media = MediaResolver::default()
            .resolve_context_menu(&page, target)
            .unwrap();
        assert_eq!(media.source_url, "https://site.example/m/p.jpg");
    }

    #[test]
    fn test_true_target_skips_offsets() {
        let html = r#"<div id="box"><img src="p.jpg"></div>"#;
        let page = PageSnapshot::parse(html, None).unwrap();
        let target = page.select_first("#box").unwrap().unwrap();
        let resolver = MediaResolver::default();

        assert!(resolver.resolve_picture(&page, target, false).is_none());
        assert_eq!(
            resolver.resolve_picture(&page, target, true).unwrap().source_url,
            "p.jpg"
        );
    }

    #[test]
    fn test_swapped_locator() {
        let html = r#"<article><video src="v.mp4"></video><footer><span id="hit"></span></footer></article>"#;
        let page = PageSnapshot::parse(html, None).unwrap();
        let target = page.select_first("#hit").unwrap().unwrap();
        let resolver = MediaResolver::new(ClosestAncestorLocator::new("article", 3).unwrap());

        let media = resolver.resolve_context_menu(&page, target).unwrap();
        assert_eq!(media.kind, MediaKind::Video);
        assert_eq!(media.source_url, "v.mp4");
    }
}

use thiserror::Error;

use crate::domain::{MediaKind, MediaTarget};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoverError {
    #[error("A cover is already open")]
    AlreadyOpen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitDimension {
    Width,
    Height,
}

/// `Width` when the media is relatively wider than the viewport. An unknown
/// media size gives a NaN ratio, which never compares greater, so it falls
/// back to `Height`.
pub fn fit_dimension(media_width: u32, media_height: u32, viewport: Viewport) -> FitDimension {
    let media_ratio = media_width as f32 / media_height as f32;
    let viewport_ratio = viewport.width / viewport.height;
    if media_ratio > viewport_ratio {
        FitDimension::Width
    } else {
        FitDimension::Height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverLayout {
    pub dimension: FitDimension,
    /// Pixel length of the constrained dimension
    pub length: f32,
    /// Pixel length of the other dimension, when the media size is known
    pub cross_length: Option<f32>,
}

impl CoverLayout {
    pub fn compute(media: &MediaTarget, viewport: Viewport, fill_ratio: f32) -> Self {
        let dimension = fit_dimension(media.natural_width, media.natural_height, viewport);
        let known = media.natural_width > 0 && media.natural_height > 0;
        let (w, h) = (media.natural_width as f32, media.natural_height as f32);

        match dimension {
            FitDimension::Width => {
                let length = viewport.width * fill_ratio;
                Self {
                    dimension,
                    length,
                    cross_length: known.then(|| length * h / w),
                }
            }
            FitDimension::Height => {
                let length = viewport.height * fill_ratio;
                Self {
                    dimension,
                    length,
                    cross_length: known.then(|| length * w / h),
                }
            }
        }
    }

    /// (width, height); the unknown side is `None`
    pub fn size(&self) -> (Option<f32>, Option<f32>) {
        match self.dimension {
            FitDimension::Width => (Some(self.length), self.cross_length),
            FitDimension::Height => (self.cross_length, Some(self.length)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageScroll {
    Auto,
    Hidden,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cover {
    pub media: MediaTarget,
    pub layout: CoverLayout,
}

impl Cover {
    pub fn autoplay(&self) -> bool {
        self.media.kind == MediaKind::Video
    }

    pub fn controls(&self) -> bool {
        self.media.kind == MediaKind::Video
    }

    pub fn pointer_cursor(&self) -> bool {
        self.media.kind == MediaKind::Picture
    }
}

/// Owns the single cover slot on the page.
#[derive(Debug)]
pub struct CoverController {
    slot: Option<Cover>,
    fill_ratio: f32,
}

impl Default for CoverController {
    fn default() -> Self {
        Self::new(0.9)
    }
}

impl CoverController {
    pub fn new(fill_ratio: f32) -> Self {
        Self {
            slot: None,
            fill_ratio,
        }
    }

    pub fn is_open(&self) -> bool {
        self.slot.is_some()
    }

    pub fn current(&self) -> Option<&Cover> {
        self.slot.as_ref()
    }

    pub fn page_scroll(&self) -> PageScroll {
        if self.is_open() {
            PageScroll::Hidden
        } else {
            PageScroll::Auto
        }
    }

    pub fn open(&mut self, media: MediaTarget, viewport: Viewport) -> Result<&Cover, CoverError> {
        if self.slot.is_some() {
            return Err(CoverError::AlreadyOpen);
        }
        let layout = CoverLayout::compute(&media, viewport, self.fill_ratio);
        tracing::info!("Opening {:?} cover for {}", media.kind, media.source_url);
        Ok(self.slot.insert(Cover { media, layout }))
    }

    /// Background click. Closes the cover and gives scrolling back to the page.
    pub fn click_background(&mut self) -> Option<Cover> {
        let closed = self.slot.take();
        if closed.is_some() {
            tracing::info!("Cover closed");
        }
        closed
    }

    /// Media click. The cover stays open; the caller downloads the returned media.
    pub fn click_media(&self) -> Option<MediaTarget> {
        self.slot.as_ref().map(|cover| cover.media.clone())
    }

    /// Recomputes the layout after the window is resized.
    pub fn relayout(&mut self, viewport: Viewport) {
        let fill_ratio = self.fill_ratio;
        if let Some(cover) = self.slot.as_mut() {
            cover.layout = CoverLayout::compute(&cover.media, viewport, fill_ratio);
        }
    }

    /// Fills in the natural size once the preview has been decoded.
    pub fn set_natural_size(&mut self, width: u32, height: u32, viewport: Viewport) {
        if let Some(cover) = self.slot.as_mut() {
            cover.media.natural_width = width;
            cover.media.natural_height = height;
        }
        self.relayout(viewport);
    }
}

use scraper::{ElementRef, Selector};

use super::snapshot::{parse_selector, SnapshotError};
use crate::config::LocatorConfig;

/// Knows where the hosted page keeps the media container relative to the
/// element that received the context-menu event. One implementation per
/// page layout.
pub trait MediaContainerLocator: Send + Sync {
    fn video_container<'a>(&self, target: ElementRef<'a>) -> Option<ElementRef<'a>>;

    fn picture_container<'a>(&self, target: ElementRef<'a>) -> Option<ElementRef<'a>>;

    /// Parent elements to climb from a `<button>` target to the post root.
    fn button_ancestor_depth(&self) -> usize;
}

pub fn from_config(
    config: &LocatorConfig,
) -> Result<Box<dyn MediaContainerLocator>, SnapshotError> {
    Ok(match config {
        LocatorConfig::SiblingOffset {
            video_offset,
            picture_offset,
            button_ancestor_depth,
        } => Box::new(SiblingOffsetLocator {
            video_offset: *video_offset,
            picture_offset: *picture_offset,
            button_ancestor_depth: *button_ancestor_depth,
        }),
        LocatorConfig::ClosestAncestor {
            selector,
            button_ancestor_depth,
        } => Box::new(ClosestAncestorLocator::new(selector, *button_ancestor_depth)?),
    })
}

/// Walks `previousSibling` a fixed number of times. Text nodes count as
/// siblings, and landing on one is a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiblingOffsetLocator {
    pub video_offset: usize,
    pub picture_offset: usize,
    pub button_ancestor_depth: usize,
}

impl Default for SiblingOffsetLocator {
    fn default() -> Self {
        Self {
            video_offset: 2,
            picture_offset: 1,
            button_ancestor_depth: 3,
        }
    }
}

impl SiblingOffsetLocator {
    fn nth_previous_sibling<'a>(target: ElementRef<'a>, offset: usize) -> Option<ElementRef<'a>> {
        let mut node = *target;
        for _ in 0..offset {
            node = node.prev_sibling()?;
        }
        ElementRef::wrap(node)
    }
}

impl MediaContainerLocator for SiblingOffsetLocator {
    fn video_container<'a>(&self, target: ElementRef<'a>) -> Option<ElementRef<'a>> {
        Self::nth_previous_sibling(target, self.video_offset)
    }

    fn picture_container<'a>(&self, target: ElementRef<'a>) -> Option<ElementRef<'a>> {
        Self::nth_previous_sibling(target, self.picture_offset)
    }

    fn button_ancestor_depth(&self) -> usize {
        self.button_ancestor_depth
    }
}

/// Uses the nearest ancestor (or the target itself) matching a selector,
/// e.g. `article`, for both media kinds.
#[derive(Debug, Clone)]
pub struct ClosestAncestorLocator {
    selector: Selector,
    button_ancestor_depth: usize,
}

impl ClosestAncestorLocator {
    pub fn new(selector: &str, button_ancestor_depth: usize) -> Result<Self, SnapshotError> {
        Ok(Self {
            selector: parse_selector(selector)?,
            button_ancestor_depth,
        })
    }

    fn closest<'a>(&self, target: ElementRef<'a>) -> Option<ElementRef<'a>> {
        if self.selector.matches(&target) {
            return Some(target);
        }
        target
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| self.selector.matches(el))
    }
}

impl MediaContainerLocator for ClosestAncestorLocator {
    fn video_container<'a>(&self, target: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.closest(target)
    }

    fn picture_container<'a>(&self, target: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.closest(target)
    }

    fn button_ancestor_depth(&self) -> usize {
        self.button_ancestor_depth
    }
}

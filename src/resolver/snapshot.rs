use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("Invalid CSS selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid page URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

/// Serialized copy of the hosted page, as forwarded by the shell.
pub struct PageSnapshot {
    html: Html,
    base_url: Option<Url>,
}

impl PageSnapshot {
    pub fn parse(html: &str, page_url: Option<&str>) -> Result<Self, SnapshotError> {
        let base_url = page_url.map(Url::parse).transpose()?;
        Ok(Self {
            html: Html::parse_document(html),
            base_url,
        })
    }

    /// First element matching `selector`, used to pick the event target.
    pub fn select_first(&self, selector: &str) -> Result<Option<ElementRef<'_>>, SnapshotError> {
        let selector = parse_selector(selector)?;
        Ok(self.html.select(&selector).next())
    }

    /// Absolute form of a `src` attribute, the way the DOM `.src` property reports it.
    /// Without a page URL the raw value is kept.
    pub fn resolve_url(&self, raw: &str) -> String {
        match &self.base_url {
            Some(base) => base
                .join(raw)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| raw.to_string()),
            None => raw.to_string(),
        }
    }
}

pub fn parse_selector(selector: &str) -> Result<Selector, SnapshotError> {
    Selector::parse(selector).map_err(|e| SnapshotError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Descendant elements of `scope` matching `selector`, excluding `scope` itself
/// (same as `querySelectorAll`).
pub fn first_descendant<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).find(|el| el.id() != scope.id())
}

//! HTML → Notion blocks.
//!
//! Two levels: [`rich_text`] turns text-bearing subtrees into annotated runs,
//! [`blocks`] turns each top-level element of the article into zero or more
//! blocks. [`convert`] walks the article and enforces the single-title rule.

pub mod blocks;
pub mod rich_text;
mod tag;

use serde::Serialize;
use tracing::debug;

use crate::dom::{self, Element};
use crate::error::{ConvertError, Result};
use crate::notion::Block;

/// Title used when the article has no `h1`.
pub const TITLE_PLACEHOLDER: &str = "Title";

pub const DEFAULT_STAT_CARD_CLASS: &str = "stat-card";
pub const DEFAULT_TOOLTIP_CLASS: &str = "stat-card__tooltip";

/// What to do with an `h1`/`h2` that has no text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyHeadings {
    #[default]
    Drop,
    Keep,
}

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Prefix for root-relative `href`/`src` values.
    pub base_url: String,
    pub empty_headings: EmptyHeadings,
    pub stat_card_class: String,
    pub tooltip_class: String,
}

impl ConvertOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            empty_headings: EmptyHeadings::default(),
            stat_card_class: DEFAULT_STAT_CARD_CLASS.to_string(),
            tooltip_class: DEFAULT_TOOLTIP_CLASS.to_string(),
        }
    }

    /// Resolve a root-relative URL against the base; anything else is returned as is.
    /// Protocol-relative `//host/...` URLs become `https://host/...` rather than
    /// being appended to the base.
    pub fn resolve(&self, href: &str) -> String {
        if href.starts_with("//") {
            format!("https:{href}")
        } else if href.starts_with('/') {
            format!("{}{}", self.base_url.trim_end_matches('/'), href)
        } else {
            href.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Document {
    /// False when no `h1` was found and `title` is the placeholder.
    pub fn has_title(&self) -> bool {
        self.title != TITLE_PLACEHOLDER
    }
}

/// Per-document traversal state.
pub struct Context<'o> {
    pub options: &'o ConvertOptions,
    title: Option<String>,
}

impl<'o> Context<'o> {
    pub fn new(options: &'o ConvertOptions) -> Self {
        Self { options, title: None }
    }

    pub fn record_title(&mut self, heading: &Element) -> Result<()> {
        if let Some(first) = &self.title {
            return Err(ConvertError::DuplicateTitle {
                first: first.clone(),
                element: heading.outer_html(),
            });
        }
        let title = heading.text();
        debug!(title = %title, "recorded document title");
        self.title = Some(title);
        Ok(())
    }

    fn finish(self, blocks: Vec<Block>) -> Document {
        Document {
            title: self.title.unwrap_or_else(|| TITLE_PLACEHOLDER.to_string()),
            blocks,
        }
    }
}

/// Convert every element child of the article container, in order.
pub fn convert(section: &Element, options: &ConvertOptions) -> Result<Document> {
    let mut ctx = Context::new(options);
    let mut out = Vec::new();
    for el in section.elements() {
        out.extend(blocks::classify(&mut ctx, el)?);
    }
    Ok(ctx.finish(out))
}

/// Locate the article in a full page with `selector`, then [`convert`] it.
pub fn convert_html(html: &str, selector: &str, options: &ConvertOptions) -> Result<Document> {
    let section = dom::select_content(html, selector)?;
    convert(&section, options)
}

/// Shorten serialized markup for log lines.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

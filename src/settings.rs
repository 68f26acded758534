use std::num::NonZeroUsize;

use anyhow::{bail, Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

use crate::chunk::MAX_BLOCKS_PER_REQUEST;
use crate::convert::{ConvertOptions, EmptyHeadings, DEFAULT_STAT_CARD_CLASS, DEFAULT_TOOLTIP_CLASS};
use crate::dom::DEFAULT_CONTENT_SELECTOR;

pub const DEFAULT_API_URL: &str = "https://api.notion.com/v1";
pub const DEFAULT_BASE_URL: &str = "https://www.example.com";

/// Settings read from `NOTION_*` environment variables; CLI flags override them.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Integration token (`NOTION_SECRET`).
    pub secret: Option<String>,
    /// Page the imported article is created under (`NOTION_ROOT_PAGE_ID`).
    pub root_page_id: Option<String>,
    pub api_url: String,
    pub base_url: String,
    pub content_selector: String,
    pub chunk_size: usize,
    pub keep_empty_headings: bool,
    pub stat_card_class: String,
    pub tooltip_class: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_source(Environment::with_prefix("NOTION").try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings: Settings = Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("content_selector", DEFAULT_CONTENT_SELECTOR)?
            .set_default("chunk_size", MAX_BLOCKS_PER_REQUEST as i64)?
            .set_default("keep_empty_headings", false)?
            .set_default("stat_card_class", DEFAULT_STAT_CARD_CLASS)?
            .set_default("tooltip_class", DEFAULT_TOOLTIP_CLASS)?
            .add_source(source)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.chunk_limit()?;
        Ok(settings)
    }

    pub fn chunk_limit(&self) -> Result<NonZeroUsize> {
        match NonZeroUsize::new(self.chunk_size) {
            Some(n) if n.get() <= MAX_BLOCKS_PER_REQUEST => Ok(n),
            _ => bail!(
                "chunk_size must be between 1 and {}, got {}",
                MAX_BLOCKS_PER_REQUEST,
                self.chunk_size
            ),
        }
    }

    pub fn convert_options(&self) -> ConvertOptions {
        let mut options = ConvertOptions::new(self.base_url.clone());
        if self.keep_empty_headings {
            options.empty_headings = EmptyHeadings::Keep;
        }
        options.stat_card_class = self.stat_card_class.clone();
        options.tooltip_class = self.tooltip_class.clone();
        options
    }

    /// Credentials needed by `import`.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let secret = self
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .context("NOTION_SECRET environment variable must be set")?;
        let root = self
            .root_page_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .context("NOTION_ROOT_PAGE_ID environment variable must be set")?;
        Ok((secret, root))
    }
}

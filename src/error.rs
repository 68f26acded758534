use thiserror::Error;

/// Fatal conversion failures. Any of these aborts the whole document.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("could not find article content matching `{0}`")]
    MissingContent(String),

    #[error("invalid content selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("<{tag}> cannot be converted to rich text: {element}")]
    UnsupportedInlineTag { tag: String, element: String },

    #[error("<{tag}> cannot be converted to a block: {element}")]
    UnsupportedBlockTag { tag: String, element: String },

    #[error("anchor has no href: {0}")]
    MissingHref(String),

    #[error("block-level anchor must wrap an image: {0}")]
    AnchorWithoutImage(String),

    #[error("stat card has no tooltip link: {0}")]
    StatCardWithoutLink(String),

    #[error("document has more than one title heading (already titled {first:?}): {element}")]
    DuplicateTitle { first: String, element: String },
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;

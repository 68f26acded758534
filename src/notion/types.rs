use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Notion rejects a single text object longer than this.
pub const MAX_TEXT_LENGTH: usize = 2000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    Bold,
    Italic,
    Underline,
}

/// One span of uniformly formatted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichText {
    pub content: String,
    pub link: Option<String>,
    pub annotations: Annotations,
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            link: None,
            annotations: Annotations::default(),
        }
    }

    pub fn link(content: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            link: Some(url.into()),
            ..Self::plain(content)
        }
    }

    pub fn line_break() -> Self {
        Self::plain("\n")
    }

    pub fn is_line_break(&self) -> bool {
        self.content == "\n"
    }

    /// Copy of this run with `annotation` set.
    pub fn with(&self, annotation: Annotation) -> Self {
        let mut annotations = self.annotations;
        match annotation {
            Annotation::Bold => annotations.bold = true,
            Annotation::Italic => annotations.italic = true,
            Annotation::Underline => annotations.underline = true,
        }
        Self {
            annotations,
            ..self.clone()
        }
    }

    /// Same formatting and link target.
    pub fn same_format(&self, other: &Self) -> bool {
        self.annotations == other.annotations && self.link == other.link
    }
}

#[derive(Serialize)]
struct TextWire<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<LinkWire<'a>>,
}

#[derive(Serialize)]
struct LinkWire<'a> {
    url: &'a str,
}

impl Serialize for RichText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", "text")?;
        map.serialize_entry(
            "text",
            &TextWire {
                content: &self.content,
                link: self.link.as_deref().map(|url| LinkWire { url }),
            },
        )?;
        map.serialize_entry("annotations", &self.annotations)?;
        map.end()
    }
}

/// Background tag for quote blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Color {
    #[serde(rename = "pink_background")]
    Pink,
    #[serde(rename = "gray_background")]
    Gray,
    #[serde(rename = "orange_background")]
    Orange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    One,
    Two,
    Three,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: HeadingLevel,
        rich_text: Vec<RichText>,
    },
    Paragraph {
        rich_text: Vec<RichText>,
    },
    Quote {
        rich_text: Vec<RichText>,
        color: Option<Color>,
    },
    BulletedListItem {
        rich_text: Vec<RichText>,
    },
    Image {
        url: String,
    },
    Bookmark {
        url: String,
    },
}

impl Block {
    /// Notion's `type` discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Heading { level: HeadingLevel::One, .. } => "heading_1",
            Block::Heading { level: HeadingLevel::Two, .. } => "heading_2",
            Block::Heading { level: HeadingLevel::Three, .. } => "heading_3",
            Block::Paragraph { .. } => "paragraph",
            Block::Quote { .. } => "quote",
            Block::BulletedListItem { .. } => "bulleted_list_item",
            Block::Image { .. } => "image",
            Block::Bookmark { .. } => "bookmark",
        }
    }

    pub fn rich_text(&self) -> &[RichText] {
        match self {
            Block::Heading { rich_text, .. }
            | Block::Paragraph { rich_text }
            | Block::Quote { rich_text, .. }
            | Block::BulletedListItem { rich_text } => rich_text,
            Block::Image { .. } | Block::Bookmark { .. } => &[],
        }
    }
}

#[derive(Serialize)]
struct TextBody<'a> {
    rich_text: &'a [RichText],
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<Color>,
}

#[derive(Serialize)]
struct ExternalFile<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    external: LinkWire<'a>,
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("object", "block")?;
        map.serialize_entry("type", kind)?;
        match self {
            Block::Image { url } => map.serialize_entry(
                kind,
                &ExternalFile {
                    kind: "external",
                    external: LinkWire { url },
                },
            )?,
            Block::Bookmark { url } => map.serialize_entry(kind, &LinkWire { url })?,
            Block::Quote { rich_text, color } => map.serialize_entry(
                kind,
                &TextBody {
                    rich_text,
                    color: *color,
                },
            )?,
            _ => map.serialize_entry(
                kind,
                &TextBody {
                    rich_text: self.rich_text(),
                    color: None,
                },
            )?,
        }
        map.end()
    }
}

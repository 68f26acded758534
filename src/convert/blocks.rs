use tracing::{debug, warn};

use super::tag::Tag;
use super::{rich_text, truncate, Context, ConvertOptions, EmptyHeadings};
use crate::dom::{Element, Node};
use crate::error::{ConvertError, Result};
use crate::notion::{Annotation, Block, Color, HeadingLevel};

/// Class substrings that turn an `aside` into a colored quote, checked in order.
const QUOTE_COLORS: &[(&str, Color)] = &[
    ("quote-box", Color::Pink),
    ("epigraph", Color::Gray),
    ("rules-sidebar", Color::Orange),
];

/// Blocks for one block-level element. Most tags give exactly one block;
/// discarded tags give none and `span`/`ul` give their children's blocks.
pub fn classify(ctx: &mut Context<'_>, el: &Element) -> Result<Vec<Block>> {
    let options = ctx.options;
    match Tag::from_name(&el.tag) {
        Tag::H1 => {
            ctx.record_title(el)?;
            titled_heading(options, el)
        }
        Tag::H2 => titled_heading(options, el),
        Tag::H3 => Ok(vec![heading(options, el, HeadingLevel::Two)?]),
        Tag::H4 => Ok(vec![heading(options, el, HeadingLevel::Three)?]),
        // No fourth heading level in Notion.
        Tag::H5 => {
            let runs = rich_text::build(options, el)?;
            Ok(vec![Block::Paragraph {
                rich_text: rich_text::apply(&runs, Annotation::Underline),
            }])
        }
        Tag::P => Ok(vec![Block::Paragraph {
            rich_text: rich_text::build(options, el)?,
        }]),
        Tag::Li => Ok(vec![Block::BulletedListItem {
            rich_text: rich_text::build(options, el)?,
        }]),
        Tag::Aside => Ok(vec![Block::Quote {
            rich_text: rich_text::build(options, el)?,
            color: quote_color(el.class()),
        }]),
        Tag::Span | Tag::Ul => {
            let mut out = Vec::new();
            for child in el.elements() {
                out.extend(classify(ctx, child)?);
            }
            Ok(out)
        }
        Tag::A => Ok(vec![image(options, el)?]),
        Tag::Div => div(options, el),
        Tag::Select | Tag::Figure | Tag::Table | Tag::Br => Ok(Vec::new()),
        Tag::Empty => {
            warn!(element = %truncate(&el.outer_html(), 200), "element has no tag name");
            Err(unsupported(el))
        }
        Tag::Strong | Tag::Em | Tag::Img | Tag::Other(_) => Err(unsupported(el)),
    }
}

/// `h1`/`h2`: top-level Notion heading, subject to the empty-heading policy.
fn titled_heading(options: &ConvertOptions, el: &Element) -> Result<Vec<Block>> {
    if options.empty_headings == EmptyHeadings::Drop && el.text().trim().is_empty() {
        debug!(tag = %el.tag, "dropping empty heading");
        return Ok(Vec::new());
    }
    Ok(vec![heading(options, el, HeadingLevel::One)?])
}

fn heading(options: &ConvertOptions, el: &Element, level: HeadingLevel) -> Result<Block> {
    Ok(Block::Heading {
        level,
        rich_text: rich_text::build(options, el)?,
    })
}

fn quote_color(class: &str) -> Option<Color> {
    QUOTE_COLORS
        .iter()
        .find(|(marker, _)| class.contains(marker))
        .map(|(_, color)| *color)
}

/// A block-level anchor is only accepted as a wrapper around an image.
fn image(options: &ConvertOptions, el: &Element) -> Result<Block> {
    let src = match el.children.first() {
        Some(Node::Element(img)) if img.tag == "IMG" => img.attr("src"),
        _ => None,
    };
    match src {
        Some(src) => Ok(Block::Image {
            url: options.resolve(src),
        }),
        None => Err(ConvertError::AnchorWithoutImage(el.outer_html())),
    }
}

fn div(options: &ConvertOptions, el: &Element) -> Result<Vec<Block>> {
    if !el.has_class(&options.stat_card_class) {
        warn!(element = %el, "skipping unhandled div");
        return Ok(Vec::new());
    }
    let href = el
        .find(&|e| e.has_class(&options.tooltip_class) && e.attr("href").is_some())
        .and_then(|tooltip| tooltip.attr("href"))
        .ok_or_else(|| ConvertError::StatCardWithoutLink(el.outer_html()))?;
    Ok(vec![Block::Bookmark {
        url: options.resolve(href),
    }])
}

fn unsupported(el: &Element) -> ConvertError {
    ConvertError::UnsupportedBlockTag {
        tag: el.tag.clone(),
        element: el.outer_html(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::select_content;
    use crate::notion::RichText;

    fn blocks_with(body: &str, options: &ConvertOptions) -> Result<Vec<Block>> {
        let html = format!("<html><body><article>{body}</article></body></html>");
        let article = select_content(&html, "article").unwrap();
        let mut ctx = Context::new(options);
        let mut out = Vec::new();
        for el in article.elements() {
            out.extend(classify(&mut ctx, el)?);
        }
        Ok(out)
    }

    fn blocks(body: &str) -> Result<Vec<Block>> {
        blocks_with(body, &ConvertOptions::new("https://example.com"))
    }

    #[test]
    fn heading_levels_shift_down() {
        let b = blocks("<h2>a</h2><h3>b</h3><h4>c</h4>").unwrap();
        let kinds: Vec<&str> = b.iter().map(Block::kind).collect();
        assert_eq!(kinds, vec!["heading_1", "heading_2", "heading_3"]);
    }

    #[test]
    fn h5_becomes_underlined_paragraph() {
        let b = blocks("<h5>small <strong>print</strong></h5>").unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].kind(), "paragraph");
        assert!(b[0].rich_text().iter().all(|r| r.annotations.underline));
        assert!(b[0].rich_text()[1].annotations.bold);
    }

    #[test]
    fn h5_break_not_underlined() {
        let b = blocks("<h5>a<br>b</h5>").unwrap();
        let r = b[0].rich_text();
        assert_eq!(r.len(), 3);
        assert!(r[0].annotations.underline && r[2].annotations.underline);
        assert_eq!(r[1], RichText::line_break());
    }

    #[test]
    fn empty_heading_dropped_by_default() {
        let b = blocks("<h2></h2><h1> </h1><h3></h3>").unwrap();
        let kinds: Vec<&str> = b.iter().map(Block::kind).collect();
        assert_eq!(kinds, vec!["heading_2"]);
    }

    #[test]
    fn empty_heading_kept_when_configured() {
        let mut options = ConvertOptions::new("https://example.com");
        options.empty_headings = EmptyHeadings::Keep;
        let b = blocks_with("<h2></h2>", &options).unwrap();
        assert_eq!(
            b,
            vec![Block::Heading {
                level: HeadingLevel::One,
                rich_text: vec![]
            }]
        );
    }

    #[test]
    fn aside_colors() {
        let cases = [
            ("text--quote-box", Some(Color::Pink)),
            ("epigraph", Some(Color::Gray)),
            ("rules-sidebar wide", Some(Color::Orange)),
            ("plain", None),
        ];
        for (class, expected) in cases {
            let b = blocks(&format!(r#"<aside class="{class}"><p>text</p></aside>"#)).unwrap();
            assert!(
                matches!(&b[0], Block::Quote { color, .. } if *color == expected),
                "{class}: {:?}",
                b[0]
            );
        }
    }

    #[test]
    fn aside_color_priority() {
        let b = blocks(r#"<aside class="epigraph text--quote-box">x</aside>"#).unwrap();
        assert!(matches!(&b[0], Block::Quote { color: Some(Color::Pink), .. }));
    }

    #[test]
    fn list_items_flattened() {
        let b = blocks("<ul><li>one</li><li><em>two</em></li></ul>").unwrap();
        assert_eq!(b.len(), 2);
        assert!(b.iter().all(|x| x.kind() == "bulleted_list_item"));
        assert!(b[1].rich_text()[0].annotations.italic);
    }

    #[test]
    fn span_is_transparent() {
        let b = blocks("<span>ignored text<p>inner</p></span>").unwrap();
        assert_eq!(
            b,
            vec![Block::Paragraph {
                rich_text: vec![RichText::plain("inner")]
            }]
        );
    }

    #[test]
    fn anchor_wrapping_image() {
        let b = blocks(r#"<a href="/big.jpg"><img src="/small.jpg"></a>"#).unwrap();
        assert_eq!(
            b,
            vec![Block::Image {
                url: "https://example.com/small.jpg".into()
            }]
        );
    }

    #[test]
    fn anchor_without_image_fails() {
        let err = blocks(r#"<a href="/x">text</a>"#).unwrap_err();
        assert!(matches!(err, ConvertError::AnchorWithoutImage(_)));
    }

    #[test]
    fn stat_card_bookmark() {
        let body = r#"<div class="stat-card"><div class="name">Predator</div><span><a class="stat-card__tooltip" href="/cards/predator">i</a></span></div>"#;
        let b = blocks(body).unwrap();
        assert_eq!(
            b,
            vec![Block::Bookmark {
                url: "https://example.com/cards/predator".into()
            }]
        );
    }

    #[test]
    fn stat_card_without_link_fails() {
        let err = blocks(r#"<div class="stat-card"><span>no link</span></div>"#).unwrap_err();
        assert!(matches!(err, ConvertError::StatCardWithoutLink(_)));
    }

    #[test]
    fn other_div_dropped() {
        let b = blocks(r#"<div class="ad-slot"><p>buy</p></div>"#).unwrap();
        assert!(b.is_empty());
    }

    #[test]
    fn discarded_tags() {
        let b = blocks("<br><figure><img src=\"/a.png\"></figure><table><tr><td>x</td></tr></table><select><option>1</option></select>")
            .unwrap();
        assert!(b.is_empty());
    }

    #[test]
    fn unknown_block_tag_fails() {
        let err = blocks("<ol><li>x</li></ol>").unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedBlockTag { tag, .. } if tag == "OL"));
    }

    #[test]
    fn inline_tag_at_block_level_fails() {
        let err = blocks("<strong>loud</strong>").unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedBlockTag { tag, .. } if tag == "STRONG"));
    }
}

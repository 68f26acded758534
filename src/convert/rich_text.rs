use tracing::{debug, warn};

use super::tag::Tag;
use super::{truncate, ConvertOptions};
use crate::dom::{Element, Node};
use crate::error::{ConvertError, Result};
use crate::notion::types::MAX_TEXT_LENGTH;
use crate::notion::{Annotation, RichText};

/// Runs for every child of `element`, in document order. Adjacent runs with the
/// same formatting are merged; line breaks always stay separate.
pub fn build(options: &ConvertOptions, element: &Element) -> Result<Vec<RichText>> {
    let runs = children(options, element)?;
    let mut out = Vec::with_capacity(runs.len());
    for run in coalesce(runs) {
        split_long(run, &mut out);
    }
    Ok(out)
}

/// New runs with `annotation` set; everything else unchanged. Line breaks are
/// never annotated.
pub fn apply(runs: &[RichText], annotation: Annotation) -> Vec<RichText> {
    runs.iter()
        .map(|run| {
            if run.is_line_break() {
                run.clone()
            } else {
                run.with(annotation)
            }
        })
        .collect()
}

fn children(options: &ConvertOptions, element: &Element) -> Result<Vec<RichText>> {
    let mut runs = Vec::new();
    for child in &element.children {
        match child {
            Node::Text(text) => runs.push(RichText::plain(text.as_str())),
            Node::Element(el) => runs.extend(inline(options, el)?),
        }
    }
    Ok(runs)
}

fn inline(options: &ConvertOptions, el: &Element) -> Result<Vec<RichText>> {
    match Tag::from_name(&el.tag) {
        Tag::P | Tag::Div => children(options, el),
        Tag::Strong => Ok(apply(&children(options, el)?, Annotation::Bold)),
        Tag::Em => Ok(apply(&children(options, el)?, Annotation::Italic)),
        Tag::A => anchor(options, el),
        Tag::Br => Ok(vec![RichText::line_break()]),
        Tag::Figure | Tag::Select => {
            warn!(tag = %el.tag, element = %truncate(&el.outer_html(), 200), "skipping unsupported inline element");
            Ok(Vec::new())
        }
        Tag::H1 | Tag::H2 | Tag::H3 | Tag::H4 | Tag::H5 | Tag::Ul | Tag::Aside | Tag::Empty => {
            warn!(tag = %el.tag, element = %truncate(&el.outer_html(), 200), "element cannot become rich text");
            Err(unsupported(el))
        }
        Tag::Span | Tag::Img | Tag::Li | Tag::Table | Tag::Other(_) => Err(unsupported(el)),
    }
}

fn anchor(options: &ConvertOptions, el: &Element) -> Result<Vec<RichText>> {
    let href = el
        .attr("href")
        .ok_or_else(|| ConvertError::MissingHref(el.outer_html()))?;
    let url = options.resolve(href);
    // In-page anchors have no Notion equivalent.
    if url.starts_with('#') {
        debug!(href = %url, "dropping in-page link");
        return Ok(Vec::new());
    }
    Ok(vec![RichText::link(el.text(), url)])
}

fn unsupported(el: &Element) -> ConvertError {
    ConvertError::UnsupportedInlineTag {
        tag: el.tag.clone(),
        element: el.outer_html(),
    }
}

fn coalesce(runs: Vec<RichText>) -> Vec<RichText> {
    let mut out: Vec<RichText> = Vec::with_capacity(runs.len());
    for run in runs {
        match out.last_mut() {
            Some(prev)
                if prev.same_format(&run) && !prev.is_line_break() && !run.is_line_break() =>
            {
                prev.content.push_str(&run.content);
            }
            _ => out.push(run),
        }
    }
    out
}

fn split_long(run: RichText, out: &mut Vec<RichText>) {
    if run.content.chars().count() <= MAX_TEXT_LENGTH {
        out.push(run);
        return;
    }
    let chars: Vec<char> = run.content.chars().collect();
    for piece in chars.chunks(MAX_TEXT_LENGTH) {
        out.push(RichText {
            content: piece.iter().collect(),
            ..run.clone()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::select_content;

    fn runs(body: &str) -> Result<Vec<RichText>> {
        let html = format!("<html><body><article>{body}</article></body></html>");
        let article = select_content(&html, "article").unwrap();
        build(&ConvertOptions::new("https://example.com"), &article)
    }

    #[test]
    fn text_only() {
        let r = runs("Just some words").unwrap();
        assert_eq!(r, vec![RichText::plain("Just some words")]);
    }

    #[test]
    fn bold_italic_either_nesting() {
        for body in ["<strong><em>both</em></strong>", "<em><strong>both</strong></em>"] {
            let r = runs(body).unwrap();
            assert_eq!(r.len(), 1);
            assert!(r[0].annotations.bold && r[0].annotations.italic, "{body}");
            assert!(!r[0].annotations.underline);
        }
    }

    #[test]
    fn line_break_is_own_run() {
        let r = runs("first<br>second").unwrap();
        assert_eq!(r.len(), 3);
        assert_eq!(r[1], RichText::line_break());
        assert_eq!(r[0].content, "first");
        assert_eq!(r[2].content, "second");
    }

    #[test]
    fn consecutive_breaks_not_merged() {
        let r = runs("a<br><br>b").unwrap();
        assert_eq!(r.len(), 4);
        assert!(r[1].is_line_break() && r[2].is_line_break());
    }

    #[test]
    fn same_format_runs_merge() {
        let r = runs("a <strong>b</strong><strong>c</strong> d").unwrap();
        let contents: Vec<&str> = r.iter().map(|x| x.content.as_str()).collect();
        assert_eq!(contents, vec!["a ", "bc", " d"]);
        assert!(r[1].annotations.bold);
    }

    #[test]
    fn containers_are_transparent() {
        let r = runs("<div>one <p>two</p></div>").unwrap();
        assert_eq!(r, vec![RichText::plain("one two")]);
    }

    #[test]
    fn in_page_link_dropped() {
        let r = runs(r##"see <a href="#section">below</a>"##).unwrap();
        assert_eq!(r, vec![RichText::plain("see ")]);
    }

    #[test]
    fn root_relative_link_resolved() {
        let r = runs(r#"<a href="/x">x marks</a>"#).unwrap();
        assert_eq!(r, vec![RichText::link("x marks", "https://example.com/x")]);
    }

    #[test]
    fn link_uses_full_text() {
        let r = runs(r#"<a href="https://other.org"><em>deep</em> text</a>"#).unwrap();
        assert_eq!(r, vec![RichText::link("deep text", "https://other.org")]);
    }

    #[test]
    fn anchor_without_href() {
        let err = runs("<a>nowhere</a>").unwrap_err();
        assert!(matches!(err, ConvertError::MissingHref(html) if html == "<a>nowhere</a>"));
    }

    #[test]
    fn tolerated_tags_skipped() {
        let r = runs("a<figure><img src=\"/i.png\"></figure><select><option>1</option></select>b")
            .unwrap();
        assert_eq!(r, vec![RichText::plain("ab")]);
    }

    #[test]
    fn heading_inside_rich_text_fails() {
        let err = runs("<div><h3>Nope</h3></div>").unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedInlineTag { tag, .. } if tag == "H3"));
    }

    #[test]
    fn unknown_tag_fails() {
        let err = runs("<code>x</code>").unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedInlineTag { tag, .. } if tag == "CODE"));
    }

    #[test]
    fn long_runs_split() {
        let long = "a".repeat(MAX_TEXT_LENGTH * 2 + 500);
        let r = runs(&format!("<strong>{long}</strong>")).unwrap();
        let lens: Vec<usize> = r.iter().map(|x| x.content.len()).collect();
        assert_eq!(lens, vec![MAX_TEXT_LENGTH, MAX_TEXT_LENGTH, 500]);
        assert!(r.iter().all(|x| x.annotations.bold));
    }

    #[test]
    fn apply_keeps_other_fields() {
        let base = vec![RichText::link("a", "https://x.org"), RichText::line_break()];
        let underlined = apply(&base, Annotation::Underline);
        assert!(underlined[0].annotations.underline);
        assert_eq!(underlined[0].link.as_deref(), Some("https://x.org"));
        assert_eq!(underlined[1], RichText::line_break());
        assert!(!base[0].annotations.underline);
    }

    #[test]
    fn break_inside_bold_stays_plain() {
        let r = runs("<strong>a<br>b</strong>").unwrap();
        assert_eq!(r.len(), 3);
        assert!(r[0].annotations.bold && r[2].annotations.bold);
        assert_eq!(r[1], RichText::line_break());
    }

    #[test]
    fn nbsp_between_inline_tags_kept() {
        let r = runs("<strong>Armor</strong>&nbsp;<em>Class</em>").unwrap();
        let text: String = r.iter().map(|x| x.content.as_str()).collect();
        assert_eq!(text, "Armor\u{a0}Class");
    }
}

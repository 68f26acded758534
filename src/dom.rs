//! Owned view of the parsed article.
//!
//! `scraper` parses the whole page; only the content container is copied out
//! into [`Element`]/[`Node`] values so the converter works on a small, plain
//! tree with upper-case tag names and normalised whitespace.

use std::fmt;

use scraper::{ElementRef, Html, Node as HtmlNode, Selector};

use crate::error::{ConvertError, Result};

/// Default query for the article body on the source site.
pub const DEFAULT_CONTENT_SELECTOR: &str = "section.primary-content div.p-article-content";

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Upper-case tag name (`P`, `STRONG`, ...).
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Raw `class` attribute, empty when absent.
    pub fn class(&self) -> &str {
        self.attr("class").unwrap_or("")
    }

    /// True when `class` is one of the whitespace-separated class tokens.
    pub fn has_class(&self, class: &str) -> bool {
        self.class().split_ascii_whitespace().any(|c| c == class)
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// First descendant (depth-first, document order) matching `pred`.
    pub fn find<F>(&self, pred: &F) -> Option<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        for child in self.elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated text of every descendant text node.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }

    /// Serialized form, used in diagnostics and error messages.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let tag = self.tag.to_ascii_lowercase();
        out.push('<');
        out.push_str(&tag);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value, true));
            out.push('"');
        }
        out.push('>');
        if VOID_TAGS.contains(&tag.as_str()) {
            return;
        }
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(&escape(text, false)),
                Node::Element(el) => el.write_html(out),
            }
        }
        out.push_str("</");
        out.push_str(&tag);
        out.push('>');
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.outer_html())
    }
}

/// Parse a full HTML page and copy out the first element matching `selector`.
pub fn select_content(html: &str, selector: &str) -> Result<Element> {
    let query = Selector::parse(selector).map_err(|e| ConvertError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })?;
    let document = Html::parse_document(html);
    let root = document
        .select(&query)
        .next()
        .ok_or_else(|| ConvertError::MissingContent(selector.to_string()))?;
    Ok(copy_element(root))
}

fn copy_element(el: ElementRef<'_>) -> Element {
    let value = el.value();
    let children = el
        .children()
        .filter_map(|child| match child.value() {
            HtmlNode::Element(_) => ElementRef::wrap(child).map(|e| Node::Element(copy_element(e))),
            HtmlNode::Text(text) => trim_text(text).map(Node::Text),
            _ => None,
        })
        .collect();

    Element {
        tag: value.name().to_ascii_uppercase(),
        attrs: value
            .attrs()
            .map(|(key, val)| (key.to_string(), val.to_string()))
            .collect(),
        children,
    }
}

/// Drop whitespace-only text; otherwise trim both ends, keeping one space on a
/// side whose trimmed whitespace ended (or started) with a horizontal space.
/// Only ASCII whitespace counts: `&nbsp;` is content.
fn trim_text(raw: &str) -> Option<String> {
    let blank = |c: char| c.is_ascii_whitespace();
    let trimmed = raw.trim_matches(blank);
    if trimmed.is_empty() {
        return None;
    }

    let leading = &raw[..raw.len() - raw.trim_start_matches(blank).len()];
    let trailing = &raw[raw.trim_end_matches(blank).len()..];
    let horizontal = |c: char| c.is_ascii_whitespace() && c != '\n' && c != '\r';

    let mut out = String::with_capacity(trimmed.len() + 2);
    if leading.chars().next_back().is_some_and(horizontal) {
        out.push(' ');
    }
    out.push_str(trimmed);
    if trailing.chars().next().is_some_and(horizontal) {
        out.push(' ');
    }
    Some(out)
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

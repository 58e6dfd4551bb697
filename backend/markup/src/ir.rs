//! Markup Intermediate Representation
//!
//! Parses HTML-like editor output into an owned tree of `MarkupNode`s and
//! serializes it back. Every other stage in this crate works on a flat list
//! of top-level siblings (`Fragment`) and rebuilds it rather than mutating a
//! live DOM.

use kuchiki::iter::NodeEdge;
use kuchiki::traits::TendrilSink;
use kuchiki::{NodeData, NodeRef};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text is emitted without entity escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "noscript", "plaintext",
];

/// Elements whose text is never shown, so flattening leaves it out.
const OPAQUE_ELEMENTS: &[&str] = &[
    "script", "style", "template", "title", "iframe", "noembed", "noframes", "noscript", "xmp",
    "svg", "math",
];

/// Deepest element nesting kept by `Fragment::parse`. Anything below this
/// depth is flattened into its text, which bounds every tree walk.
pub const MAX_NESTING_DEPTH: usize = 128;

/// `language-<id>` class token. The id is what highlighters key on.
static LANGUAGE_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^language-([a-z0-9][a-z0-9_+#-]{0,31})$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkupNode {
    Element(Element),
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<MarkupNode>,
}

impl MarkupNode {
    pub fn text(text: impl Into<String>) -> Self {
        MarkupNode::Text { text: text.into() }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            MarkupNode::Element(el) => Some(el),
            MarkupNode::Text { .. } => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MarkupNode::Text { text } => Some(text),
            MarkupNode::Element(_) => None,
        }
    }

    /// True for text nodes holding nothing but whitespace.
    pub fn is_blank_text(&self) -> bool {
        self.as_text().is_some_and(|t| t.trim().is_empty())
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            MarkupNode::Text { text } => out.push_str(text),
            MarkupNode::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl From<Element> for MarkupNode {
    fn from(el: Element) -> Self {
        MarkupNode::Element(el)
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<MarkupNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            self
        } else {
            self.with_child(MarkupNode::text(text))
        }
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// The id from the first `language-<id>` class token, if any.
    pub fn language_tag(&self) -> Option<&str> {
        self.classes().find_map(language_from_class)
    }

    /// First direct child element with the given tag.
    pub fn child_element(&self, tag: &str) -> Option<&Element> {
        self.children
            .iter()
            .filter_map(MarkupNode::as_element)
            .find(|el| el.is(tag))
    }

    pub fn child_element_mut(&mut self, tag: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            MarkupNode::Element(el) if el.is(tag) => Some(el),
            _ => None,
        })
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(MarkupNode::text_content).collect()
    }
}

/// Extracts the id from a single `language-<id>` class token.
pub fn language_from_class(token: &str) -> Option<&str> {
    LANGUAGE_CLASS
        .captures(token)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Lower-cases a free-form language name and checks it is usable as a class id.
pub fn normalize_language_tag(tag: &str) -> Option<String> {
    let lowered = tag.trim().to_ascii_lowercase();
    let class = format!("language-{lowered}");
    LANGUAGE_CLASS.is_match(&class).then_some(lowered)
}

/// The ordered top-level siblings of a markup document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub nodes: Vec<MarkupNode>,
}

impl Fragment {
    pub fn new(nodes: Vec<MarkupNode>) -> Self {
        Self {
            nodes: merge_adjacent_text(nodes),
        }
    }

    /// Parses arbitrary markup with an HTML5 tree builder.
    ///
    /// Never fails: anything the parser hoists into `<head>` is kept in front
    /// of the body content, and comments, doctypes and framesets are dropped.
    /// Elements nested deeper than [`MAX_NESTING_DEPTH`] are replaced by their
    /// text.
    pub fn parse(input: &str) -> Self {
        let document = kuchiki::parse_html().one(input.to_string());
        let mut nodes = Vec::new();
        for root in document.children() {
            let Some(root_el) = root.as_element() else { continue };
            if root_el.name.local.as_ref() != "html" {
                continue;
            }
            for section in root.children() {
                let Some(section_el) = section.as_element() else { continue };
                if matches!(section_el.name.local.as_ref(), "head" | "body") {
                    for child in section.children() {
                        convert(&child, 1, &mut nodes);
                    }
                }
            }
        }
        Self::new(nodes)
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(node, false, &mut out);
        }
        out
    }

    pub fn text_content(&self) -> String {
        self.nodes.iter().map(MarkupNode::text_content).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn convert(node: &NodeRef, depth: usize, out: &mut Vec<MarkupNode>) {
    match node.data() {
        NodeData::Text(text) => out.push(MarkupNode::text(text.borrow().clone())),
        NodeData::Element(_) if depth > MAX_NESTING_DEPTH => flatten(node, out),
        NodeData::Element(data) => {
            let attrs = data
                .attributes
                .borrow()
                .map
                .iter()
                .map(|(name, attr)| (name.local.to_string(), attr.value.clone()))
                .collect();
            // Template children live in a separate document fragment.
            let content_root = data.template_contents.as_ref().unwrap_or(node);
            let mut children = Vec::new();
            for child in content_root.children() {
                convert(&child, depth + 1, &mut children);
            }
            out.push(MarkupNode::Element(Element {
                tag: data.name.local.to_string(),
                attrs,
                children: merge_adjacent_text(children),
            }));
        }
        _ => {}
    }
}

/// Emits the visible text below `node` without recursing.
fn flatten(node: &NodeRef, out: &mut Vec<MarkupNode>) {
    let is_opaque = |n: &NodeRef| {
        n.as_element()
            .is_some_and(|el| OPAQUE_ELEMENTS.contains(&el.name.local.as_ref()))
    };
    let mut hidden = 0usize;
    for edge in node.traverse_inclusive() {
        match edge {
            NodeEdge::Start(n) if is_opaque(&n) => hidden += 1,
            NodeEdge::End(n) if is_opaque(&n) => hidden -= 1,
            NodeEdge::Start(n) if hidden == 0 => {
                if let Some(text) = n.as_text() {
                    out.push(MarkupNode::text(text.borrow().clone()));
                }
            }
            _ => {}
        }
    }
}

/// Joins neighbouring text nodes and drops empty ones.
pub fn merge_adjacent_text(nodes: Vec<MarkupNode>) -> Vec<MarkupNode> {
    let mut merged: Vec<MarkupNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            MarkupNode::Text { text } if text.is_empty() => {}
            MarkupNode::Text { text } => match merged.last_mut() {
                Some(MarkupNode::Text { text: prev }) => prev.push_str(&text),
                _ => merged.push(MarkupNode::Text { text }),
            },
            element => merged.push(element),
        }
    }
    merged
}

fn write_node(node: &MarkupNode, raw_parent: bool, out: &mut String) {
    match node {
        MarkupNode::Text { text } if raw_parent => out.push_str(text),
        MarkupNode::Text { text } => escape_text(text, out),
        MarkupNode::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attr(value, out);
                out.push('"');
            }
            out.push('>');
            if el.is_void() {
                return;
            }
            // The parser eats one newline right after these start tags.
            if matches!(el.tag.as_str(), "pre" | "textarea" | "listing")
                && el
                    .children
                    .first()
                    .and_then(MarkupNode::as_text)
                    .is_some_and(|t| t.starts_with('\n'))
            {
                out.push('\n');
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&el.tag.as_str());
            for child in &el.children {
                write_node(child, raw, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

//! Allow-list markup sanitizer.
//!
//! Runs before persistence and again before rendering. Anything not on the
//! allow-list is removed: dangerous containers lose their whole subtree,
//! other unknown elements are unwrapped so their text survives.

use serde::Serialize;
use tracing::debug;

use crate::ir::{Element, Fragment, MarkupNode, language_from_class, merge_adjacent_text};

/// Elements kept as-is (with filtered attributes) in flow content.
const ALLOWED_FLOW: &[&str] = &[
    "p", "br", "em", "strong", "code", "pre", "ul", "ol", "li", "table", "img", "a", "h1", "h2",
    "blockquote",
];

/// Allowed elements that never carry children.
const VOID_TAGS: &[&str] = &["br", "img"];

/// Elements removed together with everything inside them.
const DROP_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "applet", "noscript", "noembed", "noframes",
    "template", "textarea", "select", "option", "svg", "math", "title", "head", "base", "link",
    "meta", "frame", "frameset", "xmp", "plaintext", "input", "caption", "colgroup", "col",
];

/// URL schemes allowed in `href`.
const HREF_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// URL schemes allowed in `src`; `data:` is further restricted to images.
const SRC_SCHEMES: &[&str] = &["http", "https", "data"];

/// Upper bound on sanitize/reparse rounds before the output is taken as is.
const MAX_PASSES: usize = 4;

/// What the sanitizer removed during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeReport {
    pub elements_removed: usize,
    pub attributes_removed: usize,
}

impl SanitizeReport {
    pub fn is_clean(&self) -> bool {
        self.elements_removed == 0 && self.attributes_removed == 0
    }
}

/// Where a node sits, which decides which children are structurally legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Flow,
    Table,
    TableSection,
    TableRow,
}

/// Sanitize a markup string. Pure and idempotent.
pub fn sanitize(input: &str) -> String {
    sanitize_with_report(input).0
}

/// Sanitizes until the serialized output reparses to itself.
///
/// Unwrapping can leave nesting the HTML5 parser rebuilds differently
/// (`<h1><span><h2>` becomes `<h1><h2>`), so one pass is not always stable.
pub fn sanitize_with_report(input: &str) -> (String, SanitizeReport) {
    let mut report = SanitizeReport::default();
    let mut html = input.to_string();
    for _ in 0..MAX_PASSES {
        let (fragment, pass) = sanitize_fragment(Fragment::parse(&html));
        report.elements_removed += pass.elements_removed;
        report.attributes_removed += pass.attributes_removed;
        let next = fragment.to_html();
        if next == html {
            break;
        }
        html = next;
    }
    if !report.is_clean() {
        debug!(
            elements = report.elements_removed,
            attributes = report.attributes_removed,
            "Sanitizer removed content"
        );
    }
    (html, report)
}

pub fn sanitize_fragment(fragment: Fragment) -> (Fragment, SanitizeReport) {
    let mut report = SanitizeReport::default();
    let nodes = clean_children(fragment.nodes, Context::Flow, &mut report);
    (Fragment::new(nodes), report)
}

fn clean_children(
    nodes: Vec<MarkupNode>,
    context: Context,
    report: &mut SanitizeReport,
) -> Vec<MarkupNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            MarkupNode::Text { text } => {
                // Text directly inside table structure would be hoisted out on reparse.
                if context == Context::Flow {
                    out.push(MarkupNode::Text { text });
                }
            }
            MarkupNode::Element(el) => clean_element(el, context, &mut out, report),
        }
    }
    merge_adjacent_text(out)
}

fn clean_element(
    el: Element,
    context: Context,
    out: &mut Vec<MarkupNode>,
    report: &mut SanitizeReport,
) {
    let tag = el.tag.to_ascii_lowercase();
    if DROP_WITH_CONTENT.contains(&tag.as_str()) {
        report.elements_removed += 1;
        return;
    }

    let child_context = match (context, tag.as_str()) {
        (Context::Flow, t) if ALLOWED_FLOW.contains(&t) => Some(if t == "table" {
            Context::Table
        } else {
            Context::Flow
        }),
        (Context::Table, "thead" | "tbody" | "tfoot") => Some(Context::TableSection),
        (Context::Table | Context::TableSection, "tr") => Some(Context::TableRow),
        (Context::TableRow, "td" | "th") => Some(Context::Flow),
        _ => None,
    };

    match child_context {
        Some(child_context) => {
            let attrs = clean_attrs(&tag, el.attrs, report);
            let children = if VOID_TAGS.contains(&tag.as_str()) {
                Vec::new()
            } else {
                clean_children(el.children, child_context, report)
            };
            out.push(MarkupNode::Element(Element {
                tag,
                attrs,
                children,
            }));
        }
        None if context == Context::Flow => {
            report.elements_removed += 1;
            out.extend(clean_children(el.children, Context::Flow, report));
        }
        None => {
            // Non-structural content inside a table cannot be unwrapped in place.
            report.elements_removed += 1;
        }
    }
}

fn clean_attrs(
    tag: &str,
    attrs: Vec<(String, String)>,
    report: &mut SanitizeReport,
) -> Vec<(String, String)> {
    let mut kept = Vec::new();
    for (name, value) in attrs {
        let name = name.to_ascii_lowercase();
        let keep = match (tag, name.as_str()) {
            ("a", "href") => is_safe_url(&value, HREF_SCHEMES).then_some(value),
            ("img", "src") => is_safe_url(&value, SRC_SCHEMES).then_some(value),
            ("code", "class") => value
                .split_ascii_whitespace()
                .find(|token| language_from_class(token).is_some())
                .map(str::to_string),
            _ => None,
        };
        match keep {
            Some(value) if !kept.iter().any(|(n, _)| *n == name) => kept.push((name, value)),
            _ => report.attributes_removed += 1,
        }
    }
    kept
}

/// Whether a URL may appear as an image `src`.
pub fn is_safe_src(value: &str) -> bool {
    is_safe_url(value, SRC_SCHEMES)
}

/// Whether a URL may appear as a link `href`.
pub fn is_safe_href(value: &str) -> bool {
    is_safe_url(value, HREF_SCHEMES)
}

/// Checks a URL against a scheme allow-list. Relative URLs are always allowed.
fn is_safe_url(value: &str, schemes: &[&str]) -> bool {
    // Browsers ignore embedded whitespace and control characters in schemes.
    let compact: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let Some(colon) = compact.find(':') else {
        return true;
    };
    if compact[..colon].contains(['/', '?', '#']) {
        return true;
    }
    let scheme = &compact[..colon];
    if !schemes.contains(&scheme) {
        return false;
    }
    scheme != "data" || compact.starts_with("data:image/")
}

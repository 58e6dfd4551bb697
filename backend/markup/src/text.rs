//! Plain-text rendering of the markup IR.
//!
//! Strips every tag, keeps decoded text, and puts a line break at block
//! boundaries so words from adjacent paragraphs never run together.

use crate::ir::MarkupNode;

/// Elements that start a new line of text.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "pre", "ul", "ol", "li", "table", "thead", "tbody", "tfoot", "tr", "td", "th",
    "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "br", "hr", "section", "article",
    "header", "footer",
];

/// Elements whose text never reaches the reader.
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "template", "noscript", "title"];

pub fn to_plain_text(nodes: &[MarkupNode]) -> String {
    let mut output = String::new();
    write_plain(nodes, &mut output);
    output
}

fn write_plain(nodes: &[MarkupNode], output: &mut String) {
    for node in nodes {
        match node {
            MarkupNode::Text { text } => output.push_str(text),
            MarkupNode::Element(el) => {
                let tag = el.tag.as_str();
                if INVISIBLE_ELEMENTS.contains(&tag) {
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&tag);
                if block {
                    output.push('\n');
                }
                write_plain(&el.children, output);
                if block {
                    output.push('\n');
                }
            }
        }
    }
}

//! Plain-text projection of answer content for validation and indexing.

use answerkit_blocks::{BlockBody, BlockDocument};
use answerkit_markup::{Fragment, to_plain_text};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::stored::AnswerContent;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub text: String,
    pub word_count: usize,
    /// Unicode scalar values, not bytes.
    pub char_count: usize,
}

impl Projection {
    /// Collapses whitespace runs to single spaces and trims.
    pub fn from_text(raw: &str) -> Self {
        let text = WHITESPACE_RE.replace_all(raw, " ").trim().to_string();
        let word_count = text.split_whitespace().count();
        let char_count = text.chars().count();
        Self {
            text,
            word_count,
            char_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Strips tags and decodes entities before collapsing whitespace.
pub fn project_markup(markup: &str) -> Projection {
    let fragment = Fragment::parse(markup);
    Projection::from_text(&to_plain_text(&fragment.nodes))
}

/// Text and code contents, image captions and table cells, in block order.
pub fn project_blocks(doc: &BlockDocument) -> Projection {
    let mut parts: Vec<&str> = Vec::new();
    for block in doc.blocks() {
        match &block.body {
            BlockBody::Text { content } | BlockBody::Code { content, .. } => parts.push(content),
            BlockBody::Image { caption, .. } => {
                if let Some(caption) = caption {
                    parts.push(caption);
                }
            }
            BlockBody::Table { table } => {
                parts.extend(table.rows().iter().flatten().map(String::as_str));
            }
        }
    }
    Projection::from_text(&parts.join("\n"))
}

pub fn project(content: &AnswerContent) -> Projection {
    match content {
        AnswerContent::Markup(markup) => project_markup(markup),
        AnswerContent::Blocks(doc) => project_blocks(doc),
        AnswerContent::Empty => Projection::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use answerkit_blocks::{BlockKind, BlockPatch};

    #[test]
    fn collapses_whitespace() {
        let p = project_markup("<p>Hello   world</p>");
        assert_eq!(p.text, "Hello world");
        assert_eq!(p.word_count, 2);
        assert_eq!(p.char_count, 11);
    }

    #[test]
    fn empty_input_projects_to_nothing() {
        let p = project_markup("");
        assert!(p.is_empty());
        assert_eq!(p.word_count, 0);
        assert_eq!(p.char_count, 0);
        assert_eq!(project(&AnswerContent::Empty), Projection::default());
    }

    #[test]
    fn decodes_entities_and_separates_blocks() {
        let p = project_markup("<p>a &amp; b</p><p>c&nbsp;d</p><ul><li>e</li><li>f</li></ul>");
        assert_eq!(p.text, "a & b c d e f");
        assert_eq!(p.word_count, 7);
    }

    #[test]
    fn script_text_is_not_projected() {
        let p = project_markup("<p>visible</p><script>hidden()</script>");
        assert_eq!(p.text, "visible");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let p = Projection::from_text("  héllo\n\twörld  ");
        assert_eq!(p.text, "héllo wörld");
        assert_eq!(p.char_count, 11);
    }

    #[test]
    fn projects_blocks_in_order() {
        let mut doc = BlockDocument::new();
        let first = doc.blocks()[0].id.clone();
        doc.update_block(&first, BlockPatch::content("Use a map:"));
        let code = doc.add_block(BlockKind::Code);
        doc.update_block(&code, BlockPatch::content("Map<K, V> m;\nm.put(k, v);"));
        let table = doc.add_block(BlockKind::Table);
        doc.set_table_cell(&table, 0, 0, "Op");
        doc.set_table_cell(&table, 1, 0, "put");
        doc.add_block(BlockKind::Image);

        let p = project_blocks(&doc);
        assert_eq!(p.text, "Use a map: Map<K, V> m; m.put(k, v); Op put");
        assert_eq!(p.word_count, 10);
    }
}

//! Display projections of a block document.

use answerkit_core::CodeLanguage;
use answerkit_markup::{Element, Fragment, MarkupNode, is_safe_src, sanitize_fragment};
use serde::Serialize;

use crate::block::BlockBody;
use crate::document::BlockDocument;

const DEFAULT_IMAGE_ALT: &str = "Answer image";

/// A block ready for a widget renderer. `key` is the block id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderedBlock {
    Text {
        key: String,
        text: String,
    },
    Code {
        key: String,
        language: CodeLanguage,
        label: String,
        code: String,
    },
    Image {
        key: String,
        src: String,
        alt: String,
        caption: Option<String>,
    },
    Table {
        key: String,
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

/// Projects every block into its display form.
///
/// Images without a payload or with an unsafe source are left out.
pub fn render_blocks(doc: &BlockDocument) -> Vec<RenderedBlock> {
    doc.blocks()
        .iter()
        .filter_map(|block| {
            let key = block.id.to_string();
            match &block.body {
                BlockBody::Text { content } => Some(RenderedBlock::Text {
                    key,
                    text: content.clone(),
                }),
                BlockBody::Code { content, language } => Some(RenderedBlock::Code {
                    key,
                    language: *language,
                    label: language.label().to_string(),
                    code: content.clone(),
                }),
                BlockBody::Image { content, caption } => {
                    let src = content.trim();
                    if src.is_empty() || !is_safe_src(src) {
                        return None;
                    }
                    Some(RenderedBlock::Image {
                        key,
                        src: src.to_string(),
                        alt: caption.clone().unwrap_or_else(|| DEFAULT_IMAGE_ALT.to_string()),
                        caption: caption.clone(),
                    })
                }
                BlockBody::Table { table } => {
                    let mut rows = table.rows().iter();
                    let header = rows
                        .next()
                        .map(|row| {
                            row.iter()
                                .enumerate()
                                .map(|(i, cell)| {
                                    if cell.is_empty() {
                                        format!("Column {}", i + 1)
                                    } else {
                                        cell.clone()
                                    }
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    Some(RenderedBlock::Table {
                        key,
                        header,
                        rows: rows.cloned().collect(),
                    })
                }
            }
        })
        .collect()
}

/// Renders a block document as canonical, sanitized markup.
pub fn blocks_to_markup(doc: &BlockDocument) -> String {
    let nodes = render_blocks(doc).into_iter().flat_map(block_markup).collect();
    let (fragment, _) = sanitize_fragment(Fragment::new(nodes));
    fragment.to_html()
}

fn block_markup(block: RenderedBlock) -> Vec<MarkupNode> {
    match block {
        RenderedBlock::Text { text, .. } => {
            let mut para = Element::new("p");
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    para = para.with_child(Element::new("br"));
                }
                para = para.with_text(line);
            }
            vec![para.into()]
        }
        RenderedBlock::Code { language, code, .. } => {
            let code = Element::new("code")
                .with_attr("class", format!("language-{}", language.tag()))
                .with_text(code);
            vec![Element::new("pre").with_child(code).into()]
        }
        RenderedBlock::Image { src, caption, .. } => {
            let mut nodes = vec![Element::new("img").with_attr("src", src).into()];
            if let Some(caption) = caption {
                let em = Element::new("em").with_text(caption);
                nodes.push(Element::new("p").with_child(em).into());
            }
            nodes
        }
        RenderedBlock::Table { header, rows, .. } => {
            let row = |tag: &str, cells: Vec<String>| {
                cells
                    .into_iter()
                    .fold(Element::new("tr"), |tr, cell| {
                        tr.with_child(Element::new(tag).with_text(cell))
                    })
            };
            let thead = Element::new("thead").with_child(row("th", header));
            let tbody = rows
                .into_iter()
                .fold(Element::new("tbody"), |tbody, cells| tbody.with_child(row("td", cells)));
            vec![Element::new("table").with_child(thead).with_child(tbody).into()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockKind, BlockPatch};

    fn sample() -> BlockDocument {
        BlockDocument::from_json(
            r#"[
                {"id":"1","type":"text","content":"Line one\nLine <two>"},
                {"id":"2","type":"code","content":"SELECT 1;","language":"sql"},
                {"id":"3","type":"image","content":"","caption":"empty"},
                {"id":"4","type":"table","content":"","tableData":[["Key",""],["a","b"]]}
            ]"#,
        )
    }

    #[test]
    fn renders_display_tree() {
        let rendered = render_blocks(&sample());
        assert_eq!(rendered.len(), 3);
        assert_eq!(
            rendered[1],
            RenderedBlock::Code {
                key: "2".into(),
                language: CodeLanguage::Sql,
                label: "SQL".into(),
                code: "SELECT 1;".into(),
            }
        );
        assert_eq!(
            rendered[2],
            RenderedBlock::Table {
                key: "4".into(),
                header: vec!["Key".into(), "Column 2".into()],
                rows: vec![vec!["a".into(), "b".into()]],
            }
        );
    }

    #[test]
    fn unsafe_image_sources_are_dropped() {
        let mut doc = BlockDocument::new();
        let id = doc.add_block(BlockKind::Image);
        doc.update_block(&id, BlockPatch::content("javascript:alert(1)"));
        assert!(render_blocks(&doc)
            .iter()
            .all(|b| !matches!(b, RenderedBlock::Image { .. })));
    }

    #[test]
    fn markup_is_escaped_and_canonical() {
        let html = blocks_to_markup(&sample());
        assert_eq!(
            html,
            concat!(
                "<p>Line one<br>Line &lt;two&gt;</p>",
                "<pre><code class=\"language-sql\">SELECT 1;</code></pre>",
                "<table><thead><tr><th>Key</th><th>Column 2</th></tr></thead>",
                "<tbody><tr><td>a</td><td>b</td></tr></tbody></table>"
            )
        );
    }
}

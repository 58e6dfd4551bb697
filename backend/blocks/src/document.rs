//! The block document and its editing operations.
//!
//! A document is an ordered, never-empty list of blocks with unique ids.
//! Every operation is a no-op (returning `false`) when its target does not
//! exist or the edit would break an invariant.

use std::collections::HashSet;

use answerkit_core::ContentError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::block::{Block, BlockBody, BlockId, BlockKind, BlockPatch, Table};
use crate::image::ImagePolicy;
use crate::wire::BlockRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// How a stored payload was turned into a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Nothing was stored; the default document was created.
    Empty,
    /// A JSON array was read. Counts describe records that needed fixing.
    Parsed { skipped: usize, reassigned_ids: usize },
    /// The payload was not a JSON array and was wrapped as a text block.
    WrappedRaw { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BlockDocument {
    blocks: Vec<Block>,
}

impl Default for BlockDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockDocument {
    /// A fresh document holding one empty text block.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::new(BlockKind::Text)],
        }
    }

    /// Builds a document from blocks, restoring the invariants: an empty list
    /// becomes the default document and duplicate ids are replaced.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let (blocks, _) = dedupe_ids(blocks);
        if blocks.is_empty() {
            return Self::new();
        }
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    fn position(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| &b.id == id)
    }

    fn get_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| &b.id == id)
    }

    fn fresh_id(&self) -> BlockId {
        loop {
            let id = BlockId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Appends a block of `kind` with its default payload.
    pub fn add_block(&mut self, kind: BlockKind) -> BlockId {
        let id = self.fresh_id();
        self.blocks.push(Block {
            id: id.clone(),
            body: BlockBody::empty(kind),
        });
        id
    }

    pub fn update_block(&mut self, id: &BlockId, patch: BlockPatch) -> bool {
        match self.get_mut(id) {
            Some(block) => {
                block.apply_patch(patch);
                true
            }
            None => false,
        }
    }

    /// Removes a block unless it is the last one.
    pub fn delete_block(&mut self, id: &BlockId) -> bool {
        if self.blocks.len() <= 1 {
            return false;
        }
        match self.position(id) {
            Some(index) => {
                self.blocks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Swaps a block with its neighbour; no-op at either end.
    pub fn move_block(&mut self, id: &BlockId, direction: MoveDirection) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.blocks.len() => index + 1,
            _ => return false,
        };
        self.blocks.swap(index, target);
        true
    }

    pub fn set_table_cell(&mut self, id: &BlockId, row: usize, col: usize, value: &str) -> bool {
        self.with_table(id, |table| table.set_cell(row, col, value))
    }

    pub fn add_table_row(&mut self, id: &BlockId) -> bool {
        self.with_table(id, |table| {
            table.add_row();
            true
        })
    }

    pub fn add_table_column(&mut self, id: &BlockId) -> bool {
        self.with_table(id, |table| {
            table.add_column();
            true
        })
    }

    pub fn delete_table_row(&mut self, id: &BlockId, row: usize) -> bool {
        self.with_table(id, |table| table.delete_row(row))
    }

    pub fn delete_table_column(&mut self, id: &BlockId, col: usize) -> bool {
        self.with_table(id, |table| table.delete_column(col))
    }

    fn with_table(
        &mut self,
        id: &BlockId,
        edit: impl FnOnce(&mut Table) -> bool,
    ) -> bool {
        self.get_mut(id)
            .and_then(Block::table_mut)
            .is_some_and(edit)
    }

    /// Sets the payload of an image block after checking it against `policy`.
    pub fn set_image(
        &mut self,
        id: &BlockId,
        payload: &str,
        policy: &ImagePolicy,
    ) -> Result<(), ContentError> {
        let block = self
            .get_mut(id)
            .ok_or_else(|| ContentError::BlockNotFound(id.to_string()))?;
        if block.kind() != BlockKind::Image {
            return Err(ContentError::NotAnImageBlock(id.to_string()));
        }
        policy.check(payload)?;
        block.apply_patch(BlockPatch::content(payload.trim()));
        Ok(())
    }

    pub fn to_json(&self) -> String {
        // Blocks serialize from plain strings and enums only.
        serde_json::to_string(&self.blocks).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.blocks).unwrap_or_else(|_| "[]".to_string())
    }

    /// Reads a stored payload. Never fails: anything that is not a JSON
    /// array becomes a single text block holding the raw input.
    pub fn from_json(raw: &str) -> Self {
        Self::from_json_with_outcome(raw).0
    }

    pub fn from_json_with_outcome(raw: &str) -> (Self, LoadOutcome) {
        if raw.trim().is_empty() {
            return (Self::new(), LoadOutcome::Empty);
        }

        let items = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => items,
            Ok(other) => {
                let reason = format!("expected a JSON array, found {}", json_type_name(&other));
                return (Self::wrap_raw(raw), LoadOutcome::WrappedRaw { reason });
            }
            Err(e) => {
                return (
                    Self::wrap_raw(raw),
                    LoadOutcome::WrappedRaw {
                        reason: e.to_string(),
                    },
                );
            }
        };

        let mut skipped = 0;
        let mut blocks = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let converted = serde_json::from_value::<BlockRecord>(item)
                .map_err(|e| e.to_string())
                .and_then(BlockRecord::into_block);
            match converted {
                Ok(block) => blocks.push(block),
                Err(reason) => {
                    warn!(index, %reason, "Skipping unreadable stored block");
                    skipped += 1;
                }
            }
        }

        let (blocks, reassigned_ids) = dedupe_ids(blocks);
        let document = if blocks.is_empty() {
            Self::new()
        } else {
            Self { blocks }
        };
        (
            document,
            LoadOutcome::Parsed {
                skipped,
                reassigned_ids,
            },
        )
    }

    fn wrap_raw(raw: &str) -> Self {
        Self {
            blocks: vec![Block::text(raw)],
        }
    }
}

/// Gives every block after the first holder of an id a fresh one.
fn dedupe_ids(blocks: Vec<Block>) -> (Vec<Block>, usize) {
    let mut seen = HashSet::with_capacity(blocks.len());
    let mut reassigned = 0;
    let blocks = blocks
        .into_iter()
        .map(|mut block| {
            while !seen.insert(block.id.clone()) {
                block.id = BlockId::generate();
                reassigned += 1;
            }
            block
        })
        .collect();
    (blocks, reassigned)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use answerkit_core::CodeLanguage;

    fn ids(doc: &BlockDocument) -> Vec<BlockId> {
        doc.blocks().iter().map(|b| b.id.clone()).collect()
    }

    #[test]
    fn new_document_has_one_text_block() {
        let doc = BlockDocument::new();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.blocks()[0].kind(), BlockKind::Text);
    }

    #[test]
    fn add_block_appends_with_defaults() {
        let mut doc = BlockDocument::new();
        let code = doc.add_block(BlockKind::Code);
        let table = doc.add_block(BlockKind::Table);
        assert_eq!(doc.len(), 3);
        assert!(matches!(
            doc.get(&code).unwrap().body,
            BlockBody::Code { language: CodeLanguage::Java, .. }
        ));
        let t = doc.get(&table).unwrap().table().unwrap();
        assert_eq!((t.row_count(), t.column_count()), (2, 2));
        assert_ne!(code, table);
    }

    #[test]
    fn deleting_the_last_block_is_a_no_op() {
        let mut doc = BlockDocument::new();
        let only = ids(&doc)[0].clone();
        assert!(!doc.delete_block(&only));
        assert_eq!(doc.len(), 1);
        assert_eq!(ids(&doc), vec![only]);
    }

    #[test]
    fn delete_removes_the_matching_block() {
        let mut doc = BlockDocument::new();
        let second = doc.add_block(BlockKind::Code);
        assert!(doc.delete_block(&second));
        assert!(doc.get(&second).is_none());
        assert!(!doc.delete_block(&BlockId::from("missing")));
    }

    #[test]
    fn move_swaps_neighbours_and_stops_at_edges() {
        let mut doc = BlockDocument::new();
        let first = ids(&doc)[0].clone();
        let second = doc.add_block(BlockKind::Code);
        let third = doc.add_block(BlockKind::Image);

        assert!(!doc.move_block(&first, MoveDirection::Up));
        assert!(!doc.move_block(&third, MoveDirection::Down));
        assert!(doc.move_block(&third, MoveDirection::Up));
        assert_eq!(ids(&doc), vec![first.clone(), third.clone(), second.clone()]);
        assert!(doc.move_block(&first, MoveDirection::Down));
        assert_eq!(ids(&doc), vec![third, first, second]);
    }

    #[test]
    fn update_merges_fields_and_ignores_unknown_ids() {
        let mut doc = BlockDocument::new();
        let code = doc.add_block(BlockKind::Code);
        assert!(doc.update_block(
            &code,
            BlockPatch {
                content: Some("print(1)".into()),
                language: Some(CodeLanguage::Python),
                ..Default::default()
            }
        ));
        assert_eq!(
            doc.get(&code).unwrap().body,
            BlockBody::Code {
                content: "print(1)".into(),
                language: CodeLanguage::Python
            }
        );
        let before = doc.clone();
        assert!(!doc.update_block(&BlockId::from("nope"), BlockPatch::content("x")));
        assert_eq!(doc, before);
    }

    #[test]
    fn table_operations_keep_rows_equal_length() {
        let mut doc = BlockDocument::new();
        let table = doc.add_block(BlockKind::Table);
        assert!(doc.add_table_column(&table));
        assert!(doc.add_table_row(&table));
        assert!(doc.add_table_row(&table));
        assert!(doc.delete_table_row(&table, 0));
        assert!(doc.add_table_column(&table));
        assert!(doc.delete_table_column(&table, 2));
        assert!(doc.set_table_cell(&table, 2, 2, "corner"));
        assert!(!doc.set_table_cell(&table, 3, 0, "x"));

        let t = doc.get(&table).unwrap().table().unwrap();
        assert!(t.is_rectangular());
        assert_eq!((t.row_count(), t.column_count()), (3, 3));
        assert_eq!(t.cell(2, 2), Some("corner"));
    }

    #[test]
    fn delete_table_row_keeps_the_last_row() {
        let mut doc = BlockDocument::new();
        let table = doc.add_block(BlockKind::Table);
        assert!(doc.delete_table_row(&table, 1));
        assert!(!doc.delete_table_row(&table, 0));
        assert_eq!(doc.get(&table).unwrap().table().unwrap().row_count(), 1);
    }

    #[test]
    fn table_ops_on_non_tables_are_no_ops() {
        let mut doc = BlockDocument::new();
        let text = ids(&doc)[0].clone();
        assert!(!doc.add_table_row(&text));
        assert!(!doc.set_table_cell(&text, 0, 0, "x"));
    }

    #[test]
    fn json_round_trip_preserves_order_types_and_content() {
        let mut doc = BlockDocument::new();
        let first = ids(&doc)[0].clone();
        doc.update_block(&first, BlockPatch::content("Explain HashMap."));
        let code = doc.add_block(BlockKind::Code);
        doc.update_block(&code, BlockPatch::content("Map<String, Integer> m = new HashMap<>();"));
        let image = doc.add_block(BlockKind::Image);
        doc.update_block(
            &image,
            BlockPatch {
                content: Some("data:image/png;base64,iVBORw0KGgo=".into()),
                caption: Some("Buckets".into()),
                ..Default::default()
            },
        );
        let table = doc.add_block(BlockKind::Table);
        doc.set_table_cell(&table, 0, 0, "Op");
        doc.set_table_cell(&table, 0, 1, "Cost");

        let restored = BlockDocument::from_json(&doc.to_json());
        assert_eq!(restored, doc);
    }

    #[test]
    fn malformed_json_becomes_a_text_block() {
        let (doc, outcome) = BlockDocument::from_json_with_outcome("not json");
        assert_eq!(doc.len(), 1);
        assert_eq!(
            doc.blocks()[0].body,
            BlockBody::Text {
                content: "not json".into()
            }
        );
        assert!(matches!(outcome, LoadOutcome::WrappedRaw { .. }));
    }

    #[test]
    fn non_array_json_becomes_a_text_block() {
        let doc = BlockDocument::from_json("{\"type\":\"text\"}");
        assert_eq!(doc.blocks()[0].body.content(), "{\"type\":\"text\"}");
    }

    #[test]
    fn empty_payloads_yield_the_default_document() {
        assert_eq!(BlockDocument::from_json_with_outcome("  ").1, LoadOutcome::Empty);
        let doc = BlockDocument::from_json("[]");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.blocks()[0].body.content(), "");
    }

    #[test]
    fn unreadable_records_are_skipped_and_ids_deduplicated() {
        let raw = r#"[
            {"id": "a", "type": "text", "content": "one"},
            {"id": "a", "type": "code", "content": "two"},
            {"id": "v", "type": "video", "content": "three"},
            42,
            {"type": "text", "content": "four"}
        ]"#;
        let (doc, outcome) = BlockDocument::from_json_with_outcome(raw);
        assert_eq!(
            outcome,
            LoadOutcome::Parsed {
                skipped: 2,
                reassigned_ids: 1
            }
        );
        let contents: Vec<_> = doc.blocks().iter().map(|b| b.body.content()).collect();
        assert_eq!(contents, vec!["one", "two", "four"]);
        let unique: HashSet<_> = ids(&doc).into_iter().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn set_image_validates_payload() {
        let mut doc = BlockDocument::new();
        let image = doc.add_block(BlockKind::Image);
        let policy = ImagePolicy::default();
        assert!(doc.set_image(&image, "data:image/png;base64,iVBORw0KGgo=", &policy).is_ok());
        assert!(matches!(
            doc.set_image(&image, "data:text/plain,hi", &policy),
            Err(ContentError::NotAnImage(_))
        ));
        let text = ids(&doc)[0].clone();
        assert!(matches!(
            doc.set_image(&text, "https://example.com/a.png", &policy),
            Err(ContentError::NotAnImageBlock(_))
        ));
        assert_eq!(
            doc.get(&image).unwrap().body.content(),
            "data:image/png;base64,iVBORw0KGgo="
        );
    }
}

//! Editor session over one block document.
//!
//! The session is the only owner of its document. Each operation runs against
//! a copy which then replaces the current value, and the stored JSON is
//! rewritten whenever something changed.

use answerkit_core::ContentError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::block::{BlockId, BlockKind, BlockPatch};
use crate::document::{BlockDocument, LoadOutcome, MoveDirection};
use crate::image::ImagePolicy;

/// One editing operation, replayable from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BlockOp {
    AddBlock {
        kind: BlockKind,
    },
    UpdateBlock {
        id: BlockId,
        #[serde(flatten)]
        patch: BlockPatch,
    },
    DeleteBlock {
        id: BlockId,
    },
    MoveBlock {
        id: BlockId,
        direction: MoveDirection,
    },
    SetTableCell {
        id: BlockId,
        row: usize,
        col: usize,
        value: String,
    },
    AddTableRow {
        id: BlockId,
    },
    AddTableColumn {
        id: BlockId,
    },
    DeleteTableRow {
        id: BlockId,
        row: usize,
    },
    DeleteTableColumn {
        id: BlockId,
        col: usize,
    },
    SetImage {
        id: BlockId,
        payload: String,
    },
}

impl BlockDocument {
    /// Applies one operation in place. `Ok(false)` means nothing changed.
    pub fn apply(&mut self, op: BlockOp, images: &ImagePolicy) -> Result<bool, ContentError> {
        let changed = match op {
            BlockOp::AddBlock { kind } => {
                self.add_block(kind);
                true
            }
            BlockOp::UpdateBlock { id, patch } => self.update_block(&id, patch),
            BlockOp::DeleteBlock { id } => self.delete_block(&id),
            BlockOp::MoveBlock { id, direction } => self.move_block(&id, direction),
            BlockOp::SetTableCell { id, row, col, value } => {
                self.set_table_cell(&id, row, col, &value)
            }
            BlockOp::AddTableRow { id } => self.add_table_row(&id),
            BlockOp::AddTableColumn { id } => self.add_table_column(&id),
            BlockOp::DeleteTableRow { id, row } => self.delete_table_row(&id, row),
            BlockOp::DeleteTableColumn { id, col } => self.delete_table_column(&id, col),
            BlockOp::SetImage { id, payload } => {
                self.set_image(&id, &payload, images)?;
                true
            }
        };
        Ok(changed)
    }
}

#[derive(Debug, Clone)]
pub struct BlockSession {
    document: BlockDocument,
    json: String,
    images: ImagePolicy,
}

impl Default for BlockSession {
    fn default() -> Self {
        Self::new(ImagePolicy::default())
    }
}

impl BlockSession {
    pub fn new(images: ImagePolicy) -> Self {
        Self::with_document(BlockDocument::new(), images)
    }

    pub fn with_document(document: BlockDocument, images: ImagePolicy) -> Self {
        let json = document.to_json();
        Self {
            document,
            json,
            images,
        }
    }

    /// Opens a session on previously stored content.
    pub fn open(stored: Option<&str>, images: ImagePolicy) -> (Self, LoadOutcome) {
        let (document, outcome) = match stored {
            Some(raw) => BlockDocument::from_json_with_outcome(raw),
            None => (BlockDocument::new(), LoadOutcome::Empty),
        };
        (Self::with_document(document, images), outcome)
    }

    pub fn document(&self) -> &BlockDocument {
        &self.document
    }

    /// The serialized form of the current document.
    pub fn json(&self) -> &str {
        &self.json
    }

    pub fn apply(&mut self, op: BlockOp) -> Result<bool, ContentError> {
        let mut next = self.document.clone();
        if !next.apply(op, &self.images)? {
            return Ok(false);
        }
        self.document = next;
        self.json = self.document.to_json();
        debug!(blocks = self.document.len(), "Block document updated");
        Ok(true)
    }

    pub fn apply_all(&mut self, ops: impl IntoIterator<Item = BlockOp>) -> Result<usize, ContentError> {
        let mut changed = 0;
        for op in ops {
            if self.apply(op)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    pub fn into_document(self) -> BlockDocument {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockBody;

    #[test]
    fn every_change_rewrites_the_json() {
        let mut session = BlockSession::default();
        let before = session.json().to_string();
        assert!(session.apply(BlockOp::AddBlock { kind: BlockKind::Code }).unwrap());
        assert_ne!(session.json(), before);
        assert_eq!(BlockDocument::from_json(session.json()), *session.document());
    }

    #[test]
    fn no_op_leaves_json_untouched() {
        let mut session = BlockSession::default();
        let id = session.document().blocks()[0].id.clone();
        let before = session.json().to_string();
        assert!(!session.apply(BlockOp::DeleteBlock { id }).unwrap());
        assert_eq!(session.json(), before);
    }

    #[test]
    fn failed_image_leaves_document_unchanged() {
        let mut session = BlockSession::default();
        session.apply(BlockOp::AddBlock { kind: BlockKind::Image }).unwrap();
        let id = session.document().blocks()[1].id.clone();
        let before = session.document().clone();
        let result = session.apply(BlockOp::SetImage {
            id,
            payload: "data:application/pdf;base64,JVBERi0=".into(),
        });
        assert!(result.is_err());
        assert_eq!(*session.document(), before);
    }

    #[test]
    fn ops_replay_from_json() {
        let (mut session, _) = BlockSession::open(
            Some(r#"[{"id":"t","type":"table","content":"","tableData":[["a","b"]]}]"#),
            ImagePolicy::default(),
        );
        let script = r#"[
            {"op": "add_table_row", "id": "t"},
            {"op": "set_table_cell", "id": "t", "row": 1, "col": 0, "value": "c"},
            {"op": "add_block", "kind": "text"},
            {"op": "move_block", "id": "t", "direction": "down"},
            {"op": "update_block", "id": "missing", "content": "x"}
        ]"#;
        let ops: Vec<BlockOp> = serde_json::from_str(script).unwrap();
        assert_eq!(session.apply_all(ops).unwrap(), 4);

        let doc = session.document();
        assert_eq!(doc.blocks()[0].kind(), BlockKind::Text);
        let table = doc.blocks()[1].table().unwrap();
        assert_eq!(table.rows(), &[vec!["a", "b"], vec!["c", ""]]);
        assert!(matches!(doc.blocks()[0].body, BlockBody::Text { .. }));
    }
}

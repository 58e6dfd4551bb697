//! JSON wire format for block documents.
//!
//! Blocks are stored as a flat JSON array of objects:
//! `{"id", "type", "content", "language"?, "tableData"?, "caption"?}`.
//! Reading is lenient; writing always produces the canonical shape.

use answerkit_core::CodeLanguage;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::block::{Block, BlockBody, BlockId, BlockKind, Table};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockOut<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: BlockKind,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<CodeLanguage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    table_data: Option<&'a [Vec<String>]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (language, table_data, caption) = match &self.body {
            BlockBody::Code { language, .. } => (Some(*language), None, None),
            BlockBody::Table { table } => (None, Some(table.rows()), None),
            BlockBody::Image { caption, .. } => (None, None, caption.as_deref()),
            BlockBody::Text { .. } => (None, None, None),
        };
        BlockOut {
            id: self.id.as_str(),
            kind: self.kind(),
            content: self.body.content(),
            language,
            table_data,
            caption,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = BlockRecord::deserialize(deserializer)?;
        record.into_block().map_err(D::Error::custom)
    }
}

/// A stored block as found on disk, before any normalization.
///
/// Older editors also wrote `rows`/`cols` counters; those are ignored since
/// the shape is derived from `tableData`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub language: Option<Value>,
    #[serde(default)]
    pub table_data: Option<Value>,
    #[serde(default)]
    pub caption: Option<Value>,
}

impl BlockRecord {
    /// The stored id as a string, if it is a non-empty string or a number.
    pub fn id(&self) -> Option<BlockId> {
        match self.id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(BlockId::from(s.as_str())),
            Value::Number(n) => Some(BlockId::from(n.to_string())),
            _ => None,
        }
    }

    /// Converts to a typed block. A missing id gets a fresh one; everything
    /// except an unknown type is repaired rather than rejected.
    pub fn into_block(self) -> Result<Block, String> {
        let kind: BlockKind = self
            .kind
            .as_deref()
            .ok_or_else(|| "block has no type".to_string())?
            .parse()?;
        let id = self.id().unwrap_or_else(BlockId::generate);
        let content = cell_string(self.content.as_ref());

        let body = match kind {
            BlockKind::Text => BlockBody::Text { content },
            BlockKind::Code => BlockBody::Code {
                content,
                language: CodeLanguage::from_tag_or_default(
                    self.language.as_ref().and_then(Value::as_str),
                ),
            },
            BlockKind::Image => BlockBody::Image {
                content,
                caption: Some(cell_string(self.caption.as_ref())).filter(|c| !c.is_empty()),
            },
            BlockKind::Table => BlockBody::Table {
                table: Table::from_rows(table_rows(self.table_data.as_ref())),
            },
        };
        Ok(Block { id, body })
    }
}

/// Renders a loosely typed JSON scalar as cell/content text.
fn cell_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn table_rows(value: Option<&Value>) -> Vec<Vec<String>> {
    let Some(Value::Array(rows)) = value else {
        return Vec::new();
    };
    rows.iter()
        .map(|row| match row {
            Value::Array(cells) => cells.iter().map(|c| cell_string(Some(c))).collect(),
            _ => Vec::new(),
        })
        .collect()
}

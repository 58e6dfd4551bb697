use std::fmt;
use std::str::FromStr;

use answerkit_core::CodeLanguage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque block identifier, stable for the block's lifetime.
///
/// Stored documents may carry ids minted by older editors (timestamps), so
/// this is a string rather than a `Uuid`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of block types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Code,
    Image,
    Table,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Code => "code",
            BlockKind::Image => "image",
            BlockKind::Table => "table",
        }
    }
}

impl FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(BlockKind::Text),
            "code" => Ok(BlockKind::Code),
            "image" => Ok(BlockKind::Image),
            "table" => Ok(BlockKind::Table),
            other => Err(format!("unknown block type '{other}'")),
        }
    }
}

/// A rectangular matrix of cell strings.
///
/// Every mutation keeps all rows at the same length, and a table never drops
/// below one row or one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new(2, 2)
    }
}

impl Table {
    pub fn new(rows: usize, cols: usize) -> Self {
        let cols = cols.max(1);
        Self {
            rows: vec![vec![String::new(); cols]; rows.max(1)],
        }
    }

    /// Builds a table from possibly ragged data, padding short rows.
    ///
    /// Data with no rows or no columns at all yields the default table.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return Self::default();
        }
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    pub fn is_rectangular(&self) -> bool {
        let width = self.column_count();
        self.rows.iter().all(|row| row.len() == width)
    }

    /// Returns false (and changes nothing) when the cell is out of range.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value.into();
                true
            }
            None => false,
        }
    }

    pub fn add_row(&mut self) {
        let width = self.column_count();
        self.rows.push(vec![String::new(); width]);
    }

    pub fn add_column(&mut self) {
        for row in &mut self.rows {
            row.push(String::new());
        }
    }

    pub fn delete_row(&mut self, row: usize) -> bool {
        if self.rows.len() <= 1 || row >= self.rows.len() {
            return false;
        }
        self.rows.remove(row);
        true
    }

    pub fn delete_column(&mut self, col: usize) -> bool {
        if self.column_count() <= 1 || col >= self.column_count() {
            return false;
        }
        for row in &mut self.rows {
            row.remove(col);
        }
        true
    }
}

/// Type-specific payload of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockBody {
    Text {
        content: String,
    },
    Code {
        content: String,
        language: CodeLanguage,
    },
    Image {
        /// Data URI or URL.
        content: String,
        caption: Option<String>,
    },
    Table {
        table: Table,
    },
}

impl BlockBody {
    /// The default payload for a freshly added block.
    pub fn empty(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Text => BlockBody::Text {
                content: String::new(),
            },
            BlockKind::Code => BlockBody::Code {
                content: String::new(),
                language: CodeLanguage::default(),
            },
            BlockKind::Image => BlockBody::Image {
                content: String::new(),
                caption: None,
            },
            BlockKind::Table => BlockBody::Table {
                table: Table::default(),
            },
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            BlockBody::Text { .. } => BlockKind::Text,
            BlockBody::Code { .. } => BlockKind::Code,
            BlockBody::Image { .. } => BlockKind::Image,
            BlockBody::Table { .. } => BlockKind::Table,
        }
    }

    /// The semantic string payload; tables have none.
    pub fn content(&self) -> &str {
        match self {
            BlockBody::Text { content }
            | BlockBody::Code { content, .. }
            | BlockBody::Image { content, .. } => content,
            BlockBody::Table { .. } => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub body: BlockBody,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: BlockId::generate(),
            body: BlockBody::empty(kind),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            id: BlockId::generate(),
            body: BlockBody::Text {
                content: content.into(),
            },
        }
    }

    pub fn code(content: impl Into<String>, language: CodeLanguage) -> Self {
        Self {
            id: BlockId::generate(),
            body: BlockBody::Code {
                content: content.into(),
                language,
            },
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.body.kind()
    }

    pub fn table(&self) -> Option<&Table> {
        match &self.body {
            BlockBody::Table { table } => Some(table),
            _ => None,
        }
    }

    pub fn table_mut(&mut self) -> Option<&mut Table> {
        match &mut self.body {
            BlockBody::Table { table } => Some(table),
            _ => None,
        }
    }

    /// Merges the fields of `patch` that make sense for this block's type.
    pub fn apply_patch(&mut self, patch: BlockPatch) {
        match &mut self.body {
            BlockBody::Text { content } => {
                if let Some(new) = patch.content {
                    *content = new;
                }
            }
            BlockBody::Code { content, language } => {
                if let Some(new) = patch.content {
                    *content = new;
                }
                if let Some(new) = patch.language {
                    *language = new;
                }
            }
            BlockBody::Image { content, caption } => {
                if let Some(new) = patch.content {
                    *content = new;
                }
                if let Some(new) = patch.caption {
                    *caption = (!new.is_empty()).then_some(new);
                }
            }
            BlockBody::Table { table } => {
                if let Some(rows) = patch.table_data {
                    *table = Table::from_rows(rows);
                }
            }
        }
    }
}

/// Partial update for `update_block`. Absent fields are left alone; an empty
/// caption clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<CodeLanguage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_data: Option<Vec<Vec<String>>>,
}

impl BlockPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }
}

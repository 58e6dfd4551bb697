//! Structured answer content: an ordered list of text, code, image and table
//! blocks, its editing operations, and its JSON storage format.

pub mod block;
pub mod document;
pub mod image;
pub mod render;
pub mod session;
pub mod wire;

pub use block::{Block, BlockBody, BlockId, BlockKind, BlockPatch, Table};
pub use document::{BlockDocument, LoadOutcome, MoveDirection};
pub use image::ImagePolicy;
pub use render::{RenderedBlock, blocks_to_markup, render_blocks};
pub use session::{BlockOp, BlockSession};
pub use wire::BlockRecord;

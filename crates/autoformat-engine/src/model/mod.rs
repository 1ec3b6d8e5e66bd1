//! # Rich Text Model
//!
//! An immutable block document: every edit produces a new [`EditorState`]
//! snapshot and leaves the previous one untouched, so edit history is a plain
//! list of snapshots.
//!
//! - **`block`**: blocks, block types and per-char inline styles
//! - **`selection`**: anchor/focus positions in char offsets
//! - **`rich_text`**: the [`RichText`] capability trait the autoformat engine
//!   is written against
//! - **`editor_state`**: [`EditorState`], the snapshot type implementing it

pub mod block;
pub mod editor_state;
pub mod rich_text;
pub mod selection;

pub use block::{Block, BlockKey, BlockType, InlineStyle, StyleSet};
pub use editor_state::{CaretMove, EditorState};
pub use rich_text::{ChangeType, NamedCommand, RichText};
pub use selection::Selection;

/// Write rejected by the model.
///
/// These indicate a defect in the caller: a well-behaved editor never computes
/// positions outside the snapshot it read them from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Unknown block: {0}")]
    UnknownBlock(BlockKey),
    #[error("Range {start}..{end} out of bounds for block {key} (len {len})")]
    InvalidRange {
        key: BlockKey,
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("Selection out of bounds: {0:?}")]
    SelectionOutOfBounds(Selection),
    #[error("Duplicate block key: {0}")]
    DuplicateKey(BlockKey),
}

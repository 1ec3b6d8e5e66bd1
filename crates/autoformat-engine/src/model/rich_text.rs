use std::ops::Range;

use crate::model::{BlockKey, BlockType, EditError, InlineStyle, Selection};

/// Built-in key commands understood by [`RichText::apply_named_command`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedCommand {
    Bold,
    Italic,
    Underline,
    Code,
}

impl NamedCommand {
    /// Parse a command name such as `"bold"`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bold" => Some(NamedCommand::Bold),
            "italic" => Some(NamedCommand::Italic),
            "underline" => Some(NamedCommand::Underline),
            "code" => Some(NamedCommand::Code),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NamedCommand::Bold => "bold",
            NamedCommand::Italic => "italic",
            NamedCommand::Underline => "underline",
            NamedCommand::Code => "code",
        }
    }

    /// The inline style this command toggles
    pub fn style(self) -> InlineStyle {
        match self {
            NamedCommand::Bold => InlineStyle::Bold,
            NamedCommand::Italic => InlineStyle::Italic,
            NamedCommand::Underline => InlineStyle::Underline,
            NamedCommand::Code => InlineStyle::Code,
        }
    }
}

/// Kind of write that produced a snapshot, recorded for edit history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    InsertCharacters,
    RemoveRange,
    BackspaceCharacter,
    SplitBlock,
    ChangeBlockType,
    ChangeInlineStyle,
}

/// Capabilities the autoformat engine needs from a rich-text document model.
///
/// Every write takes `&self` and returns a new snapshot; implementations must
/// never mutate the receiver. Writes with out-of-range positions return
/// [`EditError`] instead of clamping.
pub trait RichText: Sized {
    /// Current selection of this snapshot
    fn selection(&self) -> Selection;

    /// Full text of the block keyed `key`
    fn block_text(&self, key: &BlockKey) -> Option<String>;

    /// Replace the char range of one block with `replacement`.
    /// The new snapshot's caret sits after the replacement.
    fn replace_text_range(
        &self,
        key: &BlockKey,
        range: Range<usize>,
        replacement: &str,
    ) -> Result<Self, EditError>;

    /// Split the block at a collapsed `selection`.
    /// The new snapshot's caret sits at the start of the new block.
    fn split_block(&self, selection: &Selection) -> Result<Self, EditError>;

    fn set_block_type(&self, key: &BlockKey, block_type: BlockType) -> Result<Self, EditError>;

    /// Toggle `style` over `selection`, or toggle the pending style for the
    /// next typed characters when `selection` is collapsed.
    fn toggle_inline_style(
        &self,
        selection: &Selection,
        style: InlineStyle,
    ) -> Result<Self, EditError>;

    /// Apply a built-in key command at the current selection.
    /// Returns `None` when the command does not apply.
    fn apply_named_command(&self, command: NamedCommand) -> Result<Option<Self>, EditError>;
}

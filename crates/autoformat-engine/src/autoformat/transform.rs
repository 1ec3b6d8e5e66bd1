use std::ops::Range;

use crate::autoformat::triggers::Transform;
use crate::model::{BlockKey, EditError, InlineStyle, NamedCommand, RichText};

impl Transform {
    /// Delete `marker` from block `key`, then apply this transform to the
    /// snapshot the delete produced.
    ///
    /// Each step reads its selection from the snapshot it writes to; nothing
    /// computed against `state` is reused after the delete.
    pub(crate) fn apply<S: RichText>(
        self,
        state: &S,
        key: &BlockKey,
        marker: Range<usize>,
    ) -> Result<S, EditError> {
        let deleted = state.replace_text_range(key, marker, "")?;

        match self {
            Transform::RetypeBlock(block_type) => deleted.set_block_type(key, block_type),
            Transform::SplitAndRetype(block_type) => {
                let split = deleted.split_block(&deleted.selection())?;
                let new_block = split.selection().focus_key;
                split.set_block_type(&new_block, block_type)
            }
            Transform::ToggleInlineStyle(style) => {
                if let Some(command) = key_command(style)
                    && let Some(next) = deleted.apply_named_command(command)?
                {
                    return Ok(next);
                }
                deleted.toggle_inline_style(&deleted.selection(), style)
            }
        }
    }
}

/// Styles toggled through the model's built-in key commands rather than
/// directly.
fn key_command(style: InlineStyle) -> Option<NamedCommand> {
    match style {
        InlineStyle::Bold => Some(NamedCommand::Bold),
        InlineStyle::Underline => Some(NamedCommand::Underline),
        _ => None,
    }
}

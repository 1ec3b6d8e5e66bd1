use std::collections::HashSet;
use std::ops::Range;

use crate::model::{
    Block, BlockKey, BlockType, ChangeType, EditError, InlineStyle, NamedCommand, RichText,
    Selection, StyleSet,
};

/// Caret movements supported by [`EditorState::move_caret`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretMove {
    Left,
    Right,
    Up,
    Down,
    BlockStart,
    BlockEnd,
    DocumentEnd,
}

/// Immutable snapshot of the whole editor.
///
/// Holds the ordered blocks, the selection, and the pending inline style
/// override. Every operation returns a new snapshot; writes that change
/// content clear the override, just like moving the caret does.
///
/// ```rust
/// use autoformat_engine::model::{Block, EditorState, RichText};
///
/// let state = EditorState::from_blocks(vec![Block::new("a", "hello")]).unwrap();
/// let typed = state.insert_text("!").unwrap();
/// assert_eq!(typed.block_text(&"a".into()).unwrap(), "!hello");
/// assert_eq!(state.plain_text(), "hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    blocks: Vec<Block>,
    selection: Selection,
    style_override: Option<StyleSet>,
    last_change: Option<ChangeType>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    /// A document with a single empty unstyled block
    pub fn new() -> Self {
        let block = Block::empty();
        let selection = Selection::caret(block.key.clone(), 0);
        Self {
            blocks: vec![block],
            selection,
            style_override: None,
            last_change: None,
        }
    }

    /// Build a snapshot from blocks, with the caret at the start of the first
    /// block. An empty list yields a single empty block.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, EditError> {
        if blocks.is_empty() {
            return Ok(Self::new());
        }

        let mut seen = HashSet::new();
        for block in &blocks {
            if !seen.insert(&block.key) {
                return Err(EditError::DuplicateKey(block.key.clone()));
            }
        }

        let selection = Selection::caret(blocks[0].key.clone(), 0);
        Ok(Self {
            blocks,
            selection,
            style_override: None,
            last_change: None,
        })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, key: &BlockKey) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.key == key)
    }

    pub fn block_index(&self, key: &BlockKey) -> Option<usize> {
        self.blocks.iter().position(|b| &b.key == key)
    }

    /// Pending styles for the next typed characters, if toggled explicitly
    pub fn style_override(&self) -> Option<&StyleSet> {
        self.style_override.as_ref()
    }

    /// Kind of write that produced this snapshot
    pub fn last_change_type(&self) -> Option<ChangeType> {
        self.last_change
    }

    /// Block texts joined by newlines
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Style the next typed character would receive.
    ///
    /// The override wins when set. Otherwise a collapsed selection takes the
    /// style of the char before the caret, then the first char of the block,
    /// then the last char of the nearest non-empty block above. A range takes
    /// the style of its first char.
    pub fn current_inline_style(&self) -> StyleSet {
        if let Some(style) = &self.style_override {
            return style.clone();
        }
        self.inline_style_at(&self.selection)
    }

    fn inline_style_at(&self, selection: &Selection) -> StyleSet {
        let Ok(((index, offset), _)) = self.ordered(selection) else {
            return StyleSet::new();
        };
        let block = &self.blocks[index];

        if !selection.is_collapsed() {
            return block.style_at(offset).cloned().unwrap_or_default();
        }
        if offset > 0 {
            return block.styles[offset - 1].clone();
        }
        if let Some(first) = block.styles.first() {
            return first.clone();
        }
        self.blocks[..index]
            .iter()
            .rev()
            .find_map(|b| b.styles.last().cloned())
            .unwrap_or_default()
    }

    /// Replace the current selection, clearing any pending style override
    pub fn with_selection(&self, selection: Selection) -> Result<Self, EditError> {
        self.ordered(&selection)?;
        let mut next = self.clone();
        next.selection = selection;
        next.style_override = None;
        Ok(next)
    }

    /// Insert `text` at the selection, replacing any selected range.
    ///
    /// Inserted chars take [`current_inline_style`](Self::current_inline_style).
    pub fn insert_text(&self, text: &str) -> Result<Self, EditError> {
        let style = self.current_inline_style();
        let mut next = self.remove_selected()?;
        let (index, offset) = next.caret_position()?;

        next.blocks[index].splice(offset, offset, text, &style);
        next.selection = Selection::caret(
            next.blocks[index].key.clone(),
            offset + text.chars().count(),
        );
        next.style_override = None;
        next.last_change = Some(ChangeType::InsertCharacters);
        Ok(next)
    }

    /// Delete the selection, or the char before the caret. At the start of a
    /// block the block is merged into the one above.
    pub fn backspace(&self) -> Result<Self, EditError> {
        if !self.selection.is_collapsed() {
            return self.remove_selected();
        }

        let (index, offset) = self.caret_position()?;
        let mut next = self.clone();
        next.style_override = None;

        if offset > 0 {
            next.blocks[index].splice(offset - 1, offset, "", &StyleSet::new());
            next.selection = Selection::caret(next.blocks[index].key.clone(), offset - 1);
        } else if index > 0 {
            let removed = next.blocks.remove(index);
            let previous = &mut next.blocks[index - 1];
            let join_at = previous.len();
            previous.append(removed);
            next.selection = Selection::caret(previous.key.clone(), join_at);
        } else {
            return Ok(next);
        }

        next.last_change = Some(ChangeType::BackspaceCharacter);
        Ok(next)
    }

    /// Move the caret, collapsing any range first
    pub fn move_caret(&self, movement: CaretMove) -> Self {
        let (index, offset) = self
            .ordered(&self.selection)
            .map(|(_, end)| end)
            .unwrap_or((0, 0));
        let len = self.blocks[index].len();
        let last = self.blocks.len() - 1;

        let (index, offset) = match movement {
            CaretMove::Left if offset > 0 => (index, offset - 1),
            CaretMove::Left if index > 0 => (index - 1, self.blocks[index - 1].len()),
            CaretMove::Right if offset < len => (index, offset + 1),
            CaretMove::Right if index < last => (index + 1, 0),
            CaretMove::Up if index > 0 => (index - 1, offset.min(self.blocks[index - 1].len())),
            CaretMove::Down if index < last => {
                (index + 1, offset.min(self.blocks[index + 1].len()))
            }
            CaretMove::BlockStart => (index, 0),
            CaretMove::BlockEnd => (index, len),
            CaretMove::DocumentEnd => (last, self.blocks[last].len()),
            _ => (index, offset),
        };

        let mut next = self.clone();
        next.selection = Selection::caret(self.blocks[index].key.clone(), offset);
        next.style_override = None;
        next
    }

    fn index_of(&self, key: &BlockKey) -> Result<usize, EditError> {
        self.block_index(key)
            .ok_or_else(|| EditError::UnknownBlock(key.clone()))
    }

    /// Validate `selection` and return its (block index, offset) endpoints in
    /// document order.
    fn ordered(&self, selection: &Selection) -> Result<((usize, usize), (usize, usize)), EditError> {
        let anchor = (self.index_of(&selection.anchor_key)?, selection.anchor_offset);
        let focus = (self.index_of(&selection.focus_key)?, selection.focus_offset);
        for (index, offset) in [anchor, focus] {
            if offset > self.blocks[index].len() {
                return Err(EditError::SelectionOutOfBounds(selection.clone()));
            }
        }
        Ok(if anchor <= focus {
            (anchor, focus)
        } else {
            (focus, anchor)
        })
    }

    fn caret_position(&self) -> Result<(usize, usize), EditError> {
        self.ordered(&self.selection).map(|(start, _)| start)
    }

    /// Remove the selected range and collapse the caret to its start
    fn remove_selected(&self) -> Result<Self, EditError> {
        let selection = self.selection.clone();
        self.remove_range(&selection)
    }

    fn remove_range(&self, selection: &Selection) -> Result<Self, EditError> {
        let ((start_index, start_offset), (end_index, end_offset)) = self.ordered(selection)?;
        let mut next = self.clone();

        if selection.is_collapsed() {
            next.selection = Selection::caret(self.blocks[start_index].key.clone(), start_offset);
            return Ok(next);
        }

        if start_index == end_index {
            next.blocks[start_index].splice(start_offset, end_offset, "", &StyleSet::new());
        } else {
            let mut tail = next.blocks[end_index].clone();
            let tail_rest = tail.split_off(end_offset, tail.key.clone());
            let first = &mut next.blocks[start_index];
            let first_len = first.len();
            first.splice(start_offset, first_len, "", &StyleSet::new());
            first.append(tail_rest);
            next.blocks.drain(start_index + 1..=end_index);
        }

        next.selection = Selection::caret(next.blocks[start_index].key.clone(), start_offset);
        next.style_override = None;
        next.last_change = Some(ChangeType::RemoveRange);
        Ok(next)
    }

    /// A key not used by any block of this snapshot
    fn fresh_key(&self) -> BlockKey {
        loop {
            let key = BlockKey::random();
            if self.block_index(&key).is_none() {
                return key;
            }
        }
    }
}

impl RichText for EditorState {
    fn selection(&self) -> Selection {
        self.selection.clone()
    }

    fn block_text(&self, key: &BlockKey) -> Option<String> {
        self.block(key).map(|b| b.text.clone())
    }

    fn replace_text_range(
        &self,
        key: &BlockKey,
        range: Range<usize>,
        replacement: &str,
    ) -> Result<Self, EditError> {
        let index = self.index_of(key)?;
        let len = self.blocks[index].len();
        if range.start > range.end || range.end > len {
            return Err(EditError::InvalidRange {
                key: key.clone(),
                start: range.start,
                end: range.end,
                len,
            });
        }

        let mut next = self.clone();
        next.blocks[index].splice(range.start, range.end, replacement, &StyleSet::new());
        next.selection = Selection::caret(
            key.clone(),
            range.start + replacement.chars().count(),
        );
        next.style_override = None;
        next.last_change = Some(ChangeType::RemoveRange);
        Ok(next)
    }

    fn split_block(&self, selection: &Selection) -> Result<Self, EditError> {
        let mut next = self.remove_range(selection)?;
        let (index, offset) = next.caret_position()?;

        let key = next.fresh_key();
        let tail = next.blocks[index].split_off(offset, key.clone());
        next.blocks.insert(index + 1, tail);
        next.selection = Selection::caret(key, 0);
        next.style_override = None;
        next.last_change = Some(ChangeType::SplitBlock);
        Ok(next)
    }

    fn set_block_type(&self, key: &BlockKey, block_type: BlockType) -> Result<Self, EditError> {
        let index = self.index_of(key)?;
        let mut next = self.clone();
        next.blocks[index].block_type = block_type;
        next.style_override = None;
        next.last_change = Some(ChangeType::ChangeBlockType);
        Ok(next)
    }

    fn toggle_inline_style(
        &self,
        selection: &Selection,
        style: InlineStyle,
    ) -> Result<Self, EditError> {
        let ((start_index, start_offset), (end_index, end_offset)) = self.ordered(selection)?;
        let mut next = self.clone();
        next.selection = selection.clone();

        if selection.is_collapsed() {
            let mut pending = if self.selection == *selection {
                self.current_inline_style()
            } else {
                self.inline_style_at(selection)
            };
            if !pending.remove(&style) {
                pending.insert(style);
            }
            next.style_override = Some(pending);
            next.last_change = Some(ChangeType::ChangeInlineStyle);
            return Ok(next);
        }

        // Char ranges covered by the selection, per block index
        let spans: Vec<(usize, Range<usize>)> = (start_index..=end_index)
            .map(|index| {
                let from = if index == start_index { start_offset } else { 0 };
                let to = if index == end_index {
                    end_offset
                } else {
                    self.blocks[index].len()
                };
                (index, from..to)
            })
            .collect();

        let all_styled = spans.iter().all(|(index, range)| {
            self.blocks[*index].styles[range.clone()]
                .iter()
                .all(|set| set.contains(&style))
        });

        for (index, range) in spans {
            for set in &mut next.blocks[index].styles[range] {
                if all_styled {
                    set.remove(&style);
                } else {
                    set.insert(style);
                }
            }
        }

        next.style_override = None;
        next.last_change = Some(ChangeType::ChangeInlineStyle);
        Ok(next)
    }

    fn apply_named_command(&self, command: NamedCommand) -> Result<Option<Self>, EditError> {
        self.toggle_inline_style(&self.selection, command.style())
            .map(Some)
    }
}

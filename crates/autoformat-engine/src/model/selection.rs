use crate::model::BlockKey;

/// A selection expressed as anchor and focus positions.
///
/// Offsets are char offsets into the owning block's text. They are only valid
/// for the snapshot they were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub anchor_key: BlockKey,
    pub anchor_offset: usize,
    pub focus_key: BlockKey,
    pub focus_offset: usize,
}

impl Selection {
    /// A zero-width selection at `offset`
    pub fn caret(key: BlockKey, offset: usize) -> Self {
        Self {
            anchor_key: key.clone(),
            anchor_offset: offset,
            focus_key: key,
            focus_offset: offset,
        }
    }

    /// A selection within a single block
    pub fn range(key: BlockKey, anchor_offset: usize, focus_offset: usize) -> Self {
        Self {
            anchor_key: key.clone(),
            anchor_offset,
            focus_key: key,
            focus_offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor_key == self.focus_key && self.anchor_offset == self.focus_offset
    }
}

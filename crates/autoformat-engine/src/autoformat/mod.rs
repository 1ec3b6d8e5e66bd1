//! # Autoformat Trigger Engine
//!
//! Runs before each character insertion. When the inserted character is a
//! space and the caret's block ends in a known marker, the marker is consumed
//! and replaced by a block or inline transform:
//!
//! | Marker | Transform |
//! |--------|-----------|
//! | `#` alone | block becomes a heading |
//! | trailing `#` | block splits, new block is plain |
//! | `***` | toggle underline |
//! | `**` | toggle red text |
//! | `*` | toggle bold |
//! | `` ``` `` | toggle code |
//!
//! The rules live in [`triggers::TRIGGERS`] in priority order. The engine only
//! talks to the document through [`RichText`], so any snapshot type providing
//! those capabilities can be autoformatted.
//!
//! ## Write sequence
//!
//! A fired rule performs exactly one delete, then an optional split, then a
//! retype or style toggle. Each write consumes the snapshot produced by the
//! previous one and only the final snapshot is returned, so callers never see
//! a half-applied transform.

pub mod transform;
pub mod triggers;


use std::ops::Range;

use crate::model::{EditError, RichText};

pub use triggers::{MatchPosition, Pattern, TRIGGERS, Transform, Trigger, TriggerMatch, find_match};

/// Result of offering an insertion to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<S> {
    /// The engine consumed the keystroke and produced this snapshot
    Handled(S),
    /// The caller should insert the character normally
    NotHandled,
}

/// Offer `inserted` to the trigger engine before it is committed to `state`.
///
/// Only a single space can fire a rule, and only with a collapsed selection.
/// An error means the model rejected a write, which indicates a defect in the
/// model rather than in the user's input.
///
/// ```rust
/// use autoformat_engine::autoformat::{Outcome, on_before_insert};
/// use autoformat_engine::model::{Block, BlockType, CaretMove, EditorState};
///
/// let state = EditorState::from_blocks(vec![Block::new("a", "#")])
///     .unwrap()
///     .move_caret(CaretMove::DocumentEnd);
/// let Outcome::Handled(next) = on_before_insert(&state, " ").unwrap() else {
///     panic!("expected heading trigger");
/// };
/// assert_eq!(next.blocks()[0].block_type(), BlockType::HeaderOne);
/// assert_eq!(next.blocks()[0].text(), "");
/// ```
pub fn on_before_insert<S: RichText>(state: &S, inserted: &str) -> Result<Outcome<S>, EditError> {
    if inserted != " " {
        return Ok(Outcome::NotHandled);
    }

    let selection = state.selection();
    if !selection.is_collapsed() {
        return Ok(Outcome::NotHandled);
    }

    let key = selection.focus_key;
    let text = state
        .block_text(&key)
        .ok_or_else(|| EditError::UnknownBlock(key.clone()))?;

    let Some(found) = find_match(text.trim()) else {
        return Ok(Outcome::NotHandled);
    };

    let Some(marker) = marker_range(&text, selection.focus_offset, &found) else {
        log::debug!(
            "autoformat rule {} ({:?}) matched but caret {} is not after the marker",
            found.rule,
            found.marker,
            selection.focus_offset
        );
        return Ok(Outcome::NotHandled);
    };

    log::debug!(
        "autoformat rule {} fired: removing {:?} at {:?}, {:?}",
        found.rule,
        found.marker,
        marker,
        found.transform
    );

    found
        .transform
        .apply(state, &key, marker)
        .map(Outcome::Handled)
}

/// Char range of the marker to delete, or `None` when the range at the
/// expected position does not hold exactly the marker.
fn marker_range(text: &str, caret: usize, found: &TriggerMatch) -> Option<Range<usize>> {
    let chars: Vec<char> = text.chars().collect();
    let len = found.marker.chars().count();

    let start = match found.position {
        MatchPosition::Prefix => chars.iter().take_while(|c| c.is_whitespace()).count(),
        MatchPosition::Suffix => caret.checked_sub(len)?,
    };
    let range = start..start + len;

    // Suffix rules do not delete `caret - len .. caret` blindly: when trailing
    // whitespace or the caret position leaves other chars there, the keystroke
    // is not handled and no user text is removed.
    let held: String = chars.get(range.clone())?.iter().collect();
    (held == found.marker).then_some(range)
}

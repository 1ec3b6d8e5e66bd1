//! Serializable form of a document.
//!
//! The layout is the common rich-text "raw" JSON shape:
//!
//! ```json
//! {
//!   "blocks": [
//!     {
//!       "key": "9f2c1a0b",
//!       "text": "Hello",
//!       "type": "header-one",
//!       "depth": 0,
//!       "inlineStyleRanges": [{ "offset": 0, "length": 5, "style": "BOLD" }],
//!       "entityRanges": [],
//!       "data": {}
//!     }
//!   ],
//!   "entityMap": {}
//! }
//! ```
//!
//! Offsets and lengths count chars. Selection and pending styles are editor
//! session state and are not persisted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{Block, BlockKey, BlockType, EditError, EditorState, InlineStyle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContent {
    pub blocks: Vec<RawBlock>,
    #[serde(default)]
    pub entity_map: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    pub key: BlockKey,
    pub text: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub inline_style_ranges: Vec<RawStyleRange>,
    #[serde(default)]
    pub entity_ranges: Vec<Value>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: InlineStyle,
}

#[derive(Debug, thiserror::Error)]
pub enum RawError {
    #[error("Style range {offset}+{length} exceeds block {key} (len {len})")]
    StyleRangeOutOfBounds {
        key: BlockKey,
        offset: usize,
        length: usize,
        len: usize,
    },
    #[error("Invalid document: {0}")]
    Model(#[from] EditError),
}

/// Encode a snapshot's blocks, types, text and style ranges
pub fn convert_to_raw(state: &EditorState) -> RawContent {
    RawContent {
        blocks: state.blocks().iter().map(encode_block).collect(),
        entity_map: Map::new(),
    }
}

/// Rebuild a snapshot from raw content, with the caret at the document start
pub fn convert_from_raw(raw: RawContent) -> Result<EditorState, RawError> {
    let blocks = raw
        .blocks
        .into_iter()
        .map(decode_block)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EditorState::from_blocks(blocks)?)
}

/// Style ranges of a block: one range per maximal run, grouped by style
fn encode_block(block: &Block) -> RawBlock {
    let mut ranges = Vec::new();
    for style in InlineStyle::ALL {
        let mut run_start = None;
        for (offset, set) in block.styles().iter().enumerate() {
            match (set.contains(&style), run_start) {
                (true, None) => run_start = Some(offset),
                (false, Some(start)) => {
                    ranges.push(RawStyleRange {
                        offset: start,
                        length: offset - start,
                        style,
                    });
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            ranges.push(RawStyleRange {
                offset: start,
                length: block.len() - start,
                style,
            });
        }
    }

    RawBlock {
        key: block.key().clone(),
        text: block.text().to_string(),
        block_type: block.block_type(),
        depth: 0,
        inline_style_ranges: ranges,
        entity_ranges: Vec::new(),
        data: Map::new(),
    }
}

fn decode_block(raw: RawBlock) -> Result<Block, RawError> {
    if !raw.entity_ranges.is_empty() {
        log::warn!(
            "Dropping {} entity ranges from block {}",
            raw.entity_ranges.len(),
            raw.key
        );
    }

    let mut block = Block::new(raw.key, raw.text).with_type(raw.block_type);
    for range in raw.inline_style_ranges {
        let Some(end) = range
            .offset
            .checked_add(range.length)
            .filter(|&end| end <= block.len())
        else {
            return Err(RawError::StyleRangeOutOfBounds {
                key: block.key().clone(),
                offset: range.offset,
                length: range.length,
                len: block.len(),
            });
        };
        block = block.with_style(range.offset, end, range.style);
    }
    Ok(block)
}

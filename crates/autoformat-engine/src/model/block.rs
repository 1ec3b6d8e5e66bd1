use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a block within a snapshot.
///
/// Keys survive edits to the block's text and are only minted when a block is
/// split. Uniqueness is checked against the snapshot at mint time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(String);

impl BlockKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Mint a fresh random key (8 hex chars).
    pub fn random() -> Self {
        let mut simple = uuid::Uuid::new_v4().simple().to_string();
        simple.truncate(8);
        Self(simple)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Structural type of a block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    #[default]
    #[serde(rename = "unstyled")]
    Unstyled,
    #[serde(rename = "header-one")]
    HeaderOne,
}

impl BlockType {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Unstyled => "unstyled",
            BlockType::HeaderOne => "header-one",
        }
    }
}

/// Named inline formatting attribute.
///
/// The serialized names follow the rich-text convention: built-in styles are
/// upper case, custom styles (`redline`, `code`) keep the name they were
/// registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InlineStyle {
    #[serde(rename = "BOLD")]
    Bold,
    #[serde(rename = "ITALIC")]
    Italic,
    #[serde(rename = "UNDERLINE")]
    Underline,
    /// Custom red text colour
    #[serde(rename = "redline")]
    Redline,
    /// Custom monospace style
    #[serde(rename = "code")]
    Code,
}

impl InlineStyle {
    pub const ALL: [InlineStyle; 5] = [
        InlineStyle::Bold,
        InlineStyle::Italic,
        InlineStyle::Underline,
        InlineStyle::Redline,
        InlineStyle::Code,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InlineStyle::Bold => "BOLD",
            InlineStyle::Italic => "ITALIC",
            InlineStyle::Underline => "UNDERLINE",
            InlineStyle::Redline => "redline",
            InlineStyle::Code => "code",
        }
    }
}

/// Set of styles applied to a single character
pub type StyleSet = BTreeSet<InlineStyle>;

/// One paragraph-like unit of the document.
///
/// Styles are stored per character, so `styles.len()` always equals the number
/// of chars in `text`. All offsets into a block are char offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub(crate) key: BlockKey,
    pub(crate) block_type: BlockType,
    pub(crate) text: String,
    pub(crate) styles: Vec<StyleSet>,
}

impl Block {
    /// Create an unstyled block with no inline styles
    pub fn new(key: impl Into<BlockKey>, text: impl Into<String>) -> Self {
        let text = text.into();
        let styles = vec![StyleSet::new(); text.chars().count()];
        Self {
            key: key.into(),
            block_type: BlockType::Unstyled,
            text,
            styles,
        }
    }

    pub fn empty() -> Self {
        Self::new(BlockKey::random(), "")
    }

    pub fn with_type(mut self, block_type: BlockType) -> Self {
        self.block_type = block_type;
        self
    }

    /// Apply `style` over the char range `[start, end)`, clamped to the text.
    pub fn with_style(mut self, start: usize, end: usize, style: InlineStyle) -> Self {
        let end = end.min(self.styles.len());
        for set in self.styles.iter_mut().take(end).skip(start) {
            set.insert(style);
        }
        self
    }

    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Per-char style sets, one entry per char of `text`
    pub fn styles(&self) -> &[StyleSet] {
        &self.styles
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Styles of the char at `offset`, if any
    pub fn style_at(&self, offset: usize) -> Option<&StyleSet> {
        self.styles.get(offset)
    }

    /// Replace the chars in `[start, end)` with `replacement`, every new char
    /// receiving `style`.
    pub(crate) fn splice(&mut self, start: usize, end: usize, replacement: &str, style: &StyleSet) {
        let byte_start = char_to_byte(&self.text, start);
        let byte_end = char_to_byte(&self.text, end);
        self.text.replace_range(byte_start..byte_end, replacement);
        let inserted = replacement.chars().count();
        self.styles
            .splice(start..end, std::iter::repeat_n(style.clone(), inserted));
    }

    /// Split off everything from `offset` into a new block keyed `key`.
    /// The new block inherits this block's type.
    pub(crate) fn split_off(&mut self, offset: usize, key: BlockKey) -> Block {
        let byte_offset = char_to_byte(&self.text, offset);
        let text = self.text.split_off(byte_offset);
        let styles = self.styles.split_off(offset);
        Block {
            key,
            block_type: self.block_type,
            text,
            styles,
        }
    }

    /// Append `other`'s content to this block
    pub(crate) fn append(&mut self, other: Block) {
        self.text.push_str(&other.text);
        self.styles.extend(other.styles);
    }
}

/// Convert a char offset into a byte offset of `text`.
/// Offsets past the end map to `text.len()`.
pub(crate) fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

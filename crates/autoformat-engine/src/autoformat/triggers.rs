use crate::model::{BlockType, InlineStyle};

/// How a marker must appear in the trimmed block text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// The whole trimmed text is the marker
    Equals(&'static str),
    /// The trimmed text ends with the marker and has more before it
    EndsWith(&'static str),
}

impl Pattern {
    pub fn marker(self) -> &'static str {
        match self {
            Pattern::Equals(m) | Pattern::EndsWith(m) => m,
        }
    }

    /// Marker length in chars
    pub fn marker_len(self) -> usize {
        self.marker().chars().count()
    }

    pub fn matches(self, trimmed: &str) -> bool {
        match self {
            Pattern::Equals(m) => trimmed == m,
            Pattern::EndsWith(m) => trimmed.len() > m.len() && trimmed.ends_with(m),
        }
    }

    pub fn position(self) -> MatchPosition {
        match self {
            Pattern::Equals(_) => MatchPosition::Prefix,
            Pattern::EndsWith(_) => MatchPosition::Suffix,
        }
    }
}

/// Where the consumed marker sits in the block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPosition {
    /// Marker is the block's entire content
    Prefix,
    /// Marker ends at the caret
    Suffix,
}

/// Change applied once the marker has been deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Change the type of the current block
    RetypeBlock(BlockType),
    /// Split at the caret and give the new trailing block this type
    SplitAndRetype(BlockType),
    /// Toggle an inline style at the caret
    ToggleInlineStyle(InlineStyle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub pattern: Pattern,
    pub transform: Transform,
}

/// Trigger rules in priority order. The first match wins.
///
/// Longer markers precede the shorter markers they contain: `***` before
/// `**` before `*`, so typing `** ` never fires the single-star rule.
pub const TRIGGERS: &[Trigger] = &[
    Trigger {
        pattern: Pattern::Equals("#"),
        transform: Transform::RetypeBlock(BlockType::HeaderOne),
    },
    // Leaves the split block's type alone and makes the new block plain.
    Trigger {
        pattern: Pattern::EndsWith("#"),
        transform: Transform::SplitAndRetype(BlockType::Unstyled),
    },
    Trigger {
        pattern: Pattern::Equals("***"),
        transform: Transform::ToggleInlineStyle(InlineStyle::Underline),
    },
    Trigger {
        pattern: Pattern::EndsWith("***"),
        transform: Transform::ToggleInlineStyle(InlineStyle::Underline),
    },
    Trigger {
        pattern: Pattern::Equals("**"),
        transform: Transform::ToggleInlineStyle(InlineStyle::Redline),
    },
    Trigger {
        pattern: Pattern::EndsWith("**"),
        transform: Transform::ToggleInlineStyle(InlineStyle::Redline),
    },
    Trigger {
        pattern: Pattern::Equals("*"),
        transform: Transform::ToggleInlineStyle(InlineStyle::Bold),
    },
    Trigger {
        pattern: Pattern::EndsWith("*"),
        transform: Transform::ToggleInlineStyle(InlineStyle::Bold),
    },
    Trigger {
        pattern: Pattern::Equals("```"),
        transform: Transform::ToggleInlineStyle(InlineStyle::Code),
    },
    Trigger {
        pattern: Pattern::EndsWith("```"),
        transform: Transform::ToggleInlineStyle(InlineStyle::Code),
    },
];

/// A trigger rule matched against one block's text. Recomputed per keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerMatch {
    /// 1-based position in [`TRIGGERS`]
    pub rule: usize,
    pub marker: &'static str,
    pub position: MatchPosition,
    pub transform: Transform,
}

/// Find the highest-priority trigger for already-trimmed block text
pub fn find_match(trimmed: &str) -> Option<TriggerMatch> {
    TRIGGERS
        .iter()
        .enumerate()
        .find(|(_, t)| t.pattern.matches(trimmed))
        .map(|(i, t)| TriggerMatch {
            rule: i + 1,
            marker: t.pattern.marker(),
            position: t.pattern.position(),
            transform: t.transform,
        })
}

//! Line/column coordinates.
//!
//! Unlike [`OffsetRange`] these coordinates are 1-based, matching the way editors
//! address text. Columns count unicode scalar values (`char`s).

use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::range::OffsetRange;

/// A 1-based `(line, column)` position inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Position {
        Position { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.line, self.column)
    }
}

/// A range of text between two [`Position`]s. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    pub fn new(start: Position, end: Position) -> TextRange {
        debug_assert!(start <= end, "text range {start} -> {end} is inverted");
        TextRange { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{} -> {},{}]",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// A half-open range of 1-based line numbers `[start, end_exclusive)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineRange {
    pub start: usize,
    pub end_exclusive: usize,
}

impl LineRange {
    /// # Panics
    ///
    /// If `start > end_exclusive`.
    pub fn new(start: usize, end_exclusive: usize) -> LineRange {
        assert!(
            start <= end_exclusive,
            "start line {start} cannot be after end line {end_exclusive}"
        );
        LineRange {
            start,
            end_exclusive,
        }
    }

    pub fn of_length(start: usize, len: usize) -> LineRange {
        LineRange::new(start, start + len)
    }

    pub fn len(&self) -> usize {
        self.end_exclusive - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end_exclusive
    }

    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line < self.end_exclusive
    }

    pub fn join(self, other: LineRange) -> LineRange {
        LineRange::new(
            self.start.min(other.start),
            self.end_exclusive.max(other.end_exclusive),
        )
    }

    /// Unlike [`OffsetRange::intersect`], touching line ranges produce an
    /// empty intersection rather than `None`.
    pub fn intersect(self, other: LineRange) -> Option<LineRange> {
        let start = self.start.max(other.start);
        let end_exclusive = self.end_exclusive.min(other.end_exclusive);
        (start <= end_exclusive).then(|| LineRange::new(start, end_exclusive))
    }

    pub fn overlap_or_touch(&self, other: LineRange) -> bool {
        self.start <= other.end_exclusive && other.start <= self.end_exclusive
    }

    /// Converts to 0-based line indices.
    pub fn to_offset_range(self) -> OffsetRange {
        OffsetRange::new(self.start - 1, self.end_exclusive - 1)
    }

    pub fn from_offset_range(range: OffsetRange) -> LineRange {
        LineRange::new(range.start + 1, range.end_exclusive + 1)
    }
}

impl Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start, self.end_exclusive)
    }
}

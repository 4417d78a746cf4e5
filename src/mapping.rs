//! The result types produced by a [`LinesDiffComputer`](crate::LinesDiffComputer).

use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::position::{LineRange, Position, TextRange};

/// A character level change: `original` is replaced by `modified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangeMapping {
    pub original: TextRange,
    pub modified: TextRange,
}

impl RangeMapping {
    pub fn new(original: TextRange, modified: TextRange) -> RangeMapping {
        RangeMapping { original, modified }
    }

    pub fn flip(self) -> RangeMapping {
        RangeMapping::new(self.modified, self.original)
    }
}

impl Display for RangeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}->{}}}", self.original, self.modified)
    }
}

/// Maps a range of lines in the original document to a range of lines in the modified document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineRangeMapping {
    pub original: LineRange,
    pub modified: LineRange,
}

impl LineRangeMapping {
    pub fn new(original: LineRange, modified: LineRange) -> LineRangeMapping {
        LineRangeMapping { original, modified }
    }

    pub fn flip(self) -> LineRangeMapping {
        LineRangeMapping::new(self.modified, self.original)
    }

    pub fn changed_line_count(&self) -> usize {
        self.original.len().max(self.modified.len())
    }
}

impl Display for LineRangeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}->{}}}", self.original, self.modified)
    }
}

/// A hunk: a [`LineRangeMapping`] together with the character level
/// changes ([`inner_changes`](DetailedLineRangeMapping::inner_changes)) inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetailedLineRangeMapping {
    pub original: LineRange,
    pub modified: LineRange,
    pub inner_changes: Vec<RangeMapping>,
}

impl DetailedLineRangeMapping {
    pub fn new(
        original: LineRange,
        modified: LineRange,
        inner_changes: Vec<RangeMapping>,
    ) -> DetailedLineRangeMapping {
        DetailedLineRangeMapping {
            original,
            modified,
            inner_changes,
        }
    }

    /// Computes the unchanged regions between `changes`.
    ///
    /// `changes` must be sorted and non-overlapping. Regions that are
    /// empty in the modified document are omitted.
    pub fn inverse(
        changes: &[DetailedLineRangeMapping],
        original_line_count: usize,
        modified_line_count: usize,
    ) -> Vec<LineRangeMapping> {
        let mut res = Vec::with_capacity(changes.len() + 1);
        let mut original_start = 1;
        let mut modified_start = 1;
        for change in changes {
            let unchanged = LineRangeMapping::new(
                LineRange::new(original_start, change.original.start),
                LineRange::new(modified_start, change.modified.start),
            );
            if !unchanged.modified.is_empty() {
                res.push(unchanged);
            }
            original_start = change.original.end_exclusive;
            modified_start = change.modified.end_exclusive;
        }
        let unchanged = LineRangeMapping::new(
            LineRange::new(original_start, original_line_count + 1),
            LineRange::new(modified_start, modified_line_count + 1),
        );
        if !unchanged.modified.is_empty() {
            res.push(unchanged);
        }
        res
    }

    pub fn line_range_mapping(&self) -> LineRangeMapping {
        LineRangeMapping::new(self.original, self.modified)
    }

    pub fn changed_line_count(&self) -> usize {
        self.line_range_mapping().changed_line_count()
    }

    pub fn flip(&self) -> DetailedLineRangeMapping {
        DetailedLineRangeMapping::new(
            self.modified,
            self.original,
            self.inner_changes.iter().map(|change| change.flip()).collect(),
        )
    }
}

impl Display for DetailedLineRangeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}->{}}}", self.original, self.modified)
    }
}

/// A block of lines that was moved to a different location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MovedText {
    pub line_range_mapping: LineRangeMapping,
    /// The changes made to the block while it was moved,
    /// in the same shape as [`LinesDiff::changes`].
    pub changes: Vec<DetailedLineRangeMapping>,
}

impl MovedText {
    pub fn flip(&self) -> MovedText {
        MovedText {
            line_range_mapping: self.line_range_mapping.flip(),
            changes: self.changes.iter().map(|change| change.flip()).collect(),
        }
    }
}

/// The result of diffing two documents.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinesDiff {
    pub changes: Vec<DetailedLineRangeMapping>,
    pub moves: Vec<MovedText>,
    /// If set, some part of the computation ran out of time and the
    /// result is a (valid but) coarser approximation.
    pub hit_timeout: bool,
}

/// The document a [`ValidationError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Original,
    Modified,
}

impl Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Original => f.write_str("original"),
            Side::Modified => f.write_str("modified"),
        }
    }
}

/// A violated post-condition of a [`LinesDiff`].
///
/// These are never caused by the input documents,
/// they always indicate a bug in the diff computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("position {position} is outside of the {side} document")]
    PositionOutOfBounds { side: Side, position: Position },
    #[error("line range {range} is outside of the {side} document")]
    LineRangeOutOfBounds { side: Side, range: LineRange },
    #[error("changes {index} and {} are not separated by the same number of unchanged lines", .index + 1)]
    NotSeparated { index: usize },
    #[error("the first change {original}->{modified} is preceded by a different number of lines on each side")]
    MisalignedStart {
        original: LineRange,
        modified: LineRange,
    },
}

impl LinesDiff {
    /// Checks that every range of this diff lies within the two documents
    /// and that the changes are sorted and separated by unchanged lines.
    pub fn validate(&self, original: &[&str], modified: &[&str]) -> Result<(), ValidationError> {
        validate_changes(&self.changes, original, modified, true)?;
        for moved in &self.moves {
            check_line_range(moved.line_range_mapping.original, original, Side::Original)?;
            check_line_range(moved.line_range_mapping.modified, modified, Side::Modified)?;
            validate_changes(&moved.changes, original, modified, false)?;
        }
        Ok(())
    }
}

fn validate_changes(
    changes: &[DetailedLineRangeMapping],
    original: &[&str],
    modified: &[&str],
    check_start: bool,
) -> Result<(), ValidationError> {
    if let (true, Some(first)) = (check_start, changes.first()) {
        if first.original.start != first.modified.start {
            return Err(ValidationError::MisalignedStart {
                original: first.original,
                modified: first.modified,
            });
        }
    }
    for change in changes {
        for inner in &change.inner_changes {
            check_position(inner.original.start, original, Side::Original)?;
            check_position(inner.original.end, original, Side::Original)?;
            check_position(inner.modified.start, modified, Side::Modified)?;
            check_position(inner.modified.end, modified, Side::Modified)?;
        }
        check_line_range(change.original, original, Side::Original)?;
        check_line_range(change.modified, modified, Side::Modified)?;
    }
    for (index, pair) in changes.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        let separated = prev.original.end_exclusive < next.original.start
            && prev.modified.end_exclusive < next.modified.start
            && next.original.start - prev.original.end_exclusive
                == next.modified.start - prev.modified.end_exclusive;
        if !separated {
            return Err(ValidationError::NotSeparated { index });
        }
    }
    Ok(())
}

fn check_position(position: Position, lines: &[&str], side: Side) -> Result<(), ValidationError> {
    let valid = position.line >= 1
        && position.line <= lines.len()
        && position.column >= 1
        && position.column <= lines[position.line - 1].chars().count() + 1;
    if valid {
        Ok(())
    } else {
        Err(ValidationError::PositionOutOfBounds { side, position })
    }
}

fn check_line_range(range: LineRange, lines: &[&str], side: Side) -> Result<(), ValidationError> {
    let valid = range.start >= 1 && range.end_exclusive <= lines.len() + 1;
    if valid {
        Ok(())
    } else {
        Err(ValidationError::LineRangeOutOfBounds { side, range })
    }
}

//! The sequences that are aligned by the [diff algorithms](crate::algorithms)
//! and the edits the algorithms produce.

use std::fmt::{self, Display};

pub use crate::sequence::lines::LineSequence;
pub use crate::sequence::slice::LinesSliceCharSequence;
use crate::range::{OffsetPair, OffsetRange};

mod lines;
mod slice;

/// An indexable sequence of comparable elements.
pub trait Sequence {
    type Element: PartialEq + Copy;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn element(&self, offset: usize) -> Self::Element;

    /// How well suited the boundary between the first `length` elements and the rest is
    /// for the start or end of a diff. Higher is better.
    fn boundary_score(&self, length: usize) -> i32;

    /// Whether the elements at `offset1` and `offset2` are identical, not just equal
    /// under the comparison used by [`element`](Sequence::element).
    fn is_strongly_equal(&self, offset1: usize, offset2: usize) -> bool {
        self.element(offset1) == self.element(offset2)
    }

    /// Renders the elements in `range` as text.
    fn text(&self, range: OffsetRange) -> String;
}

/// A single aligned edit: `seq1_range` of the first sequence
/// is replaced by `seq2_range` of the second sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceDiff {
    pub seq1_range: OffsetRange,
    pub seq2_range: OffsetRange,
}

impl SequenceDiff {
    pub fn new(seq1_range: OffsetRange, seq2_range: OffsetRange) -> SequenceDiff {
        SequenceDiff {
            seq1_range,
            seq2_range,
        }
    }

    pub fn from_offset_pairs(start: OffsetPair, end_exclusive: OffsetPair) -> SequenceDiff {
        SequenceDiff::new(
            OffsetRange::new(start.offset1, end_exclusive.offset1),
            OffsetRange::new(start.offset2, end_exclusive.offset2),
        )
    }

    /// Computes the unchanged regions between the sorted, non-overlapping `diffs`,
    /// including the (possibly empty) regions before the first and after the last diff.
    pub fn invert(diffs: &[SequenceDiff], seq1_len: usize) -> Vec<SequenceDiff> {
        let mut res = Vec::with_capacity(diffs.len() + 1);
        let mut start = OffsetPair::ZERO;
        for diff in diffs {
            res.push(SequenceDiff::from_offset_pairs(start, diff.starts()));
            start = diff.end_exclusives();
        }
        let end = OffsetPair::new(seq1_len, start.offset2 + seq1_len - start.offset1);
        res.push(SequenceDiff::from_offset_pairs(start, end));
        res
    }

    pub fn swap(self) -> SequenceDiff {
        SequenceDiff::new(self.seq2_range, self.seq1_range)
    }

    pub fn join(self, other: SequenceDiff) -> SequenceDiff {
        SequenceDiff::new(
            self.seq1_range.join(other.seq1_range),
            self.seq2_range.join(other.seq2_range),
        )
    }

    pub fn delta(self, offset: isize) -> SequenceDiff {
        if offset == 0 {
            return self;
        }
        SequenceDiff::new(self.seq1_range.delta(offset), self.seq2_range.delta(offset))
    }

    pub fn delta_start(self, offset: isize) -> SequenceDiff {
        SequenceDiff::new(
            self.seq1_range.delta_start(offset),
            self.seq2_range.delta_start(offset),
        )
    }

    pub fn delta_end(self, offset: isize) -> SequenceDiff {
        SequenceDiff::new(
            self.seq1_range.delta_end(offset),
            self.seq2_range.delta_end(offset),
        )
    }

    /// Clamps `self` to `other` in both sequences.
    ///
    /// Uses [`OffsetRange::intersect_inclusive`], so a diff that only touches
    /// `other` is clamped to an empty range instead of vanishing.
    pub fn intersect(self, other: SequenceDiff) -> Option<SequenceDiff> {
        let seq1_range = self.seq1_range.intersect_inclusive(other.seq1_range)?;
        let seq2_range = self.seq2_range.intersect_inclusive(other.seq2_range)?;
        Some(SequenceDiff::new(seq1_range, seq2_range))
    }

    pub fn starts(&self) -> OffsetPair {
        OffsetPair::new(self.seq1_range.start, self.seq2_range.start)
    }

    pub fn end_exclusives(&self) -> OffsetPair {
        OffsetPair::new(self.seq1_range.end_exclusive, self.seq2_range.end_exclusive)
    }
}

impl Display for SequenceDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.seq1_range, self.seq2_range)
    }
}

/// The edits computed by a [`DiffAlgorithm`](crate::algorithms::DiffAlgorithm).
///
/// `diffs` are sorted, do not overlap and are separated
/// by at least one unchanged element in both sequences.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffAlgorithmResult {
    pub diffs: Vec<SequenceDiff>,
    pub hit_timeout: bool,
}

impl DiffAlgorithmResult {
    pub fn new(diffs: Vec<SequenceDiff>, hit_timeout: bool) -> DiffAlgorithmResult {
        DiffAlgorithmResult { diffs, hit_timeout }
    }

    /// A single diff that replaces all of `seq1` with all of `seq2`.
    pub fn trivial<S: Sequence + ?Sized>(seq1: &S, seq2: &S) -> DiffAlgorithmResult {
        DiffAlgorithmResult::new(
            vec![SequenceDiff::new(
                OffsetRange::new(0, seq1.len()),
                OffsetRange::new(0, seq2.len()),
            )],
            false,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::SequenceDiff;
    use crate::range::OffsetRange;

    fn diff(seq1: (usize, usize), seq2: (usize, usize)) -> SequenceDiff {
        SequenceDiff::new(
            OffsetRange::new(seq1.0, seq1.1),
            OffsetRange::new(seq2.0, seq2.1),
        )
    }

    #[test]
    fn invert_produces_gaps() {
        let diffs = [diff((1, 2), (1, 1)), diff((4, 4), (3, 6))];
        let gaps = SequenceDiff::invert(&diffs, 7);
        assert_eq!(
            gaps,
            [diff((0, 1), (0, 1)), diff((2, 4), (1, 3)), diff((4, 7), (6, 9))]
        );
    }

    #[test]
    fn invert_without_diffs() {
        assert_eq!(SequenceDiff::invert(&[], 3), [diff((0, 3), (0, 3))]);
    }
}

//! One dimensional offset arithmetic.
//!
//! All alignment algorithms operate on plain offsets into a [`Sequence`](crate::sequence::Sequence).
//! [`OffsetRange`] is the half-open interval used to describe a run of elements and
//! [`OffsetPair`] is a point in the two dimensional alignment space of two sequences.

use std::fmt::{self, Display};
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A half-open range `[start, end_exclusive)` of offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OffsetRange {
    pub start: usize,
    pub end_exclusive: usize,
}

impl OffsetRange {
    /// Creates a new range.
    ///
    /// # Panics
    ///
    /// If `start > end_exclusive`.
    pub fn new(start: usize, end_exclusive: usize) -> OffsetRange {
        assert!(
            start <= end_exclusive,
            "invalid range [{start}, {end_exclusive})"
        );
        OffsetRange {
            start,
            end_exclusive,
        }
    }

    /// Returns `None` instead of panicking if `start > end_exclusive`.
    pub fn try_new(start: usize, end_exclusive: usize) -> Option<OffsetRange> {
        (start <= end_exclusive).then_some(OffsetRange {
            start,
            end_exclusive,
        })
    }

    pub fn len(&self) -> usize {
        self.end_exclusive - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end_exclusive
    }

    /// Moves both ends of the range by `offset`.
    pub fn delta(self, offset: isize) -> OffsetRange {
        OffsetRange::new(shift(self.start, offset), shift(self.end_exclusive, offset))
    }

    pub fn delta_start(self, offset: isize) -> OffsetRange {
        OffsetRange::new(shift(self.start, offset), self.end_exclusive)
    }

    pub fn delta_end(self, offset: isize) -> OffsetRange {
        OffsetRange::new(self.start, shift(self.end_exclusive, offset))
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end_exclusive
    }

    pub fn contains_range(&self, other: OffsetRange) -> bool {
        self.start <= other.start && other.end_exclusive <= self.end_exclusive
    }

    /// The smallest range that contains both `self` and `other`,
    /// even if the two are disjoint.
    pub fn join(self, other: OffsetRange) -> OffsetRange {
        OffsetRange::new(
            self.start.min(other.start),
            self.end_exclusive.max(other.end_exclusive),
        )
    }

    /// The offsets contained in both ranges.
    ///
    /// Ranges that merely touch do not intersect and yield `None`.
    pub fn intersect(self, other: OffsetRange) -> Option<OffsetRange> {
        let start = self.start.max(other.start);
        let end_exclusive = self.end_exclusive.min(other.end_exclusive);
        (start < end_exclusive).then(|| OffsetRange::new(start, end_exclusive))
    }

    /// Like [`intersect`](OffsetRange::intersect), except that ranges which merely
    /// touch yield the empty range at the point where they meet.
    pub fn intersect_inclusive(self, other: OffsetRange) -> Option<OffsetRange> {
        OffsetRange::try_new(
            self.start.max(other.start),
            self.end_exclusive.min(other.end_exclusive),
        )
    }

    /// Like [`intersect`](OffsetRange::intersect) but adjacent ranges count as well.
    pub fn intersects_or_touches(&self, other: OffsetRange) -> bool {
        self.start <= other.end_exclusive && other.start <= self.end_exclusive
    }

    pub fn iter(&self) -> Range<usize> {
        self.start..self.end_exclusive
    }
}

impl From<OffsetRange> for Range<usize> {
    fn from(range: OffsetRange) -> Self {
        range.start..range.end_exclusive
    }
}

impl Display for OffsetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end_exclusive)
    }
}

/// A position in the alignment space of two sequences:
/// `offset1` indexes the first sequence, `offset2` the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetPair {
    pub offset1: usize,
    pub offset2: usize,
}

impl OffsetPair {
    pub const ZERO: OffsetPair = OffsetPair::new(0, 0);
    /// Saturated sentinel that compares greater or equal to every other pair.
    pub const MAX: OffsetPair = OffsetPair::new(usize::MAX, usize::MAX);

    pub const fn new(offset1: usize, offset2: usize) -> OffsetPair {
        OffsetPair { offset1, offset2 }
    }

    pub fn delta(self, offset: isize) -> OffsetPair {
        if offset == 0 {
            return self;
        }
        OffsetPair::new(shift(self.offset1, offset), shift(self.offset2, offset))
    }
}

impl Display for OffsetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.offset1, self.offset2)
    }
}

pub(crate) fn shift(value: usize, offset: isize) -> usize {
    match value.checked_add_signed(offset) {
        Some(res) => res,
        None => panic!("offset {value} shifted by {offset} is out of bounds"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_covers_disjoint_ranges() {
        let joined = OffsetRange::new(2, 4).join(OffsetRange::new(8, 9));
        assert_eq!(joined, OffsetRange::new(2, 9));
    }

    #[test]
    fn touching_ranges_do_not_intersect() {
        let a = OffsetRange::new(0, 3);
        let b = OffsetRange::new(3, 5);
        assert_eq!(a.intersect(b), None);
        assert!(a.intersects_or_touches(b));
        assert_eq!(a.intersect_inclusive(b), Some(OffsetRange::new(3, 3)));
        assert_eq!(a.intersect_inclusive(OffsetRange::new(4, 5)), None);
        assert!(!a.intersects_or_touches(OffsetRange::new(4, 5)));
        assert_eq!(a.intersect(OffsetRange::new(1, 7)), Some(OffsetRange::new(1, 3)));
    }

    #[test]
    fn deltas() {
        let range = OffsetRange::new(4, 6);
        assert_eq!(range.delta(-2), OffsetRange::new(2, 4));
        assert_eq!(range.delta_start(1), OffsetRange::new(5, 6));
        assert_eq!(range.delta_end(3), OffsetRange::new(4, 9));
        assert_eq!(OffsetPair::new(3, 5).delta(-3), OffsetPair::new(0, 2));
    }

    #[test]
    #[should_panic]
    fn inverted_range_is_rejected() {
        OffsetRange::new(3, 2);
    }
}

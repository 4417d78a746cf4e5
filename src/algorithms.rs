//! Sequence alignment algorithms.
//!
//! Two algorithms are provided:
//!
//! * [`DynamicProgrammingDiffing`] computes a (weighted) longest common subsequence in
//!   `O(N*M)` time and space. It is only used for short inputs, but supports a custom
//!   score for every pair of equal elements, which produces much better line alignments.
//! * [`MyersDiffAlgorithm`] is the greedy forward variant of the
//!   [myers algorithm](http://www.xmailserver.org/diff2.pdf) and runs in `O((N+M)D)`.
//!
//! Both poll a [`Timeout`] and degrade to a coarse result once it expires.

pub use crate::algorithms::dynamic_programming::DynamicProgrammingDiffing;
pub use crate::algorithms::myers::MyersDiffAlgorithm;
use crate::sequence::{DiffAlgorithmResult, Sequence};
use crate::timeout::Timeout;

mod dynamic_programming;
mod myers;

pub trait DiffAlgorithm {
    /// Aligns `seq1` and `seq2`.
    ///
    /// The returned diffs are sorted, non-overlapping and cover every element that
    /// is not part of the common subsequence found by the algorithm.
    fn compute<S: Sequence + ?Sized>(
        &self,
        seq1: &S,
        seq2: &S,
        timeout: &Timeout,
    ) -> DiffAlgorithmResult;
}

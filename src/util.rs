use crate::range::OffsetRange;
use crate::sequence::{DiffAlgorithmResult, Sequence, SequenceDiff};

pub fn common_prefix<S: Sequence + ?Sized>(seq1: &S, seq2: &S) -> usize {
    let mut off = 0;
    let max = seq1.len().min(seq2.len());
    while off < max && seq1.element(off) == seq2.element(off) {
        off += 1;
    }
    off
}

/// Number of equal elements at the end of `seq1[start1..]` and `seq2[start2..]`.
pub fn common_postfix<S: Sequence + ?Sized>(
    seq1: &S,
    start1: usize,
    seq2: &S,
    start2: usize,
) -> usize {
    let mut off = 0;
    let max = (seq1.len() - start1).min(seq2.len() - start2);
    while off < max && seq1.element(seq1.len() - off - 1) == seq2.element(seq2.len() - off - 1) {
        off += 1;
    }
    off
}

pub fn common_edges<S: Sequence + ?Sized>(seq1: &S, seq2: &S) -> (usize, usize) {
    let prefix = common_prefix(seq1, seq2);
    let postfix = common_postfix(seq1, prefix, seq2, prefix);
    (prefix, postfix)
}

/// Handles the inputs every algorithm answers the same way: two
/// sequences where at least one is empty, or two identical sequences.
pub fn trivial_result<S: Sequence + ?Sized>(seq1: &S, seq2: &S) -> Option<DiffAlgorithmResult> {
    if seq1.is_empty() && seq2.is_empty() {
        return Some(DiffAlgorithmResult::default());
    }
    if seq1.is_empty() || seq2.is_empty() {
        return Some(DiffAlgorithmResult::trivial(seq1, seq2));
    }
    if seq1.len() == seq2.len() && common_prefix(seq1, seq2) == seq1.len() {
        return Some(DiffAlgorithmResult::default());
    }
    None
}

/// The result reported when an algorithm runs out of time: everything
/// between the common prefix and postfix is replaced as a single diff.
pub fn timed_out_result<S: Sequence + ?Sized>(seq1: &S, seq2: &S) -> DiffAlgorithmResult {
    let (prefix, postfix) = common_edges(seq1, seq2);
    let seq1_range = OffsetRange::new(prefix, seq1.len() - postfix);
    let seq2_range = OffsetRange::new(prefix, seq2.len() - postfix);
    let diffs = if seq1_range.is_empty() && seq2_range.is_empty() {
        Vec::new()
    } else {
        vec![SequenceDiff::new(seq1_range, seq2_range)]
    };
    DiffAlgorithmResult::new(diffs, true)
}

/// A dense, row major two dimensional table.
pub struct Array2D<T> {
    items: Vec<T>,
    width: usize,
}

impl<T: Clone> Array2D<T> {
    pub fn new(width: usize, height: usize, value: T) -> Array2D<T> {
        Array2D {
            items: vec![value; width * height],
            width,
        }
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.items[x + y * self.width]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.items[x + y * self.width] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::{common_edges, timed_out_result, trivial_result};
    use crate::range::OffsetRange;
    use crate::sequence::{LinesSliceCharSequence, SequenceDiff};

    fn chars<'a>(lines: &'a [&'a str]) -> LinesSliceCharSequence<'a> {
        LinesSliceCharSequence::new(lines, OffsetRange::new(0, 1), true)
    }

    #[test]
    fn edges() {
        let (a, b) = (["abcxyz"], ["abyz"]);
        assert_eq!(common_edges(&chars(&a), &chars(&b)), (2, 2));
        let (a, b) = (["aaa"], ["aa"]);
        assert_eq!(common_edges(&chars(&a), &chars(&b)), (2, 0));
    }

    #[test]
    fn trivial_inputs() {
        let (a, b, empty) = (["abc"], ["abc"], [""]);
        assert_eq!(trivial_result(&chars(&a), &chars(&b)), Some(Default::default()));
        let res = trivial_result(&chars(&a), &chars(&empty)).unwrap();
        assert_eq!(
            res.diffs,
            [SequenceDiff::new(OffsetRange::new(0, 3), OffsetRange::new(0, 0))]
        );
        let c = ["abd"];
        assert_eq!(trivial_result(&chars(&a), &chars(&c)), None);
    }

    #[test]
    fn timed_out_result_strips_edges() {
        let (a, b) = (["abcxyz"], ["abQyz"]);
        let res = timed_out_result(&chars(&a), &chars(&b));
        assert!(res.hit_timeout);
        assert_eq!(
            res.diffs,
            [SequenceDiff::new(OffsetRange::new(2, 4), OffsetRange::new(2, 3))]
        );
    }
}

use crate::algorithms::DiffAlgorithm;
use crate::range::OffsetRange;
use crate::sequence::{DiffAlgorithmResult, Sequence, SequenceDiff};
use crate::timeout::Timeout;
use crate::util::{timed_out_result, trivial_result, Array2D};

/// A weighted longest common subsequence solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicProgrammingDiffing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Skip an element of the first sequence.
    Up,
    /// Skip an element of the second sequence.
    Left,
    Diagonal,
}

impl DynamicProgrammingDiffing {
    /// Like [`compute`](DiffAlgorithm::compute), but a match of `seq1[i]` and `seq2[j]`
    /// contributes `score(i, j)` instead of `1` to the total score.
    ///
    /// Matches that extend a run of consecutive matches additionally
    /// earn the length of that run, so longer runs are preferred.
    pub fn compute_with_score<S: Sequence + ?Sized>(
        &self,
        seq1: &S,
        seq2: &S,
        timeout: &Timeout,
        score: Option<&dyn Fn(usize, usize) -> f64>,
    ) -> DiffAlgorithmResult {
        if let Some(res) = trivial_result(seq1, seq2) {
            return res;
        }
        let (len1, len2) = (seq1.len(), seq2.len());

        let mut lcs_lengths = Array2D::new(len1, len2, 0f64);
        let mut directions = Array2D::new(len1, len2, Direction::Up);
        let mut run_lengths = Array2D::new(len1, len2, 0u32);

        for i in 0..len1 {
            if !timeout.is_valid() {
                return timed_out_result(seq1, seq2);
            }
            for j in 0..len2 {
                let horizontal = if i == 0 { 0.0 } else { *lcs_lengths.get(i - 1, j) };
                let vertical = if j == 0 { 0.0 } else { *lcs_lengths.get(i, j - 1) };

                let extended_seq = if seq1.element(i) == seq2.element(j) {
                    let mut res = if i == 0 || j == 0 {
                        0.0
                    } else {
                        *lcs_lengths.get(i - 1, j - 1)
                    };
                    if i > 0 && j > 0 && *directions.get(i - 1, j - 1) == Direction::Diagonal {
                        res += *run_lengths.get(i - 1, j - 1) as f64;
                    }
                    res + score.map_or(1.0, |score| score(i, j))
                } else {
                    -1.0
                };

                let best = horizontal.max(vertical).max(extended_seq);
                if best == extended_seq {
                    let prev_run = if i > 0 && j > 0 { *run_lengths.get(i - 1, j - 1) } else { 0 };
                    run_lengths.set(i, j, prev_run + 1);
                    directions.set(i, j, Direction::Diagonal);
                } else if best == horizontal {
                    run_lengths.set(i, j, 0);
                    directions.set(i, j, Direction::Up);
                } else {
                    run_lengths.set(i, j, 0);
                    directions.set(i, j, Direction::Left);
                }
                lcs_lengths.set(i, j, best);
            }
        }

        // backtrack from the end, emitting the gaps between diagonal steps
        let mut diffs = Vec::new();
        let mut last_aligned = (len1, len2);
        let (mut i, mut j) = (len1, len2);
        while i > 0 && j > 0 {
            match *directions.get(i - 1, j - 1) {
                Direction::Diagonal => {
                    push_gap(&mut diffs, (i, j), last_aligned);
                    last_aligned = (i - 1, j - 1);
                    i -= 1;
                    j -= 1;
                }
                Direction::Up => i -= 1,
                Direction::Left => j -= 1,
            }
        }
        push_gap(&mut diffs, (0, 0), last_aligned);
        diffs.reverse();

        DiffAlgorithmResult::new(diffs, false)
    }
}

fn push_gap(diffs: &mut Vec<SequenceDiff>, start: (usize, usize), end: (usize, usize)) {
    if start != end {
        diffs.push(SequenceDiff::new(
            OffsetRange::new(start.0, end.0),
            OffsetRange::new(start.1, end.1),
        ));
    }
}

impl DiffAlgorithm for DynamicProgrammingDiffing {
    fn compute<S: Sequence + ?Sized>(
        &self,
        seq1: &S,
        seq2: &S,
        timeout: &Timeout,
    ) -> DiffAlgorithmResult {
        self.compute_with_score(seq1, seq2, timeout, None)
    }
}

#[cfg(test)]
mod tests {
    use std::thread::sleep;
    use std::time::Duration;

    use super::DynamicProgrammingDiffing;
    use crate::algorithms::DiffAlgorithm;
    use crate::range::OffsetRange;
    use crate::sequence::{LinesSliceCharSequence, SequenceDiff};
    use crate::timeout::Timeout;

    fn chars<'a>(lines: &'a [&'a str]) -> LinesSliceCharSequence<'a> {
        LinesSliceCharSequence::new(lines, OffsetRange::new(0, 1), true)
    }

    fn diff(seq1: (usize, usize), seq2: (usize, usize)) -> SequenceDiff {
        SequenceDiff::new(
            OffsetRange::new(seq1.0, seq1.1),
            OffsetRange::new(seq2.0, seq2.1),
        )
    }

    #[test]
    fn insertion_and_replacement() {
        let (a, b) = (["abc"], ["abxc"]);
        let res = DynamicProgrammingDiffing.compute(&chars(&a), &chars(&b), &Timeout::infinite());
        assert!(!res.hit_timeout);
        assert_eq!(res.diffs, [diff((2, 2), (2, 3))]);

        let (a, b) = (["abcd"], ["xbcy"]);
        let res = DynamicProgrammingDiffing.compute(&chars(&a), &chars(&b), &Timeout::infinite());
        assert_eq!(res.diffs, [diff((0, 1), (0, 1)), diff((3, 4), (3, 4))]);
    }

    #[test]
    fn score_steers_alignment() {
        // "a" can be matched against either "a" of the second sequence
        let (a, b) = (["a"], ["aba"]);
        let res = DynamicProgrammingDiffing.compute(&chars(&a), &chars(&b), &Timeout::infinite());
        assert_eq!(res.diffs, [diff((0, 0), (0, 2))]);

        let prefer_first = |_: usize, j: usize| if j == 0 { 2.0 } else { 1.0 };
        let res = DynamicProgrammingDiffing.compute_with_score(
            &chars(&a),
            &chars(&b),
            &Timeout::infinite(),
            Some(&prefer_first),
        );
        assert_eq!(res.diffs, [diff((1, 1), (1, 3))]);
    }

    #[test]
    fn expired_timeout() {
        let (a, b) = (["xabcx"], ["yabdy"]);
        let timeout = Timeout::after(Duration::from_nanos(1));
        sleep(Duration::from_millis(1));
        let res = DynamicProgrammingDiffing.compute(&chars(&a), &chars(&b), &timeout);
        assert!(res.hit_timeout);
        assert_eq!(res.diffs, [diff((0, 5), (0, 5))]);
    }
}

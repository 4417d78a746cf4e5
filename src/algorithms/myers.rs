use std::rc::Rc;

use crate::algorithms::DiffAlgorithm;
use crate::range::OffsetRange;
use crate::sequence::{DiffAlgorithmResult, Sequence, SequenceDiff};
use crate::timeout::Timeout;
use crate::util::{timed_out_result, trivial_result};

/// The greedy `O((N+M)D)` forward search described in
/// "An O(ND) Difference Algorithm and its Variations", by Eugene Myers.
///
/// Unlike the linear space divide and conquer variant this only
/// searches forward and remembers every snake it follows, which
/// makes reconstructing the edit script trivial.
#[derive(Debug, Clone, Copy, Default)]
pub struct MyersDiffAlgorithm;

impl DiffAlgorithm for MyersDiffAlgorithm {
    fn compute<S: Sequence + ?Sized>(
        &self,
        seq1: &S,
        seq2: &S,
        timeout: &Timeout,
    ) -> DiffAlgorithmResult {
        if let Some(res) = trivial_result(seq1, seq2) {
            return res;
        }
        let len1 = seq1.len() as isize;
        let len2 = seq2.len() as isize;

        // follows the diagonal starting at (x, y) as long as the elements match
        let snake = |mut x: isize, mut y: isize| {
            while x < len1 && y < len2 && seq1.element(x as usize) == seq2.element(y as usize) {
                x += 1;
                y += 1;
            }
            x
        };

        // furthest reaching x position for every diagonal k = x - y
        let mut v = DiagonalVec::<isize>::default();
        let mut paths = DiagonalVec::<Option<Rc<SnakePath>>>::default();
        let start = snake(0, 0);
        v.set(0, start);
        paths.set(0, (start != 0).then(|| SnakePath::new(None, 0, 0, start)));

        let mut d = 0isize;
        let mut k;
        'outer: loop {
            d += 1;
            if !timeout.is_valid() {
                return timed_out_result(seq1, seq2);
            }
            let lower_bound = -d.min(len2 + d % 2);
            let upper_bound = d.min(len1 + d % 2);
            k = lower_bound;
            while k <= upper_bound {
                let max_x_from_above = if k == upper_bound { -1 } else { v.get(k + 1) };
                let max_x_from_left = if k == lower_bound { -1 } else { v.get(k - 1) + 1 };
                let x = max_x_from_above.max(max_x_from_left).min(len1);
                let y = x - k;
                if x > len1 || y > len2 {
                    k += 2;
                    continue;
                }
                // the point left of the first column is a dead end
                let new_max_x = if y < 0 { x } else { snake(x, y) };
                v.set(k, new_max_x);
                let last_path = if x == max_x_from_above {
                    paths.get(k + 1)
                } else {
                    paths.get(k - 1)
                };
                let path = if new_max_x != x {
                    Some(SnakePath::new(last_path, x, y, new_max_x - x))
                } else {
                    last_path
                };
                paths.set(k, path);

                if new_max_x == len1 && new_max_x - k == len2 {
                    break 'outer;
                }
                k += 2;
            }
        }

        let mut path = paths.get(k);
        let mut diffs = Vec::new();
        let mut last_aligned1 = seq1.len();
        let mut last_aligned2 = seq2.len();
        loop {
            let (end1, end2) = path
                .as_ref()
                .map_or((0, 0), |path| (path.x + path.length, path.y + path.length));
            if end1 != last_aligned1 || end2 != last_aligned2 {
                diffs.push(SequenceDiff::new(
                    OffsetRange::new(end1, last_aligned1),
                    OffsetRange::new(end2, last_aligned2),
                ));
            }
            let Some(current) = path else {
                break;
            };
            last_aligned1 = current.x;
            last_aligned2 = current.y;
            path = current.prev.clone();
        }
        diffs.reverse();

        DiffAlgorithmResult::new(diffs, false)
    }
}

/// A run of matching elements starting at `(x, y)`, linked to the snake before it.
struct SnakePath {
    prev: Option<Rc<SnakePath>>,
    x: usize,
    y: usize,
    length: usize,
}

impl SnakePath {
    fn new(prev: Option<Rc<SnakePath>>, x: isize, y: isize, length: isize) -> Rc<SnakePath> {
        Rc::new(SnakePath {
            prev,
            x: x as usize,
            y: y as usize,
            length: length as usize,
        })
    }
}

/// A growable array indexed by a (possibly negative) diagonal.
/// Unset entries read as `T::default()`.
struct DiagonalVec<T> {
    positive: Vec<T>,
    negative: Vec<T>,
}

impl<T> Default for DiagonalVec<T> {
    fn default() -> Self {
        DiagonalVec {
            positive: Vec::with_capacity(10),
            negative: Vec::with_capacity(10),
        }
    }
}

impl<T: Clone + Default> DiagonalVec<T> {
    fn get(&self, idx: isize) -> T {
        let (arr, idx) = self.slot(idx);
        arr.get(idx).cloned().unwrap_or_default()
    }

    fn set(&mut self, idx: isize, value: T) {
        let (arr, idx) = if idx < 0 {
            (&mut self.negative, (-idx - 1) as usize)
        } else {
            (&mut self.positive, idx as usize)
        };
        if idx >= arr.len() {
            arr.resize(idx + 1, T::default());
        }
        arr[idx] = value;
    }

    fn slot(&self, idx: isize) -> (&Vec<T>, usize) {
        if idx < 0 {
            (&self.negative, (-idx - 1) as usize)
        } else {
            (&self.positive, idx as usize)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread::sleep;
    use std::time::Duration;

    use super::MyersDiffAlgorithm;
    use crate::algorithms::DiffAlgorithm;
    use crate::range::OffsetRange;
    use crate::sequence::{LinesSliceCharSequence, Sequence, SequenceDiff};
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

    fn edit_cost(diffs: &[SequenceDiff]) -> usize {
        diffs
            .iter()
            .map(|diff| diff.seq1_range.len() + diff.seq2_range.len())
            .sum()
    }

    #[test]
    fn simple_edits() {
        let (a, b) = (["abc"], ["abxc"]);
        let res = MyersDiffAlgorithm.compute(&chars(&a), &chars(&b), &Timeout::infinite());
        assert!(!res.hit_timeout);
        assert_eq!(res.diffs, [diff((2, 2), (2, 3))]);

        let (a, b) = (["abcd"], ["xbcy"]);
        let res = MyersDiffAlgorithm.compute(&chars(&a), &chars(&b), &Timeout::infinite());
        assert_eq!(res.diffs, [diff((0, 1), (0, 1)), diff((3, 4), (3, 4))]);

        let (a, b) = (["abc"], ["abcdef"]);
        let res = MyersDiffAlgorithm.compute(&chars(&a), &chars(&b), &Timeout::infinite());
        assert_eq!(res.diffs, [diff((3, 3), (3, 6))]);

        let (a, b) = (["xyzabc"], ["abc"]);
        let res = MyersDiffAlgorithm.compute(&chars(&a), &chars(&b), &Timeout::infinite());
        assert_eq!(res.diffs, [diff((0, 3), (0, 0))]);
    }

    fn lcs_len(a: &str, b: &str) -> usize {
        let (a, b): (Vec<char>, Vec<char>) = (a.chars().collect(), b.chars().collect());
        let mut table = vec![vec![0; b.len() + 1]; a.len() + 1];
        for i in 0..a.len() {
            for j in 0..b.len() {
                table[i + 1][j + 1] = if a[i] == b[j] {
                    table[i][j] + 1
                } else {
                    table[i][j + 1].max(table[i + 1][j])
                };
            }
        }
        table[a.len()][b.len()]
    }

    #[test]
    fn finds_minimal_edit_script() {
        let pairs = [
            ("kitten sitting", "sitting kitten"),
            ("the quick brown fox", "the quack brown box"),
            ("abcabba", "cbabac"),
            ("aaaaaaaa", "a"),
        ];
        for (text1, text2) in pairs {
            let (lines1, lines2) = ([text1], [text2]);
            let (a, b) = (chars(&lines1), chars(&lines2));
            let myers = MyersDiffAlgorithm.compute(&a, &b, &Timeout::infinite());

            // every element outside of a diff is matched
            let mut matched = 0;
            let mut prev_end = (0, 0);
            for diff in &myers.diffs {
                let gap = diff.seq1_range.start - prev_end.0;
                assert_eq!(gap, diff.seq2_range.start - prev_end.1);
                for i in 0..gap {
                    assert_eq!(a.element(prev_end.0 + i), b.element(prev_end.1 + i));
                }
                matched += gap;
                prev_end = (diff.seq1_range.end_exclusive, diff.seq2_range.end_exclusive);
            }
            assert_eq!(a.len() - prev_end.0, b.len() - prev_end.1);
            matched += a.len() - prev_end.0;
            assert_eq!(matched, lcs_len(text1, text2));
            assert_eq!(edit_cost(&myers.diffs) + 2 * matched, a.len() + b.len());
        }
    }

    #[test]
    fn expired_timeout() {
        let (a, b) = (["xabcx"], ["yabdy"]);
        let timeout = Timeout::after(Duration::from_nanos(1));
        sleep(Duration::from_millis(1));
        let res = MyersDiffAlgorithm.compute(&chars(&a), &chars(&b), &timeout);
        assert!(res.hit_timeout);
        assert_eq!(res.diffs, [diff((0, 5), (0, 5))]);
    }
}

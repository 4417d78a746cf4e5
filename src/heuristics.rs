//! Post-processing passes that make raw alignments easier to read.
//!
//! Every pass only moves diff boundaries across equal elements or joins
//! neighboring diffs. The unchanged regions between the diffs therefore
//! always remain equal in both sequences.

use crate::options::Tuning;
use crate::range::{OffsetPair, OffsetRange};
use crate::sequence::{LineSequence, LinesSliceCharSequence, Sequence, SequenceDiff};

/// Joins diffs that can be shifted into each other and then moves every
/// pure insertion or deletion to the position with the best boundary score.
pub fn optimize_sequence_diffs<S: Sequence + ?Sized>(
    seq1: &S,
    seq2: &S,
    diffs: Vec<SequenceDiff>,
    tuning: &Tuning,
) -> Vec<SequenceDiff> {
    let diffs = join_sequence_diffs_by_shifting(seq1, seq2, diffs);
    // a second round catches diffs that only became adjacent during the first
    let mut diffs = join_sequence_diffs_by_shifting(seq1, seq2, diffs);
    shift_sequence_diffs(seq1, seq2, &mut diffs, tuning.max_boundary_shift);
    diffs
}

fn join_sequence_diffs_by_shifting<S: Sequence + ?Sized>(
    seq1: &S,
    seq2: &S,
    diffs: Vec<SequenceDiff>,
) -> Vec<SequenceDiff> {
    if diffs.is_empty() {
        return diffs;
    }

    // first move every insertion/deletion as far left as possible and join it with its predecessor if they meet
    let mut shifted_left: Vec<SequenceDiff> = Vec::with_capacity(diffs.len());
    shifted_left.push(diffs[0]);
    for &diff in &diffs[1..] {
        let prev = shifted_left[shifted_left.len() - 1];
        let mut cur = diff;
        if cur.seq1_range.is_empty() || cur.seq2_range.is_empty() {
            let gap = cur.seq1_range.start - prev.seq1_range.end_exclusive;
            let mut shift = 0;
            while shift < gap
                && seq1.element(cur.seq1_range.start - shift - 1)
                    == seq1.element(cur.seq1_range.end_exclusive - shift - 1)
                && seq2.element(cur.seq2_range.start - shift - 1)
                    == seq2.element(cur.seq2_range.end_exclusive - shift - 1)
            {
                shift += 1;
            }

            if shift == gap {
                let last = shifted_left.len() - 1;
                shifted_left[last] = SequenceDiff::new(
                    OffsetRange::new(prev.seq1_range.start, cur.seq1_range.end_exclusive - gap),
                    OffsetRange::new(prev.seq2_range.start, cur.seq2_range.end_exclusive - gap),
                );
                continue;
            }
            cur = cur.delta(-(shift as isize));
        }
        shifted_left.push(cur);
    }

    // then move them right again and join them with their successor if they meet
    let mut res = Vec::with_capacity(shifted_left.len());
    for i in 0..shifted_left.len() - 1 {
        let next = shifted_left[i + 1];
        let mut cur = shifted_left[i];
        if cur.seq1_range.is_empty() || cur.seq2_range.is_empty() {
            let gap = next.seq1_range.start - cur.seq1_range.end_exclusive;
            let mut shift = 0;
            while shift < gap
                && seq1.is_strongly_equal(
                    cur.seq1_range.start + shift,
                    cur.seq1_range.end_exclusive + shift,
                )
                && seq2.is_strongly_equal(
                    cur.seq2_range.start + shift,
                    cur.seq2_range.end_exclusive + shift,
                )
            {
                shift += 1;
            }

            if shift == gap {
                shifted_left[i + 1] = SequenceDiff::new(
                    OffsetRange::new(cur.seq1_range.start + gap, next.seq1_range.end_exclusive),
                    OffsetRange::new(cur.seq2_range.start + gap, next.seq2_range.end_exclusive),
                );
                continue;
            }
            cur = cur.delta(shift as isize);
        }
        res.push(cur);
    }
    res.push(shifted_left[shifted_left.len() - 1]);
    res
}

fn shift_sequence_diffs<S: Sequence + ?Sized>(
    seq1: &S,
    seq2: &S,
    diffs: &mut [SequenceDiff],
    max_shift: usize,
) {
    for i in 0..diffs.len() {
        let diff = diffs[i];
        if !diff.seq1_range.is_empty() && !diff.seq2_range.is_empty() {
            continue;
        }
        // keep at least one unchanged element between this diff and its neighbors
        let (seq1_valid, seq2_valid) = if i == 0 {
            (0, 0)
        } else {
            (
                diffs[i - 1].seq1_range.end_exclusive + 1,
                diffs[i - 1].seq2_range.end_exclusive + 1,
            )
        };
        let (seq1_valid_end, seq2_valid_end) = match diffs.get(i + 1) {
            Some(next) => (
                next.seq1_range.start.saturating_sub(1),
                next.seq2_range.start.saturating_sub(1),
            ),
            None => (seq1.len(), seq2.len()),
        };
        let (Some(seq1_valid), Some(seq2_valid)) = (
            OffsetRange::try_new(seq1_valid, seq1_valid_end),
            OffsetRange::try_new(seq2_valid, seq2_valid_end),
        ) else {
            continue;
        };

        diffs[i] = if diff.seq1_range.is_empty() {
            shift_diff_to_better_position(diff, seq1, seq2, seq1_valid, seq2_valid, max_shift)
        } else {
            shift_diff_to_better_position(
                diff.swap(),
                seq2,
                seq1,
                seq2_valid,
                seq1_valid,
                max_shift,
            )
            .swap()
        };
    }
}

/// Shifts an insertion (`diff.seq1_range` is empty) across equal
/// elements to the position with the highest boundary score.
fn shift_diff_to_better_position<S: Sequence + ?Sized>(
    diff: SequenceDiff,
    seq1: &S,
    seq2: &S,
    seq1_valid: OffsetRange,
    seq2_valid: OffsetRange,
    max_shift: usize,
) -> SequenceDiff {
    let mut delta_before = 0;
    while delta_before + 1 < max_shift
        && diff.seq1_range.start > seq1_valid.start + delta_before
        && diff.seq2_range.start > seq2_valid.start + delta_before
        && seq2.is_strongly_equal(
            diff.seq2_range.start - delta_before - 1,
            diff.seq2_range.end_exclusive - delta_before - 1,
        )
    {
        delta_before += 1;
    }

    let mut delta_after = 0;
    while delta_after + 1 < max_shift
        && diff.seq1_range.start + delta_after < seq1_valid.end_exclusive
        && diff.seq2_range.end_exclusive + delta_after < seq2_valid.end_exclusive
        && seq2.is_strongly_equal(
            diff.seq2_range.start + delta_after,
            diff.seq2_range.end_exclusive + delta_after,
        )
    {
        delta_after += 1;
    }

    if delta_before == 0 && delta_after == 0 {
        return diff;
    }

    let mut best_delta = 0;
    let mut best_score = -1;
    for delta in -(delta_before as isize)..=delta_after as isize {
        let shifted = diff.delta(delta);
        let score = seq1.boundary_score(shifted.seq1_range.start)
            + seq2.boundary_score(shifted.seq2_range.start)
            + seq2.boundary_score(shifted.seq2_range.end_exclusive);
        if score > best_score {
            best_score = score;
            best_delta = delta;
        }
    }
    diff.delta(best_delta)
}

/// Joins line diffs that are only separated by lines with almost no content,
/// if one of the two diffs is large.
pub fn remove_very_short_matching_lines_between_diffs(
    seq1: &LineSequence<'_>,
    diffs: Vec<SequenceDiff>,
    tuning: &Tuning,
) -> Vec<SequenceDiff> {
    let is_large =
        |diff: &SequenceDiff| diff.seq1_range.len() + diff.seq2_range.len() > tuning.short_lines_min_diff_size;
    join_repeatedly(diffs, tuning.max_join_iterations, |before, after| {
        let unchanged = OffsetRange::new(before.seq1_range.end_exclusive, after.seq1_range.start);
        let content = seq1
            .text(unchanged)
            .chars()
            .filter(|c| !c.is_whitespace())
            .count();
        content <= tuning.short_lines_max_chars && (is_large(before) || is_large(after))
    })
}

/// Extends diffs that start or end inside a word to the entire word if most
/// of the word is changed anyway.
pub fn extend_diffs_to_entire_word(
    seq1: &LinesSliceCharSequence<'_>,
    seq2: &LinesSliceCharSequence<'_>,
    diffs: Vec<SequenceDiff>,
) -> Vec<SequenceDiff> {
    let mut word_diffs = Vec::new();
    let mut candidate: Option<WordCandidate> = None;

    for diff in &diffs {
        let before1 = diff
            .seq1_range
            .start
            .checked_sub(1)
            .and_then(|offset| seq1.find_word_containing(offset));
        let before2 = diff
            .seq2_range
            .start
            .checked_sub(1)
            .and_then(|offset| seq2.find_word_containing(offset));
        let after1 = seq1.find_word_containing(diff.seq1_range.end_exclusive);
        let after2 = seq2.find_word_containing(diff.seq2_range.end_exclusive);

        match (before1, before2, after1, after2) {
            (Some(before1), Some(before2), Some(after1), Some(after2))
                if before1 == after1 && before2 == after2 =>
            {
                scan_word(&mut candidate, &mut word_diffs, diff, before1, before2);
            }
            _ => {
                if let (Some(word1), Some(word2)) = (before1, before2) {
                    scan_word(&mut candidate, &mut word_diffs, diff, word1, word2);
                }
                if let (Some(word1), Some(word2)) = (after1, after2) {
                    scan_word(&mut candidate, &mut word_diffs, diff, word1, word2);
                }
            }
        }
    }
    if let Some(candidate) = candidate {
        candidate.flush(&mut word_diffs);
    }

    merge_sequence_diffs(diffs, word_diffs)
}

/// A pair of (joined) words touched by one or more diffs.
struct WordCandidate {
    seq1_range: OffsetRange,
    seq2_range: OffsetRange,
    deleted: usize,
    added: usize,
    count: usize,
}

impl WordCandidate {
    fn new(seq1_range: OffsetRange, seq2_range: OffsetRange) -> WordCandidate {
        WordCandidate {
            seq1_range,
            seq2_range,
            deleted: 0,
            added: 0,
            count: 0,
        }
    }

    /// Emits the words as a diff if the changes inside them outweigh what they have in common.
    fn flush(self, word_diffs: &mut Vec<SequenceDiff>) {
        let unchanged = self.seq1_range.len() as isize - self.deleted as isize;
        let changed = self.deleted.max(self.added) as isize + (self.count as isize - 1);
        if changed > unchanged {
            word_diffs.push(SequenceDiff::new(self.seq1_range, self.seq2_range));
        }
    }
}

fn scan_word(
    candidate: &mut Option<WordCandidate>,
    word_diffs: &mut Vec<SequenceDiff>,
    diff: &SequenceDiff,
    word1: OffsetRange,
    word2: OffsetRange,
) {
    let covered = candidate.as_ref().map_or(false, |candidate| {
        candidate.seq1_range.contains_range(word1) && candidate.seq2_range.contains_range(word2)
    });
    if !covered {
        match candidate {
            Some(current)
                if !(current.seq1_range.end_exclusive < word1.start
                    && current.seq2_range.end_exclusive < word2.start) =>
            {
                current.deleted +=
                    OffsetRange::try_new(current.seq1_range.end_exclusive, word1.start)
                        .map_or(0, |gap| gap.len());
                current.added +=
                    OffsetRange::try_new(current.seq2_range.end_exclusive, word2.start)
                        .map_or(0, |gap| gap.len());
                current.seq1_range = current.seq1_range.join(word1);
                current.seq2_range = current.seq2_range.join(word2);
            }
            _ => {
                if let Some(finished) = candidate.replace(WordCandidate::new(word1, word2)) {
                    finished.flush(word_diffs);
                }
            }
        }
    }

    if let Some(current) = candidate {
        current.count += 1;
        current.deleted += word1.intersect(diff.seq1_range).map_or(0, |range| range.len());
        current.added += word2.intersect(diff.seq2_range).map_or(0, |range| range.len());
    }
}

/// Merges two sorted lists of diffs, joining diffs that overlap or touch.
fn merge_sequence_diffs(
    diffs1: Vec<SequenceDiff>,
    diffs2: Vec<SequenceDiff>,
) -> Vec<SequenceDiff> {
    let mut res: Vec<SequenceDiff> = Vec::with_capacity(diffs1.len() + diffs2.len());
    let mut diffs1 = diffs1.into_iter().peekable();
    let mut diffs2 = diffs2.into_iter().peekable();
    loop {
        let next = match (diffs1.peek(), diffs2.peek()) {
            (Some(diff1), Some(diff2)) if diff1.seq1_range.start < diff2.seq1_range.start => {
                diffs1.next()
            }
            (Some(_), None) => diffs1.next(),
            _ => diffs2.next(),
        };
        let Some(next) = next else {
            break;
        };
        match res.last_mut() {
            Some(last)
                if last.seq1_range.intersects_or_touches(next.seq1_range)
                    || last.seq2_range.intersects_or_touches(next.seq2_range) =>
            {
                *last = last.join(next);
            }
            _ => res.push(next),
        }
    }
    res
}

/// Joins character diffs that are separated by very few unchanged characters.
pub fn remove_short_matches(diffs: Vec<SequenceDiff>, tuning: &Tuning) -> Vec<SequenceDiff> {
    let mut res: Vec<SequenceDiff> = Vec::with_capacity(diffs.len());
    for diff in diffs {
        match res.last_mut() {
            Some(last)
                if diff.seq1_range.start.saturating_sub(last.seq1_range.end_exclusive)
                    <= tuning.short_match_gap
                    || diff.seq2_range.start.saturating_sub(last.seq2_range.end_exclusive)
                        <= tuning.short_match_gap =>
            {
                *last = last.join(diff);
            }
            _ => res.push(diff),
        }
    }
    res
}

/// Joins two long character diffs if the unchanged text between them is short
/// and does not span a line break. Afterwards large diffs are extended to
/// entire lines if only a few non-whitespace characters of those lines are left.
pub fn remove_very_short_matching_text_between_long_diffs(
    seq1: &LinesSliceCharSequence<'_>,
    seq2: &LinesSliceCharSequence<'_>,
    diffs: Vec<SequenceDiff>,
    tuning: &Tuning,
) -> Vec<SequenceDiff> {
    let weight = |lines: usize, len: usize| {
        (lines as f64 * tuning.short_text_line_weight + len as f64)
            .min(tuning.short_text_max_weight)
            .powf(1.5)
    };
    let diff_weight = |diff: &SequenceDiff| {
        (weight(seq1.count_lines_in(diff.seq1_range), diff.seq1_range.len())
            + weight(seq2.count_lines_in(diff.seq2_range), diff.seq2_range.len()))
        .powf(1.5)
    };
    let threshold = tuning.short_text_max_weight.powf(1.5).powf(1.5) * tuning.short_text_factor;

    let diffs = join_repeatedly(diffs, tuning.max_join_iterations, |before, after| {
        let unchanged = OffsetRange::new(before.seq1_range.end_exclusive, after.seq1_range.start);
        if seq1.count_lines_in(unchanged) > tuning.short_text_max_lines
            || unchanged.len() > tuning.short_text_max_chars
        {
            return false;
        }
        let text = seq1.text(unchanged);
        let trimmed = text.trim();
        if trimmed.chars().count() > tuning.short_text_max_trimmed_chars
            || trimmed.contains(['\r', '\n'])
        {
            return false;
        }
        diff_weight(before) + diff_weight(after) > threshold
    });

    // large diffs also swallow what little is left of their first and last line
    let should_extend = |text: &str, diff: &SequenceDiff| {
        !text.is_empty()
            && text.trim().chars().count() <= tuning.line_remainder_max_chars
            && diff.seq1_range.len() + diff.seq2_range.len() > tuning.line_remainder_min_diff_size
    };
    let mut res: Vec<SequenceDiff> = Vec::with_capacity(diffs.len());
    for (i, &diff) in diffs.iter().enumerate() {
        let mut extended = diff;
        let full_lines = seq1.extend_to_full_lines(diff.seq1_range);
        let prefix = seq1.text(OffsetRange::new(full_lines.start, diff.seq1_range.start));
        if should_extend(&prefix, &diff) {
            // the equal text before `diff` can be shorter in `seq2`, the clamp below fixes that up
            let len = prefix.chars().count().min(diff.seq2_range.start);
            extended = extended.delta_start(-(len as isize));
        }
        let suffix = seq1.text(OffsetRange::new(diff.seq1_range.end_exclusive, full_lines.end_exclusive));
        if should_extend(&suffix, &diff) {
            extended = extended.delta_end(suffix.chars().count() as isize);
        }

        let available = SequenceDiff::from_offset_pairs(
            i.checked_sub(1).map_or(OffsetPair::ZERO, |prev| diffs[prev].end_exclusives()),
            diffs.get(i + 1).map_or(OffsetPair::MAX, SequenceDiff::starts),
        );
        let Some(clamped) = extended.intersect(available) else {
            res.push(diff);
            continue;
        };
        match res.last_mut() {
            Some(last) if last.end_exclusives() == clamped.starts() => *last = last.join(clamped),
            _ => res.push(clamped),
        }
    }
    res
}

/// Joins neighboring diffs for which `should_join` holds until
/// a fixpoint (or the iteration limit) is reached.
fn join_repeatedly(
    mut diffs: Vec<SequenceDiff>,
    max_iterations: usize,
    should_join: impl Fn(&SequenceDiff, &SequenceDiff) -> bool,
) -> Vec<SequenceDiff> {
    if diffs.is_empty() {
        return diffs;
    }
    let mut iterations = 0;
    loop {
        let mut joined_any = false;
        let mut res: Vec<SequenceDiff> = Vec::with_capacity(diffs.len());
        for diff in diffs {
            match res.last_mut() {
                Some(last) if should_join(last, &diff) => {
                    *last = last.join(diff);
                    joined_any = true;
                }
                _ => res.push(diff),
            }
        }
        diffs = res;
        iterations += 1;
        if !joined_any || iterations > max_iterations {
            return diffs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        extend_diffs_to_entire_word, optimize_sequence_diffs, remove_short_matches,
        remove_very_short_matching_lines_between_diffs,
        remove_very_short_matching_text_between_long_diffs,
    };
    use crate::intern::Interner;
    use crate::options::Tuning;
    use crate::range::OffsetRange;
    use crate::sequence::{LineSequence, LinesSliceCharSequence, SequenceDiff};

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
    fn insertions_are_joined_by_shifting() {
        let (a, b) = (["ab"], ["aabb"]);
        let diffs = vec![diff((0, 0), (0, 1)), diff((1, 1), (2, 3))];
        let res = optimize_sequence_diffs(&chars(&a), &chars(&b), diffs, &Tuning::default());
        assert_eq!(res, [diff((1, 1), (1, 3))]);
    }

    #[test]
    fn insertions_move_to_weakly_indented_boundaries() {
        let before = ["if a {", "    b();", "}"];
        let after = ["if a {", "    b();", "}", "if a {", "    b();", "}"];
        let mut interner = Interner::new(8);
        let seq1 = LineSequence::new(interner.intern_trimmed_lines(&before), &before);
        let seq2 = LineSequence::new(interner.intern_trimmed_lines(&after), &after);
        let res =
            optimize_sequence_diffs(&seq1, &seq2, vec![diff((2, 2), (2, 5))], &Tuning::default());
        assert_eq!(res, [diff((0, 0), (0, 3))]);

        let tuning = Tuning {
            max_boundary_shift: 2,
            ..Tuning::default()
        };
        let res = optimize_sequence_diffs(&seq1, &seq2, vec![diff((2, 2), (2, 5))], &tuning);
        assert_eq!(res, [diff((3, 3), (3, 6))]);
    }

    #[test]
    fn short_matches_are_removed() {
        let diffs = vec![
            diff((0, 1), (0, 1)),
            diff((3, 4), (3, 4)),
            diff((7, 8), (7, 9)),
        ];
        let res = remove_short_matches(diffs, &Tuning::default());
        assert_eq!(res, [diff((0, 4), (0, 4)), diff((7, 8), (7, 9))]);
    }

    #[test]
    fn mostly_changed_words_are_replaced_entirely() {
        let (a, b) = (["foo bar"], ["fxx bar"]);
        let res = extend_diffs_to_entire_word(&chars(&a), &chars(&b), vec![diff((1, 3), (1, 3))]);
        assert_eq!(res, [diff((0, 3), (0, 3))]);

        let (a, b) = (["hello world"], ["hallo world"]);
        let res = extend_diffs_to_entire_word(&chars(&a), &chars(&b), vec![diff((1, 2), (1, 2))]);
        assert_eq!(res, [diff((1, 2), (1, 2))]);
    }

    #[test]
    fn almost_empty_lines_between_large_diffs_are_absorbed() {
        let before = ["a", "b", "c", "}", "d", "e", "f"];
        let after = ["x", "y", "z", "}", "u", "v", "w"];
        let mut interner = Interner::new(16);
        let seq1 = LineSequence::new(interner.intern_trimmed_lines(&before), &before);
        let _seq2 = LineSequence::new(interner.intern_trimmed_lines(&after), &after);

        let diffs = vec![diff((0, 3), (0, 3)), diff((4, 7), (4, 7))];
        let res = remove_very_short_matching_lines_between_diffs(&seq1, diffs, &Tuning::default());
        assert_eq!(res, [diff((0, 7), (0, 7))]);

        let diffs = vec![diff((0, 1), (0, 1)), diff((4, 5), (4, 5))];
        let res = remove_very_short_matching_lines_between_diffs(&seq1, diffs.clone(), &Tuning::default());
        assert_eq!(res, diffs);
    }

    #[test]
    fn long_diffs_swallow_the_rest_of_their_lines() {
        let (before, after) = (format!("a = {}", "x".repeat(60)), format!("a = {}", "y".repeat(60)));
        let (before, after) = ([before.as_str(), "end"], [after.as_str(), "end"]);
        let seq1 = LinesSliceCharSequence::new(&before, OffsetRange::new(0, 2), true);
        let seq2 = LinesSliceCharSequence::new(&after, OffsetRange::new(0, 2), true);
        let res = remove_very_short_matching_text_between_long_diffs(
            &seq1,
            &seq2,
            vec![diff((4, 64), (4, 64))],
            &Tuning::default(),
        );
        assert_eq!(res, [diff((0, 65), (0, 65))]);

        // short diffs stay as they are
        let res = remove_very_short_matching_text_between_long_diffs(
            &seq1,
            &seq2,
            vec![diff((4, 5), (4, 5))],
            &Tuning::default(),
        );
        assert_eq!(res, [diff((4, 5), (4, 5))]);
    }

    #[test]
    fn extended_diffs_stop_at_their_neighbors() {
        let (before, after) = (format!("b = {}", "x".repeat(60)), format!("c = {}", "y".repeat(60)));
        let (before, after) = ([before.as_str(), "end"], [after.as_str(), "end"]);
        let seq1 = LinesSliceCharSequence::new(&before, OffsetRange::new(0, 2), true);
        let seq2 = LinesSliceCharSequence::new(&after, OffsetRange::new(0, 2), true);
        let res = remove_very_short_matching_text_between_long_diffs(
            &seq1,
            &seq2,
            vec![diff((0, 1), (0, 1)), diff((4, 64), (4, 64))],
            &Tuning::default(),
        );
        // clamped to the end of the first diff, which it then touches
        assert_eq!(res, [diff((0, 65), (0, 65))]);
    }
}

//! Detection of blocks of lines that were moved instead of deleted and re-inserted.

use std::cmp::Reverse;

use ahash::RandomState;
use hashbrown::HashMap;

use crate::intern::Token;
use crate::mapping::{DetailedLineRangeMapping, LineRangeMapping};
use crate::options::MoveTuning;
use crate::position::LineRange;
use crate::sequence::LineSequence;
use crate::timeout::Timeout;

/// Finds the blocks of lines that were moved between the `changes`.
///
/// Pure deletions are first paired with similar pure insertions. The remaining
/// changes are then searched for runs of identical lines that one change removes
/// and another one adds. Every line is part of at most one move and the returned
/// mappings are sorted by their original line.
pub(crate) fn compute_moved_lines(
    changes: &[DetailedLineRangeMapping],
    original: &LineSequence<'_>,
    modified: &LineSequence<'_>,
    timeout: &Timeout,
    tuning: &MoveTuning,
) -> Vec<LineRangeMapping> {
    let (mut moves, paired) =
        moves_between_deletions_and_insertions(changes, original.lines(), modified.lines(), timeout, tuning);
    if timeout.is_valid() {
        let remaining: Vec<_> = changes
            .iter()
            .zip(&paired)
            .filter(|(_, is_paired)| !**is_paired)
            .map(|(change, _)| change.line_range_mapping())
            .collect();
        let matching = moves_of_matching_lines(&remaining, original, modified, timeout, tuning);
        moves.extend(
            matching
                .into_iter()
                .filter(|mapping| has_enough_content(mapping.original, original.lines(), tuning))
                .filter(|mapping| !is_within_one_change(changes, mapping)),
        );
    }
    moves.sort_by_key(|mapping| mapping.original.start);
    moves
}

/// Pairs pure deletions with pure insertions of (almost) the same lines.
///
/// Deletions are considered longest first and each one is paired with the most
/// similar insertion that is still available. Returns the moves and which of the
/// `changes` ended up in one.
fn moves_between_deletions_and_insertions(
    changes: &[DetailedLineRangeMapping],
    original: &[&str],
    modified: &[&str],
    timeout: &Timeout,
    tuning: &MoveTuning,
) -> (Vec<LineRangeMapping>, Vec<bool>) {
    let min_lines = tuning.min_lines.max(1);
    let mut deletions: Vec<_> = changes
        .iter()
        .enumerate()
        .filter(|(_, change)| change.modified.is_empty() && change.original.len() >= min_lines)
        .filter_map(|(i, change)| Some((i, LineBlock::new(change.original, original)?)))
        .collect();
    let mut insertions: Vec<_> = changes
        .iter()
        .enumerate()
        .filter(|(_, change)| change.original.is_empty() && change.modified.len() >= min_lines)
        .filter_map(|(i, change)| Some((i, LineBlock::new(change.modified, modified)?)))
        .collect();
    deletions.sort_by_key(|(_, block)| Reverse(block.range.len()));

    let mut moves = Vec::new();
    let mut paired = vec![false; changes.len()];
    for (deletion_idx, deletion) in &deletions {
        if insertions.is_empty() || !timeout.is_valid() {
            break;
        }
        let mut best: Option<(usize, f64)> = None;
        for (i, (_, insertion)) in insertions.iter().enumerate() {
            let similarity = deletion.similarity(insertion);
            let is_better = match best {
                None => true,
                Some((best_idx, best_similarity)) => {
                    similarity > best_similarity
                        || (similarity == best_similarity
                            && insertion.range.len() > insertions[best_idx].1.range.len())
                }
            };
            if is_better {
                best = Some((i, similarity));
            }
        }

        if let Some((idx, similarity)) = best {
            if similarity > tuning.similarity_threshold {
                let (insertion_idx, insertion) = insertions.remove(idx);
                tracing::trace!(
                    original = %deletion.range,
                    modified = %insertion.range,
                    similarity,
                    "detected moved lines"
                );
                paired[*deletion_idx] = true;
                paired[insertion_idx] = true;
                moves.push(LineRangeMapping::new(deletion.range, insertion.range));
            }
        }
    }
    (moves, paired)
}

/// Finds runs of identical (trimmed) lines inside the original side of one change
/// and the modified side of another.
///
/// Runs start out as windows of `min_matching_lines` lines and grow while the
/// following lines keep matching. Longer runs are preferred, and a run loses the
/// lines that a longer one already took.
fn moves_of_matching_lines(
    changes: &[LineRangeMapping],
    original: &LineSequence<'_>,
    modified: &LineSequence<'_>,
    timeout: &Timeout,
    tuning: &MoveTuning,
) -> Vec<LineRangeMapping> {
    let window = tuning.min_matching_lines.max(1);
    let (original_tokens, modified_tokens) = (original.tokens(), modified.tokens());

    let mut original_windows: HashMap<&[Token], Vec<usize>, RandomState> =
        HashMap::with_hasher(RandomState::new());
    for change in changes {
        for line in change.original.start..(change.original.end_exclusive + 1).saturating_sub(window) {
            original_windows
                .entry(window_at(original_tokens, line, window))
                .or_default()
                .push(line);
        }
    }

    let mut candidates: Vec<LineRangeMapping> = Vec::new();
    let mut by_modified_start: Vec<_> = changes.iter().collect();
    by_modified_start.sort_by_key(|change| change.modified.start);
    for change in by_modified_start {
        // indices of the candidates that ended on the previous line
        let mut growing: Vec<usize> = Vec::new();
        for line in change.modified.start..(change.modified.end_exclusive + 1).saturating_sub(window) {
            let mut next = Vec::new();
            let starts = original_windows
                .get(&window_at(modified_tokens, line, window))
                .map_or(&[][..], Vec::as_slice);
            for &original_start in starts {
                let original_end = original_start + window;
                let modified_end = line + window;
                let extended = growing.iter().copied().find(|&idx| {
                    candidates[idx].original.end_exclusive + 1 == original_end
                        && candidates[idx].modified.end_exclusive + 1 == modified_end
                });
                match extended {
                    Some(idx) => {
                        candidates[idx].original.end_exclusive = original_end;
                        candidates[idx].modified.end_exclusive = modified_end;
                        next.push(idx);
                    }
                    None => {
                        candidates.push(LineRangeMapping::new(
                            LineRange::new(original_start, original_end),
                            LineRange::new(line, modified_end),
                        ));
                        next.push(candidates.len() - 1);
                    }
                }
            }
            growing = next;
        }
        if !timeout.is_valid() {
            return Vec::new();
        }
    }

    candidates.sort_by_key(|candidate| Reverse(candidate.modified.len()));
    let mut original_used = vec![false; original_tokens.len() + 1];
    let mut modified_used = vec![false; modified_tokens.len() + 1];
    let mut moves = Vec::new();
    for candidate in candidates {
        let len = candidate.original.len();
        let mut run_start = None;
        for offset in 0..=len {
            let free = offset < len
                && !original_used[candidate.original.start + offset]
                && !modified_used[candidate.modified.start + offset];
            match (free, run_start) {
                (true, None) => run_start = Some(offset),
                (false, Some(start)) => {
                    run_start = None;
                    if offset - start < window {
                        continue;
                    }
                    let mapping = LineRangeMapping::new(
                        LineRange::new(candidate.original.start + start, candidate.original.start + offset),
                        LineRange::new(candidate.modified.start + start, candidate.modified.start + offset),
                    );
                    for line in mapping.original.start..mapping.original.end_exclusive {
                        original_used[line] = true;
                    }
                    for line in mapping.modified.start..mapping.modified.end_exclusive {
                        modified_used[line] = true;
                    }
                    tracing::trace!(
                        original = %mapping.original,
                        modified = %mapping.modified,
                        "detected moved matching lines"
                    );
                    moves.push(mapping);
                }
                _ => (),
            }
        }
    }
    moves
}

/// The tokens of the `len` lines starting at the 1-based `line`.
fn window_at(tokens: &[Token], line: usize, len: usize) -> &[Token] {
    &tokens[line - 1..line - 1 + len]
}

/// Runs of braces and blank lines match everywhere, so a moved run needs some content.
fn has_enough_content(range: LineRange, document: &[&str], tuning: &MoveTuning) -> bool {
    let offsets = range.to_offset_range();
    let lines = &document[offsets.start..offsets.end_exclusive];
    let chars: usize = lines.iter().map(|line| line.trim().chars().count()).sum();
    let separators = lines.len().saturating_sub(1);
    let substantial_lines = lines
        .iter()
        .filter(|line| line.trim().chars().count() >= 2)
        .count();
    chars + separators >= tuning.min_matching_chars && substantial_lines >= 2
}

/// Whether both sides of `mapping` fall into the same change, which makes
/// it a part of that change rather than a move.
fn is_within_one_change(changes: &[DetailedLineRangeMapping], mapping: &LineRangeMapping) -> bool {
    let original_idx =
        changes.partition_point(|change| change.original.start < mapping.original.end_exclusive);
    let modified_idx =
        changes.partition_point(|change| change.modified.start < mapping.modified.end_exclusive);
    original_idx == modified_idx
}

/// The lines of a deleted or inserted block together with a character histogram.
struct LineBlock<'a> {
    range: LineRange,
    lines: &'a [&'a str],
    histogram: HashMap<char, u32, RandomState>,
    /// Number of chars in the block, counting one line break per line.
    total: u32,
}

impl<'a> LineBlock<'a> {
    /// Returns `None` for blocks without any non-whitespace content.
    fn new(range: LineRange, document: &'a [&'a str]) -> Option<LineBlock<'a>> {
        let offsets = range.to_offset_range();
        let lines = &document[offsets.start..offsets.end_exclusive];
        if lines.iter().all(|line| line.trim().is_empty()) {
            return None;
        }
        let mut histogram = HashMap::with_hasher(RandomState::new());
        let mut total = 0;
        for line in lines {
            for c in line.chars().chain(Some('\n')) {
                *histogram.entry(c).or_insert(0) += 1;
                total += 1;
            }
        }
        Some(LineBlock {
            range,
            lines,
            histogram,
            total,
        })
    }

    /// A value in `[0, 1]`, `1` meaning that both blocks contain the same characters.
    fn similarity(&self, other: &LineBlock<'_>) -> f64 {
        if self.lines == other.lines {
            return 1.0;
        }
        let mut difference = 0;
        for (c, &count) in &self.histogram {
            difference += count.abs_diff(other.histogram.get(c).copied().unwrap_or(0));
        }
        for (c, &count) in &other.histogram {
            if !self.histogram.contains_key(c) {
                difference += count;
            }
        }
        1.0 - difference as f64 / (self.total + other.total) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::{compute_moved_lines, LineBlock};
    use crate::intern::Interner;
    use crate::mapping::{DetailedLineRangeMapping, LineRangeMapping};
    use crate::options::MoveTuning;
    use crate::position::LineRange;
    use crate::sequence::LineSequence;
    use crate::timeout::Timeout;

    fn change(original: (usize, usize), modified: (usize, usize)) -> DetailedLineRangeMapping {
        DetailedLineRangeMapping::new(
            LineRange::new(original.0, original.1),
            LineRange::new(modified.0, modified.1),
            Vec::new(),
        )
    }

    fn moves(
        original: &[&'static str],
        modified: &[&'static str],
        changes: &[DetailedLineRangeMapping],
    ) -> Vec<LineRangeMapping> {
        let mut interner = Interner::new(original.len() + modified.len());
        let seq1 = LineSequence::new(interner.intern_trimmed_lines(original), original);
        let seq2 = LineSequence::new(interner.intern_trimmed_lines(modified), modified);
        compute_moved_lines(changes, &seq1, &seq2, &Timeout::infinite(), &MoveTuning::default())
    }

    fn mapping(original: (usize, usize), modified: (usize, usize)) -> LineRangeMapping {
        LineRangeMapping::new(
            LineRange::new(original.0, original.1),
            LineRange::new(modified.0, modified.1),
        )
    }

    #[test]
    fn similarity() {
        let doc = ["abc", "abd", "abc"];
        let block = |line| LineBlock::new(LineRange::of_length(line, 1), &doc).unwrap();
        assert_eq!(block(1).similarity(&block(3)), 1.0);
        assert_eq!(block(1).similarity(&block(2)), 0.75);
        let blank = ["", "  "];
        assert!(LineBlock::new(LineRange::new(1, 3), &blank).is_none());
    }

    #[test]
    fn pairs_most_similar_blocks() {
        let original = ["fn foo() {", "    bar();", "}", "x", "let a = 1;"];
        let modified = ["x", "fn foo() {", "    bar();", "}", "let b = 2;"];
        let changes = [
            change((1, 4), (1, 1)),
            change((5, 6), (5, 6)),
            change((5, 5), (2, 5)),
        ];
        assert_eq!(moves(&original, &modified, &changes), [mapping((1, 4), (2, 5))]);
    }

    #[test]
    fn dissimilar_blocks_are_not_moves() {
        let original = ["alpha", "x"];
        let modified = ["x", "omega"];
        let changes = [change((1, 2), (1, 1)), change((3, 3), (2, 3))];
        assert!(moves(&original, &modified, &changes).is_empty());
    }

    #[test]
    fn finds_matching_runs_inside_modifications() {
        let original = ["fn alpha() {", "    beta();", "}", "keep", "let x = 1;"];
        let modified = ["// header", "keep", "let y = 2;", "fn alpha() {", "  beta();", "}"];
        let changes = [change((1, 4), (1, 2)), change((5, 6), (3, 7))];
        assert_eq!(moves(&original, &modified, &changes), [mapping((1, 4), (4, 7))]);
    }

    #[test]
    fn matching_runs_need_content() {
        let original = ["}", "}", "}", "keep", "x"];
        let modified = ["y", "keep", "z", "}", "}", "}"];
        let changes = [change((1, 4), (1, 2)), change((5, 6), (3, 7))];
        assert!(moves(&original, &modified, &changes).is_empty());
    }

    #[test]
    fn runs_inside_one_change_are_not_moves() {
        let original = ["a1", "fn alpha() {", "    beta();", "}"];
        let modified = ["fn alpha() {", "    beta();", "}", "b1"];
        let changes = [change((1, 5), (1, 5))];
        assert!(moves(&original, &modified, &changes).is_empty());
    }

    #[test]
    fn longer_runs_claim_lines_first() {
        let original = ["let a = 1;", "let b = 2;", "let c = 3;", "let d = 4;", "keep", "x"];
        let modified = [
            "y",
            "keep",
            "let b = 2;",
            "let c = 3;",
            "let d = 4;",
            "z",
            "let a = 1;",
            "let b = 2;",
            "let c = 3;",
            "let d = 4;",
        ];
        let changes = [change((1, 5), (1, 2)), change((6, 7), (3, 11))];
        assert_eq!(moves(&original, &modified, &changes), [mapping((1, 5), (7, 11))]);
    }
}

use crate::algorithms::{DiffAlgorithm, DynamicProgrammingDiffing, MyersDiffAlgorithm};
use crate::heuristics::{
    extend_diffs_to_entire_word, optimize_sequence_diffs, remove_short_matches,
    remove_very_short_matching_lines_between_diffs,
    remove_very_short_matching_text_between_long_diffs,
};
use crate::intern::Interner;
use crate::mapping::{DetailedLineRangeMapping, LinesDiff, MovedText, RangeMapping};
use crate::moves::compute_moved_lines;
use crate::options::{DiffOptions, Tuning};
use crate::position::{LineRange, Position, TextRange};
use crate::range::OffsetRange;
use crate::sequence::{LineSequence, LinesSliceCharSequence, Sequence, SequenceDiff};
use crate::timeout::Timeout;
use crate::LinesDiffComputer;

/// Documents without lines are treated like a document with a single empty line.
const EMPTY_DOCUMENT: &[&str] = &[""];

/// The two level diff used by the VS Code diff editor.
///
/// Lines are aligned first (comparing trimmed lines). Every changed region is then
/// refined by a character level diff, which is translated back into line/column
/// ranges and regrouped into hunks.
#[derive(Debug, Clone, Default)]
pub struct DefaultLinesDiffComputer {
    tuning: Tuning,
}

/// The character level changes of one line level diff.
struct RefinedDiff {
    mappings: Vec<RangeMapping>,
    hit_timeout: bool,
}

impl DefaultLinesDiffComputer {
    pub fn new() -> DefaultLinesDiffComputer {
        DefaultLinesDiffComputer::default()
    }

    pub fn with_tuning(tuning: Tuning) -> DefaultLinesDiffComputer {
        DefaultLinesDiffComputer { tuning }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    fn compute_line_alignment(
        &self,
        seq1: &LineSequence<'_>,
        seq2: &LineSequence<'_>,
        timeout: &Timeout,
    ) -> (Vec<SequenceDiff>, bool) {
        let (original, modified) = (seq1.lines(), seq2.lines());
        let res = if seq1.len() + seq2.len() < self.tuning.dp_line_threshold {
            // prefer aligning long, identical lines
            let score = |i: usize, j: usize| {
                if original[i] != modified[j] {
                    self.tuning.whitespace_line_score
                } else if modified[j].is_empty() {
                    self.tuning.empty_line_score
                } else {
                    1.0 + (1.0 + modified[j].chars().count() as f64).ln()
                }
            };
            DynamicProgrammingDiffing.compute_with_score(seq1, seq2, timeout, Some(&score))
        } else {
            MyersDiffAlgorithm.compute(seq1, seq2, timeout)
        };

        let diffs = optimize_sequence_diffs(seq1, seq2, res.diffs, &self.tuning);
        let diffs = remove_very_short_matching_lines_between_diffs(seq1, diffs, &self.tuning);
        (diffs, res.hit_timeout)
    }

    fn refine_diff(
        &self,
        original: &[&str],
        modified: &[&str],
        diff: SequenceDiff,
        timeout: &Timeout,
        consider_whitespace_changes: bool,
    ) -> RefinedDiff {
        let slice1 =
            LinesSliceCharSequence::new(original, diff.seq1_range, consider_whitespace_changes);
        let slice2 =
            LinesSliceCharSequence::new(modified, diff.seq2_range, consider_whitespace_changes);

        let use_dp = slice1.len() + slice2.len() < self.tuning.dp_char_threshold;
        tracing::trace!(
            original = %diff.seq1_range,
            modified = %diff.seq2_range,
            chars = slice1.len() + slice2.len(),
            algorithm = if use_dp { "dynamic programming" } else { "myers" },
            "refining diff"
        );
        let res = if use_dp {
            DynamicProgrammingDiffing.compute(&slice1, &slice2, timeout)
        } else {
            MyersDiffAlgorithm.compute(&slice1, &slice2, timeout)
        };

        let diffs = optimize_sequence_diffs(&slice1, &slice2, res.diffs, &self.tuning);
        let diffs = extend_diffs_to_entire_word(&slice1, &slice2, diffs);
        let diffs = remove_short_matches(diffs, &self.tuning);
        let diffs =
            remove_very_short_matching_text_between_long_diffs(&slice1, &slice2, diffs, &self.tuning);

        let mappings = diffs
            .iter()
            .map(|diff| {
                RangeMapping::new(
                    slice1.translate_range(diff.seq1_range),
                    slice2.translate_range(diff.seq2_range),
                )
            })
            .collect();
        RefinedDiff {
            mappings,
            hit_timeout: res.hit_timeout,
        }
    }

    fn compute_moves(
        &self,
        changes: &[DetailedLineRangeMapping],
        seq1: &LineSequence<'_>,
        seq2: &LineSequence<'_>,
        timeout: &Timeout,
        consider_whitespace_changes: bool,
    ) -> (Vec<MovedText>, bool) {
        let (original, modified) = (seq1.lines(), seq2.lines());
        let mut hit_timeout = false;
        let moves = compute_moved_lines(changes, seq1, seq2, timeout, &self.tuning.moves)
            .into_iter()
            .map(|mapping| {
                let diff = SequenceDiff::new(
                    mapping.original.to_offset_range(),
                    mapping.modified.to_offset_range(),
                );
                let refined =
                    self.refine_diff(original, modified, diff, timeout, consider_whitespace_changes);
                hit_timeout |= refined.hit_timeout;
                MovedText {
                    line_range_mapping: mapping,
                    changes: line_range_mappings_from_range_mappings(
                        refined.mappings,
                        original,
                        modified,
                    ),
                }
            })
            .collect();
        (moves, hit_timeout)
    }
}

impl LinesDiffComputer for DefaultLinesDiffComputer {
    fn compute_diff(&self, original: &[&str], modified: &[&str], options: &DiffOptions) -> LinesDiff {
        let original = if original.is_empty() { EMPTY_DOCUMENT } else { original };
        let modified = if modified.is_empty() { EMPTY_DOCUMENT } else { modified };

        if original == modified {
            return LinesDiff::default();
        }
        if original == EMPTY_DOCUMENT || modified == EMPTY_DOCUMENT {
            return LinesDiff {
                changes: vec![replace_document(original, modified)],
                moves: Vec::new(),
                hit_timeout: false,
            };
        }

        let timeout = Timeout::from_budget(options.max_computation_time);
        let consider_whitespace_changes = !options.ignore_trim_whitespace;

        let mut interner = Interner::new(original.len() + modified.len());
        let seq1 = LineSequence::new(interner.intern_trimmed_lines(original), original);
        let seq2 = LineSequence::new(interner.intern_trimmed_lines(modified), modified);
        tracing::debug!(
            original_lines = original.len(),
            modified_lines = modified.len(),
            distinct_lines = interner.num_tokens(),
            "computing diff"
        );

        let (line_diffs, mut hit_timeout) = self.compute_line_alignment(&seq1, &seq2, &timeout);

        let mut alignments = Vec::new();
        let unchanged = SequenceDiff::invert(&line_diffs, original.len());
        for (i, unchanged) in unchanged.iter().enumerate() {
            if consider_whitespace_changes {
                // lines that are only equal after trimming still contain changes
                for offset in 0..unchanged.seq1_range.len() {
                    let line1 = unchanged.seq1_range.start + offset;
                    let line2 = unchanged.seq2_range.start + offset;
                    if original[line1] != modified[line2] {
                        let diff = SequenceDiff::new(
                            OffsetRange::new(line1, line1 + 1),
                            OffsetRange::new(line2, line2 + 1),
                        );
                        let refined = self.refine_diff(original, modified, diff, &timeout, true);
                        hit_timeout |= refined.hit_timeout;
                        alignments.extend(refined.mappings);
                    }
                }
            }
            if let Some(&diff) = line_diffs.get(i) {
                let refined =
                    self.refine_diff(original, modified, diff, &timeout, consider_whitespace_changes);
                hit_timeout |= refined.hit_timeout;
                alignments.extend(refined.mappings);
            }
        }

        let changes = line_range_mappings_from_range_mappings(alignments, original, modified);

        let mut moves = Vec::new();
        if options.compute_moves {
            let (moved, moves_hit_timeout) = self.compute_moves(
                &changes,
                &seq1,
                &seq2,
                &timeout,
                consider_whitespace_changes,
            );
            moves = moved;
            hit_timeout |= moves_hit_timeout;
        }

        let res = LinesDiff {
            changes,
            moves,
            hit_timeout,
        };
        #[cfg(debug_assertions)]
        if let Err(err) = res.validate(original, modified) {
            panic!("computed an invalid diff: {err}");
        }
        tracing::debug!(
            changes = res.changes.len(),
            moves = res.moves.len(),
            hit_timeout = res.hit_timeout,
            "computed diff"
        );
        res
    }
}

/// A single change replacing all of `original` with all of `modified`.
fn replace_document(original: &[&str], modified: &[&str]) -> DetailedLineRangeMapping {
    let document_range = |lines: &[&str]| {
        let last_line = lines[lines.len() - 1];
        TextRange::new(
            Position::new(1, 1),
            Position::new(lines.len(), last_line.chars().count() + 1),
        )
    };
    DetailedLineRangeMapping::new(
        LineRange::new(1, original.len() + 1),
        LineRange::new(1, modified.len() + 1),
        vec![RangeMapping::new(
            document_range(original),
            document_range(modified),
        )],
    )
}

/// Groups character level changes into hunks. Changes whose
/// lines overlap or touch on either side end up in the same hunk.
fn line_range_mappings_from_range_mappings(
    alignments: Vec<RangeMapping>,
    original: &[&str],
    modified: &[&str],
) -> Vec<DetailedLineRangeMapping> {
    let mut res: Vec<DetailedLineRangeMapping> = Vec::new();
    let mut last: Option<DetailedLineRangeMapping> = None;
    for alignment in alignments {
        let mapping = line_range_mapping_of(alignment, original, modified);
        match res.last_mut() {
            Some(group)
                if last.as_ref().map_or(false, |last| {
                    last.original.overlap_or_touch(mapping.original)
                        || last.modified.overlap_or_touch(mapping.modified)
                }) =>
            {
                group.original = group.original.join(mapping.original);
                group.modified = group.modified.join(mapping.modified);
                group.inner_changes.push(alignment);
            }
            _ => res.push(mapping.clone()),
        }
        last = Some(mapping);
    }
    res
}

/// The lines touched by a single character level change.
///
/// A change that ends at the very start of a line does not touch that line,
/// and a change that starts at the very end of a line does not touch that line either
/// (it only touches the line break).
fn line_range_mapping_of(
    mapping: RangeMapping,
    original: &[&str],
    modified: &[&str],
) -> DetailedLineRangeMapping {
    let (orig, modi) = (mapping.original, mapping.modified);
    let mut line_start_delta = 0;
    let mut line_end_delta = 0;

    if modi.end.column == 1
        && orig.end.column == 1
        && orig.start.line <= orig.end.line
        && modi.start.line <= modi.end.line
    {
        line_end_delta = 1;
    }

    let at_line_end = |position: Position, lines: &[&str]| {
        position.column - 1 >= lines[position.line - 1].chars().count()
    };
    if at_line_end(modi.start, modified)
        && at_line_end(orig.start, original)
        && orig.start.line + line_end_delta <= orig.end.line
        && modi.start.line + line_end_delta <= modi.end.line
    {
        line_start_delta = 1;
    }

    DetailedLineRangeMapping::new(
        LineRange::new(
            orig.start.line + line_start_delta,
            orig.end.line + 1 - line_end_delta,
        ),
        LineRange::new(
            modi.start.line + line_start_delta,
            modi.end.line + 1 - line_end_delta,
        ),
        vec![mapping],
    )
}

#[cfg(test)]
mod tests {
    use super::line_range_mapping_of;
    use crate::mapping::RangeMapping;
    use crate::position::{LineRange, Position, TextRange};

    fn text_range(start: (usize, usize), end: (usize, usize)) -> TextRange {
        TextRange::new(Position::new(start.0, start.1), Position::new(end.0, end.1))
    }

    #[test]
    fn insertion_between_lines_touches_no_original_line() {
        let original = ["a", "b"];
        let modified = ["a", "x", "b"];
        let mapping = RangeMapping::new(text_range((2, 1), (2, 1)), text_range((2, 1), (3, 1)));
        let res = line_range_mapping_of(mapping, &original, &modified);
        assert_eq!(res.original, LineRange::new(2, 2));
        assert_eq!(res.modified, LineRange::new(2, 3));
    }

    #[test]
    fn change_after_line_end_starts_on_next_line() {
        let original = ["a", "b"];
        let modified = ["a"];
        let mapping = RangeMapping::new(text_range((1, 2), (2, 2)), text_range((1, 2), (1, 2)));
        let res = line_range_mapping_of(mapping, &original, &modified);
        assert_eq!(res.original, LineRange::new(2, 3));
        assert_eq!(res.modified, LineRange::new(2, 2));
    }

    #[test]
    fn change_inside_line() {
        let original = ["let x = 1;"];
        let modified = ["let y = 1;"];
        let mapping = RangeMapping::new(text_range((1, 5), (1, 6)), text_range((1, 5), (1, 6)));
        let res = line_range_mapping_of(mapping, &original, &modified);
        assert_eq!(res.original, LineRange::new(1, 2));
        assert_eq!(res.modified, LineRange::new(1, 2));
    }
}

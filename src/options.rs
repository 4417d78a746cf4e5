//! Configuration of a diff computation.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per call options of a [`LinesDiffComputer`](crate::LinesDiffComputer).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct DiffOptions {
    /// Exclude leading and trailing whitespace of every line from the
    /// character level comparison.
    pub ignore_trim_whitespace: bool,
    /// Wall clock budget of the whole computation. [`Duration::ZERO`] means unlimited.
    pub max_computation_time: Duration,
    /// Detect blocks of lines that were moved to a different location.
    pub compute_moves: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions {
            ignore_trim_whitespace: true,
            max_computation_time: Duration::from_secs(5),
            compute_moves: false,
        }
    }
}

/// The constants that steer diff quality.
///
/// None of these affect the correctness of a result, only how readable it is
/// and how much time is spent to get there. The defaults produce the same
/// diffs as the VS Code diff editor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Tuning {
    /// Lines are aligned with the dynamic programming algorithm if both
    /// documents have fewer lines than this combined, with myers otherwise.
    pub dp_line_threshold: usize,
    /// Same as `dp_line_threshold` for the characters of a refined change.
    pub dp_char_threshold: usize,
    /// Score of matching two empty lines.
    pub empty_line_score: f64,
    /// Score of matching two lines that only differ in leading or trailing whitespace.
    pub whitespace_line_score: f64,
    /// A diff is moved by fewer than this many elements to land on a better boundary.
    pub max_boundary_shift: usize,
    /// Character diffs separated by at most this many unchanged characters are joined.
    pub short_match_gap: usize,
    /// Line diffs separated by lines with at most this many non-whitespace
    /// characters are joined...
    pub short_lines_max_chars: usize,
    /// ...if one of them touches more than this many lines.
    pub short_lines_min_diff_size: usize,
    /// Unchanged text between two long character diffs is only considered
    /// short if it spans at most this many line breaks...
    pub short_text_max_lines: usize,
    /// ...at most this many characters...
    pub short_text_max_chars: usize,
    /// ...and at most this many characters after trimming.
    pub short_text_max_trimmed_chars: usize,
    /// How many characters a line break counts for when weighing a diff.
    pub short_text_line_weight: f64,
    /// Upper bound of the weight of one side of a diff.
    pub short_text_max_weight: f64,
    /// How much heavier than a pair of maximum weight diffs the
    /// surrounding diffs have to be to swallow the text between them.
    pub short_text_factor: f64,
    /// A character diff covering more than this many elements (both sides combined)...
    pub line_remainder_min_diff_size: usize,
    /// ...is extended to the start or end of its line if at most this many
    /// non-whitespace characters are left there.
    pub line_remainder_max_chars: usize,
    /// Repeat limit of the passes that join diffs until nothing changes.
    pub max_join_iterations: usize,
    pub moves: MoveTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            dp_line_threshold: 1700,
            dp_char_threshold: 500,
            empty_line_score: 0.1,
            whitespace_line_score: 0.99,
            max_boundary_shift: 100,
            short_match_gap: 2,
            short_lines_max_chars: 4,
            short_lines_min_diff_size: 5,
            short_text_max_lines: 5,
            short_text_max_chars: 500,
            short_text_max_trimmed_chars: 20,
            short_text_line_weight: 40.0,
            short_text_max_weight: 130.0,
            short_text_factor: 1.3,
            line_remainder_min_diff_size: 100,
            line_remainder_max_chars: 3,
            max_join_iterations: 10,
            moves: MoveTuning::default(),
        }
    }
}

/// Configuration of move detection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct MoveTuning {
    /// Smallest number of lines of a pure deletion or insertion that is paired
    /// with a similar block.
    pub min_lines: usize,
    /// A deleted and an inserted block are only paired if their
    /// similarity (in `[0, 1]`) is strictly above this value.
    pub similarity_threshold: f64,
    /// Smallest run of identical (trimmed) lines that is reported as moved
    /// between two changes that are not pure deletions or insertions.
    pub min_matching_lines: usize,
    /// Such a run needs at least this many characters after trimming its lines.
    pub min_matching_chars: usize,
}

impl Default for MoveTuning {
    fn default() -> Self {
        MoveTuning {
            min_lines: 1,
            similarity_threshold: 0.9,
            min_matching_lines: 3,
            min_matching_chars: 15,
        }
    }
}

//! A two level text diff: lines are aligned first and every changed region is then
//! refined by a character level diff. This is the algorithm behind the "advanced" diff
//! of the VS Code diff editor.
//!
//! Compared to a classic line diff the result is much closer to what a human would
//! consider "the change":
//!
//! * lines are aligned by a weighted longest common subsequence that prefers matching
//!   long, identical lines over short or blank ones,
//! * insertions and deletions are shifted to the most natural boundary (weakly indented
//!   lines, word and whitespace boundaries),
//! * tiny unchanged fragments between two changes are absorbed so the result is not
//!   fragmented into noise,
//! * moved blocks of lines can optionally be detected.
//!
//! Every computation is bounded by a time budget. A computation that runs out of
//! time is not an error: it produces a coarser (but still valid) result and sets
//! [`LinesDiff::hit_timeout`].
//!
//! # Api Overview
//!
//! [`diff_text`] and [`diff_lines`] compute a [`LinesDiff`] with the
//! [`DefaultLinesDiffComputer`]:
//!
//! ```
//! use refine_diff::position::LineRange;
//! use refine_diff::{diff_text, DiffOptions};
//!
//! let before = "fn foo() {\n    bar();\n}\n";
//! let after = "fn foo() {\n    bar();\n    baz();\n}\n";
//!
//! let diff = diff_text(before, after, &DiffOptions::default());
//! assert!(!diff.hit_timeout);
//! assert_eq!(diff.changes.len(), 1);
//! // line 3 of `after` was inserted before line 3 of `before`
//! assert_eq!(diff.changes[0].original, LineRange::new(3, 3));
//! assert_eq!(diff.changes[0].modified, LineRange::new(3, 4));
//! ```
//!
//! Every change of a [`LinesDiff`] is a hunk ([`DetailedLineRangeMapping`]) that maps a
//! range of lines of the original document to a range of lines of the modified document,
//! together with the character level changes inside these lines. Positions are 1-based
//! and columns count `char`s.
//!
//! The building blocks (the [`Sequence`](sequence::Sequence) abstraction and the
//! [alignment algorithms](algorithms)) are public as well, so they can be used to diff
//! other kinds of sequences.

use crate::sources::lines;

pub use crate::computer::DefaultLinesDiffComputer;
pub use crate::mapping::{
    DetailedLineRangeMapping, LineRangeMapping, LinesDiff, MovedText, RangeMapping, Side,
    ValidationError,
};
pub use crate::options::{DiffOptions, MoveTuning, Tuning};
pub use crate::timeout::Timeout;

pub mod algorithms;
mod computer;
mod heuristics;
pub mod intern;
mod mapping;
mod moves;
mod options;
pub mod position;
pub mod range;
pub mod sequence;
pub mod sources;
mod timeout;
mod util;


/// Computes the difference between two documents given as lines.
pub trait LinesDiffComputer {
    /// Computes the changes that transform `original` into `modified`.
    ///
    /// Lines must not contain line terminators. An empty slice is treated like
    /// a document with a single empty line.
    fn compute_diff(&self, original: &[&str], modified: &[&str], options: &DiffOptions) -> LinesDiff;
}

/// Diffs two documents given as lines with the [`DefaultLinesDiffComputer`].
pub fn diff_lines(original: &[&str], modified: &[&str], options: &DiffOptions) -> LinesDiff {
    DefaultLinesDiffComputer::new().compute_diff(original, modified, options)
}

/// Splits both texts into lines (see [`sources::lines`]) and diffs them
/// with the [`DefaultLinesDiffComputer`].
pub fn diff_text(original: &str, modified: &str, options: &DiffOptions) -> LinesDiff {
    let original: Vec<&str> = lines(original).collect();
    let modified: Vec<&str> = lines(modified).collect();
    diff_lines(&original, &modified, options)
}

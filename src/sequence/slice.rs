use crate::position::{Position, TextRange};
use crate::range::OffsetRange;
use crate::sequence::Sequence;

/// The characters of a range of lines, flattened into a single sequence.
///
/// Consecutive lines are separated by a `'\n'` element. No separator follows the last
/// line of the document. If whitespace changes are ignored, the leading and trailing
/// whitespace of every line is left out. The amount trimmed at the start of each
/// line is recorded so that offsets can be translated back into exact positions.
pub struct LinesSliceCharSequence<'a> {
    lines: &'a [&'a str],
    line_range: OffsetRange,
    elements: Vec<char>,
    /// Offset of the first element of line `i + 1` (relative to `line_range.start`).
    first_char_offset_by_line_minus_one: Vec<usize>,
    /// Number of chars trimmed at the start of each line.
    additional_offset_by_line: Vec<usize>,
}

impl<'a> LinesSliceCharSequence<'a> {
    pub fn new(
        lines: &'a [&'a str],
        line_range: OffsetRange,
        consider_whitespace_changes: bool,
    ) -> LinesSliceCharSequence<'a> {
        let mut line_range = line_range;
        // a slice reaching the end of the document has no trailing line break,
        // so the (fully trimmed) previous line is included to provide a leading one instead
        let mut trim_first_line_fully = false;
        if line_range.start > 0 && line_range.end_exclusive >= lines.len() {
            line_range = line_range.delta_start(-1);
            trim_first_line_fully = true;
        }

        let mut elements = Vec::new();
        let mut first_char_offset_by_line_minus_one = Vec::with_capacity(line_range.len());
        let mut additional_offset_by_line = Vec::with_capacity(line_range.len() + 1);
        for i in line_range.iter() {
            let line = lines[i];
            let (content, trimmed_start) = if trim_first_line_fully {
                trim_first_line_fully = false;
                ("", line.chars().count())
            } else if !consider_whitespace_changes {
                let trimmed = line.trim_start();
                let trimmed_start = line.chars().count() - trimmed.chars().count();
                (trimmed.trim_end(), trimmed_start)
            } else {
                (line, 0)
            };
            additional_offset_by_line.push(trimmed_start);
            elements.extend(content.chars());
            if i + 1 < lines.len() {
                elements.push('\n');
                first_char_offset_by_line_minus_one.push(elements.len());
            }
        }
        additional_offset_by_line.push(0);

        LinesSliceCharSequence {
            lines,
            line_range,
            elements,
            first_char_offset_by_line_minus_one,
            additional_offset_by_line,
        }
    }

    /// The lines covered by this sequence. This may include one more line than
    /// requested, see [`new`](LinesSliceCharSequence::new).
    pub fn line_range(&self) -> OffsetRange {
        self.line_range
    }

    pub fn lines(&self) -> &'a [&'a str] {
        self.lines
    }

    pub fn translate_offset(&self, offset: usize) -> Position {
        if self.line_range.is_empty() {
            return Position::new(self.line_range.start + 1, 1);
        }
        let line_idx = self
            .first_char_offset_by_line_minus_one
            .partition_point(|&line_start| line_start <= offset);
        let line_offset = if line_idx == 0 {
            0
        } else {
            self.first_char_offset_by_line_minus_one[line_idx - 1]
        };
        Position::new(
            self.line_range.start + line_idx + 1,
            offset - line_offset + 1 + self.additional_offset_by_line[line_idx],
        )
    }

    pub fn translate_range(&self, range: OffsetRange) -> TextRange {
        TextRange::new(
            self.translate_offset(range.start),
            self.translate_offset(range.end_exclusive),
        )
    }

    /// Finds the word (a maximal run of ascii letters and digits) that
    /// contains the element at `offset`.
    pub fn find_word_containing(&self, offset: usize) -> Option<OffsetRange> {
        if !self.elements.get(offset).map_or(false, is_word_char) {
            return None;
        }
        let mut start = offset;
        while start > 0 && is_word_char(&self.elements[start - 1]) {
            start -= 1;
        }
        let mut end = offset;
        while end < self.elements.len() && is_word_char(&self.elements[end]) {
            end += 1;
        }
        Some(OffsetRange::new(start, end))
    }

    pub fn count_lines_in(&self, range: OffsetRange) -> usize {
        self.translate_offset(range.end_exclusive).line - self.translate_offset(range.start).line
    }

    /// Extends `range` to the start of its first line and past the line
    /// break of its last line.
    pub fn extend_to_full_lines(&self, range: OffsetRange) -> OffsetRange {
        let line_starts = &self.first_char_offset_by_line_minus_one;
        let start = match line_starts.partition_point(|&line_start| line_start <= range.start) {
            0 => 0,
            idx => line_starts[idx - 1],
        };
        let end = if range.end_exclusive == 0 {
            0
        } else {
            let idx = line_starts.partition_point(|&line_start| line_start < range.end_exclusive);
            line_starts.get(idx).copied().unwrap_or(self.elements.len())
        };
        OffsetRange::new(start, end)
    }
}

impl Sequence for LinesSliceCharSequence<'_> {
    type Element = char;

    fn len(&self) -> usize {
        self.elements.len()
    }

    fn element(&self, offset: usize) -> char {
        self.elements[offset]
    }

    fn boundary_score(&self, length: usize) -> i32 {
        let prev = CharBoundaryCategory::of(length.checked_sub(1).map(|i| self.elements[i]));
        let next = CharBoundaryCategory::of(self.elements.get(length).copied());

        if prev == CharBoundaryCategory::LineBreakCr && next == CharBoundaryCategory::LineBreakLf {
            // never split a CRLF pair
            return 0;
        }
        if prev == CharBoundaryCategory::LineBreakLf {
            return 150;
        }

        let mut score = 0;
        if prev != next {
            score += 10;
            if prev == CharBoundaryCategory::WordLower && next == CharBoundaryCategory::WordUpper {
                score += 1;
            }
        }
        score + prev.score() + next.score()
    }

    fn text(&self, range: OffsetRange) -> String {
        self.elements[range.start..range.end_exclusive].iter().collect()
    }
}

fn is_word_char(c: &char) -> bool {
    c.is_ascii_alphanumeric()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharBoundaryCategory {
    WordLower,
    WordUpper,
    WordNumber,
    End,
    Other,
    Separator,
    Space,
    LineBreakCr,
    LineBreakLf,
}

impl CharBoundaryCategory {
    fn of(c: Option<char>) -> CharBoundaryCategory {
        match c {
            None => CharBoundaryCategory::End,
            Some('\n') => CharBoundaryCategory::LineBreakLf,
            Some('\r') => CharBoundaryCategory::LineBreakCr,
            Some(' ' | '\t') => CharBoundaryCategory::Space,
            Some('a'..='z') => CharBoundaryCategory::WordLower,
            Some('A'..='Z') => CharBoundaryCategory::WordUpper,
            Some('0'..='9') => CharBoundaryCategory::WordNumber,
            Some(',' | ';') => CharBoundaryCategory::Separator,
            Some(_) => CharBoundaryCategory::Other,
        }
    }

    fn score(self) -> i32 {
        match self {
            CharBoundaryCategory::WordLower
            | CharBoundaryCategory::WordUpper
            | CharBoundaryCategory::WordNumber => 0,
            CharBoundaryCategory::End => 10,
            CharBoundaryCategory::Other => 2,
            CharBoundaryCategory::Separator => 30,
            CharBoundaryCategory::Space => 3,
            CharBoundaryCategory::LineBreakCr | CharBoundaryCategory::LineBreakLf => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LinesSliceCharSequence;
    use crate::position::Position;
    use crate::range::OffsetRange;
    use crate::sequence::Sequence;

    #[test]
    fn flattens_lines_with_separators() {
        let lines = ["  foo", "bar  ", "baz"];
        let seq = LinesSliceCharSequence::new(&lines, OffsetRange::new(0, 2), true);
        assert_eq!(seq.text(OffsetRange::new(0, seq.len())), "  foo\nbar  \n");

        let seq = LinesSliceCharSequence::new(&lines, OffsetRange::new(0, 2), false);
        assert_eq!(seq.text(OffsetRange::new(0, seq.len())), "foo\nbar\n");
        assert_eq!(seq.translate_offset(0), Position::new(1, 3));
        assert_eq!(seq.translate_offset(3), Position::new(1, 6));
        assert_eq!(seq.translate_offset(4), Position::new(2, 1));
        assert_eq!(seq.translate_offset(8), Position::new(3, 1));
        assert_eq!(seq.count_lines_in(OffsetRange::new(2, 5)), 1);
    }

    #[test]
    fn slice_at_document_end_includes_previous_line() {
        let lines = ["a", "b"];
        let seq = LinesSliceCharSequence::new(&lines, OffsetRange::new(1, 2), true);
        assert_eq!(seq.line_range(), OffsetRange::new(0, 2));
        assert_eq!(seq.text(OffsetRange::new(0, seq.len())), "\nb");
        assert_eq!(seq.translate_offset(0), Position::new(1, 2));
        assert_eq!(seq.translate_offset(2), Position::new(2, 2));

        let seq = LinesSliceCharSequence::new(&lines, OffsetRange::new(2, 2), true);
        assert_eq!(seq.len(), 0);
        assert_eq!(seq.translate_offset(0), Position::new(2, 2));
    }

    #[test]
    fn empty_slice_translates_to_line_start() {
        let lines = ["a", "b", "c"];
        let seq = LinesSliceCharSequence::new(&lines, OffsetRange::new(1, 1), true);
        assert_eq!(seq.len(), 0);
        assert_eq!(seq.translate_offset(0), Position::new(2, 1));
    }

    #[test]
    fn extends_to_full_lines() {
        let lines = ["ab", "cd", "ef"];
        let seq = LinesSliceCharSequence::new(&lines, OffsetRange::new(0, 3), true);
        // "ab\ncd\nef"
        assert_eq!(seq.extend_to_full_lines(OffsetRange::new(4, 5)), OffsetRange::new(3, 6));
        assert_eq!(seq.extend_to_full_lines(OffsetRange::new(7, 8)), OffsetRange::new(6, 8));
        assert_eq!(seq.extend_to_full_lines(OffsetRange::new(1, 1)), OffsetRange::new(0, 3));
        assert_eq!(seq.extend_to_full_lines(OffsetRange::new(2, 4)), OffsetRange::new(0, 6));
    }

    #[test]
    fn words() {
        let lines = ["let fooBar = 42;"];
        let seq = LinesSliceCharSequence::new(&lines, OffsetRange::new(0, 1), true);
        assert_eq!(seq.find_word_containing(6), Some(OffsetRange::new(4, 10)));
        assert_eq!(seq.find_word_containing(3), None);
        assert_eq!(seq.find_word_containing(14), Some(OffsetRange::new(13, 15)));
        assert_eq!(seq.find_word_containing(16), None);
    }

    #[test]
    fn boundary_scores() {
        let lines = ["ab\r", "fooBar, x"];
        let seq = LinesSliceCharSequence::new(&lines, OffsetRange::new(0, 2), true);
        // "ab\r\nfooBar, x"
        assert_eq!(seq.boundary_score(3), 0);
        assert_eq!(seq.boundary_score(4), 150);
        assert_eq!(seq.boundary_score(1), 0);
        // lower -> upper inside "fooBar"
        assert_eq!(seq.boundary_score(7), 11);
        // "r" -> ","
        assert_eq!(seq.boundary_score(10), 40);
        // start of the sequence
        assert_eq!(seq.boundary_score(0), 20);
    }
}

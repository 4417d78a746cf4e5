use crate::intern::Token;
use crate::range::OffsetRange;
use crate::sequence::Sequence;

/// A document as a sequence of lines.
///
/// Lines are compared by their interned [`Token`]s, which are computed from the
/// trimmed line so that indentation changes do not break the line alignment.
pub struct LineSequence<'a> {
    trimmed_hash: Vec<Token>,
    lines: &'a [&'a str],
}

impl<'a> LineSequence<'a> {
    pub fn new(trimmed_hash: Vec<Token>, lines: &'a [&'a str]) -> LineSequence<'a> {
        debug_assert_eq!(trimmed_hash.len(), lines.len());
        LineSequence {
            trimmed_hash,
            lines,
        }
    }

    pub fn lines(&self) -> &'a [&'a str] {
        self.lines
    }

    pub fn tokens(&self) -> &[Token] {
        &self.trimmed_hash
    }
}

impl Sequence for LineSequence<'_> {
    type Element = Token;

    fn len(&self) -> usize {
        self.trimmed_hash.len()
    }

    fn element(&self, offset: usize) -> Token {
        self.trimmed_hash[offset]
    }

    /// Boundaries between weakly indented lines score higher.
    fn boundary_score(&self, length: usize) -> i32 {
        let indentation_before = if length == 0 {
            0
        } else {
            indentation(self.lines[length - 1])
        };
        let indentation_after = if length == self.lines.len() {
            0
        } else {
            indentation(self.lines[length])
        };
        1000 - (indentation_before + indentation_after)
    }

    fn is_strongly_equal(&self, offset1: usize, offset2: usize) -> bool {
        self.lines[offset1] == self.lines[offset2]
    }

    fn text(&self, range: OffsetRange) -> String {
        self.lines[range.start..range.end_exclusive].join("\n")
    }
}

fn indentation(line: &str) -> i32 {
    line.bytes()
        .take_while(|&byte| byte == b' ' || byte == b'\t')
        .count() as i32
}

#[cfg(test)]
mod tests {
    use super::LineSequence;
    use crate::intern::Interner;
    use crate::range::OffsetRange;
    use crate::sequence::Sequence;

    #[test]
    fn prefers_boundaries_next_to_outdented_lines() {
        let lines = ["fn foo() {", "    bar();", "}", ""];
        let mut interner = Interner::new(lines.len());
        let seq = LineSequence::new(interner.intern_trimmed_lines(&lines), &lines);
        assert_eq!(seq.boundary_score(0), 1000);
        assert_eq!(seq.boundary_score(1), 996);
        assert_eq!(seq.boundary_score(2), 996);
        assert_eq!(seq.boundary_score(4), 1000);
        assert_eq!(seq.text(OffsetRange::new(1, 3)), "    bar();\n}");
    }
}

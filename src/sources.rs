//! Splitting text into the lines a diff operates on.

use memchr::memchr2;

/// Returns an iterator over the lines of `text`.
///
/// Lines are terminated by `\r\n`, `\r` or `\n` and the terminator is not
/// part of the emitted line. Like in a text editor a document always has at least
/// one line, and a trailing terminator is followed by a final empty line.
pub fn lines(text: &str) -> Lines<'_> {
    Lines(Some(text))
}

/// An iterator over the lines of a `str`. See [`lines`] for details.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Lines<'a>(Option<&'a str>);

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let rem = self.0?;
        let Some(line_len) = memchr2(b'\n', b'\r', rem.as_bytes()) else {
            self.0 = None;
            return Some(rem);
        };
        let bytes = rem.as_bytes();
        let terminator_len = if bytes[line_len] == b'\r' && bytes.get(line_len + 1) == Some(&b'\n') {
            2
        } else {
            1
        };
        // splitting at an ascii character always produces valid utf-8
        self.0 = Some(&rem[line_len + terminator_len..]);
        Some(&rem[..line_len])
    }
}

#[cfg(test)]
mod tests {
    use super::lines;

    #[test]
    fn mixed_terminators() {
        let res: Vec<_> = lines("a\r\nb\rc\n\nd").collect();
        assert_eq!(res, ["a", "b", "c", "", "d"]);
    }

    #[test]
    fn trailing_terminator_yields_empty_line() {
        let res: Vec<_> = lines("a\n").collect();
        assert_eq!(res, ["a", ""]);
        let res: Vec<_> = lines("").collect();
        assert_eq!(res, [""]);
    }
}

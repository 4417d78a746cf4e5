use std::hash::Hash;
use std::ops::Index;

use ahash::RandomState;
use hashbrown::hash_table::{Entry, HashTable};

/// A line represented as an interned integer.
///
/// Lines are diffed as sequences of tokens instead of strings.
/// This allows for much better performance by amortizing the cost of hashing/equality:
/// two lines are equal if and only if their tokens are equal.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[repr(transparent)]
pub struct Token(pub u32);

impl From<u32> for Token {
    fn from(token: u32) -> Self {
        Token(token)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

/// Assigns a small integer [`Token`] to every distinct value it sees.
///
/// An interner is only ever used for a single diff computation,
/// so tokens are never erased.
pub struct Interner<T> {
    tokens: Vec<T>,
    table: HashTable<Token>,
    hasher: RandomState,
}

impl<T> Interner<T> {
    /// Create an Interner with initial capacity `capacity`.
    pub fn new(capacity: usize) -> Interner<T> {
        Interner {
            tokens: Vec::with_capacity(capacity),
            table: HashTable::with_capacity(capacity),
            hasher: RandomState::new(),
        }
    }

    /// Returns to total number of **distinct** tokens currently interned.
    pub fn num_tokens(&self) -> u32 {
        self.tokens.len() as u32
    }
}

impl<T: Hash + Eq> Interner<T> {
    /// Intern `token` and return the interned integer.
    pub fn intern(&mut self, token: T) -> Token {
        let hash = self.hasher.hash_one(&token);
        match self.table.entry(
            hash,
            |&it| self.tokens[it.0 as usize] == token,
            |&token| self.hasher.hash_one(&self.tokens[token.0 as usize]),
        ) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let interned = Token(self.tokens.len() as u32);
                entry.insert(interned);
                self.tokens.push(token);
                interned
            }
        }
    }
}

impl<'a> Interner<&'a str> {
    /// Interns every line with leading and trailing whitespace removed,
    /// so that lines which only differ in indentation share a token.
    pub fn intern_trimmed_lines(&mut self, lines: &[&'a str]) -> Vec<Token> {
        lines.iter().map(|line| self.intern(line.trim())).collect()
    }
}

impl<T> Index<Token> for Interner<T> {
    type Output = T;
    fn index(&self, index: Token) -> &Self::Output {
        &self.tokens[index.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::{Interner, Token};

    #[test]
    fn trimmed_lines_share_tokens() {
        let mut interner = Interner::new(8);
        let before = interner.intern_trimmed_lines(&["foo", "  bar", ""]);
        let after = interner.intern_trimmed_lines(&["\tfoo  ", "bar", "baz"]);
        assert_eq!(before, [Token(0), Token(1), Token(2)]);
        assert_eq!(after, [Token(0), Token(1), Token(3)]);
        assert_eq!(interner.num_tokens(), 4);
        assert_eq!(interner[Token(1)], "bar");
    }
}

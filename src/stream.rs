//! A peekable, position-tracked character stream over a whole source file.
//!
//! Thin wrapper around the `char_stream` crate: it hands us the raw chars,
//! we layer line/column bookkeeping on top so that every token and, in
//! turn, every AST node can carry a `Position` for diagnostics.

use char_stream::CharStream;
use std::fmt;
use std::io::Cursor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub line: u64,
    pub column: u64,
}

impl Position {
    pub fn new() -> Self {
        Position { line: 1, column: 1 }
    }

    fn advance(&mut self, chr: char) {
        if chr == '\n' {
            self.line += 1;
            self.column = 1;
        }
        else {
            self.column += 1;
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Wraps a whole source string so the lexer can peek one character ahead
/// without consuming it, while position advances only on consumption.
pub struct Stream {
    chars: Vec<char>,
    index: usize,
    pos: Position,
}

impl Stream {
    pub fn from_string(source: String) -> Self {
        let chars = CharStream::from_reader(Cursor::new(source.into_bytes()))
            .filter_map(|result| result.ok())
            .collect();

        Stream { chars, index: 0, pos: Position::new() }
    }

    /// Look at the next character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    /// Consume and return the next character, advancing position.
    pub fn advance(&mut self) -> Option<char> {
        let chr = self.peek()?;
        self.index += 1;
        self.pos.advance(chr);
        Some(chr)
    }

    pub fn get_pos(&self) -> &Position {
        &self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_advance() {
        let strm = Stream::from_string("ab".to_string());
        assert_eq!(strm.peek(), Some('a'));
        assert_eq!(strm.peek(), Some('a'));
    }

    #[test]
    fn advance_consumes_in_order() {
        let mut strm = Stream::from_string("ab".to_string());
        assert_eq!(strm.advance(), Some('a'));
        assert_eq!(strm.advance(), Some('b'));
        assert_eq!(strm.advance(), None);
    }

    #[test]
    fn newline_resets_column_and_bumps_line() {
        let mut strm = Stream::from_string("a\nb".to_string());
        strm.advance();
        assert_eq!(strm.get_pos().line, 1);
        strm.advance(); // consume '\n'
        assert_eq!(strm.get_pos().line, 2);
        assert_eq!(strm.get_pos().column, 1);
    }
}

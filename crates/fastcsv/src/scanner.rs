//! Quote-aware column/line scanner over a borrowed text buffer.
//!
//! The scanner never copies: a column is the raw `[column_start, column_end)`
//! slice of the buffer, quotes and escapes included. Unquoting happens in the
//! string codec, not here.
//!
//! # Scanning rules
//!
//! - Outside quotes the delimiter ends a column, `\n` or `\r` ends the column
//!   and the line.
//! - A quote opens a quoted span. Inside it `escape` followed by `quote` is
//!   skipped as a pair, a lone `quote` closes the span and scanning continues
//!   unquoted, so `s"one"` and `"four"a"five"` are single columns.
//! - Delimiters and line terminators inside a quoted span are content.
//! - A span still open at the end of the buffer ends the column there; the
//!   column is flagged so a strict caller can reject it.

use crate::dialect::Dialect;

/// Cursor over one document.
///
/// Offsets only grow: `line_start <= column_start <= column_end <= len`.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    dialect: Dialect,
    line_start: usize,
    column_start: usize,
    column_end: usize,
    unterminated: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner positioned on the first column of the first line.
    pub fn new(text: &'a str, dialect: &Dialect) -> Self {
        let mut scanner = Self {
            text,
            dialect: *dialect,
            line_start: 0,
            column_start: 0,
            column_end: 0,
            unterminated: false,
        };
        scanner.rescan();
        scanner
    }

    /// The dialect the scanner was created with.
    #[must_use]
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Whole buffer.
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// True at the end of the buffer or when the cursor sits on a line terminator.
    #[must_use]
    pub fn end_of_line(&self) -> bool {
        self.text.as_bytes().get(self.column_start).is_none_or(|&byte| Dialect::is_terminator(byte))
    }

    /// True once the current line starts at the end of the buffer.
    #[must_use]
    pub fn end_of_file(&self) -> bool {
        self.line_start == self.text.len()
    }

    /// Raw text of the current column.
    #[must_use]
    pub fn current_column(&self) -> &'a str {
        &self.text[self.column_start..self.column_end]
    }

    /// Length of the current column in bytes.
    #[must_use]
    pub fn current_column_size(&self) -> usize {
        self.column_end - self.column_start
    }

    #[must_use]
    pub fn current_column_empty(&self) -> bool {
        self.column_start == self.column_end
    }

    /// Whether the current column contains a quoted span that never closed.
    #[must_use]
    pub fn current_column_unterminated(&self) -> bool {
        self.unterminated
    }

    /// Byte offset of the current column.
    #[must_use]
    pub fn column_offset(&self) -> usize {
        self.column_start
    }

    /// Moves to the next column of the current line.
    ///
    /// Returns `true` if a delimiter was crossed. Otherwise the cursor is
    /// parked on the line terminator (or the buffer end) and `false` is
    /// returned; calling it again there is a no-op.
    pub fn advance_column(&mut self) -> bool {
        if self.text.as_bytes().get(self.column_end) == Some(&self.dialect.delimiter) {
            self.column_start = self.column_end + 1;
            self.rescan();
            true
        } else {
            self.column_start = self.column_end;
            self.unterminated = false;
            false
        }
    }

    /// Skips the rest of the current line and its terminator (`\n`, `\r` or `\r\n`).
    ///
    /// Returns `false` when no terminator was left; the scanner is then at
    /// end of file.
    pub fn advance_line(&mut self) -> bool {
        while !self.end_of_line() {
            self.advance_column();
        }

        let bytes = self.text.as_bytes();
        let skip = match bytes.get(self.column_start) {
            Some(b'\r') if bytes.get(self.column_start + 1) == Some(&b'\n') => 2,
            Some(b'\r' | b'\n') => 1,
            _ => 0,
        };

        self.column_start += skip;
        self.line_start = self.column_start;
        self.rescan();
        skip > 0
    }

    /// Returns the current column and advances past it.
    pub fn consume_column(&mut self) -> &'a str {
        let column = self.current_column();
        self.advance_column();
        column
    }

    /// Rough length of the current line, ignoring quotes.
    ///
    /// Only used as a capacity hint.
    #[must_use]
    pub fn line_len_hint(&self) -> usize {
        let rest = &self.text.as_bytes()[self.line_start..];
        rest.iter().position(|&byte| Dialect::is_terminator(byte)).unwrap_or(rest.len())
    }

    fn rescan(&mut self) {
        self.unterminated = false;
        self.column_end = self.scan_column(self.column_start);
    }

    fn scan_column(&mut self, start: usize) -> usize {
        let bytes = self.text.as_bytes();
        let mut pos = start;

        while let Some(&byte) = bytes.get(pos) {
            if byte == self.dialect.delimiter || Dialect::is_terminator(byte) {
                return pos;
            }
            pos = if byte == self.dialect.quote { self.skip_quoted(pos + 1) } else { pos + 1 };
        }

        bytes.len()
    }

    /// Returns the position right after the closing quote, or the buffer end.
    fn skip_quoted(&mut self, mut pos: usize) -> usize {
        let bytes = self.text.as_bytes();
        let Dialect { quote, escape, .. } = self.dialect;

        while let Some(&byte) = bytes.get(pos) {
            if byte == escape && bytes.get(pos + 1) == Some(&quote) {
                pos += 2;
            } else if byte == quote {
                return pos + 1;
            } else {
                pos += 1;
            }
        }

        self.unterminated = true;
        bytes.len()
    }
}

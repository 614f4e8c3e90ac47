//! Dialect configuration shared by the scanner, the record codec and the drivers.
//!
//! A [`Dialect`] is an immutable value: every reader and writer copies the one
//! it was built with, so there is no process-wide configuration state.

use crate::error::{CsvError, Result};

/// Default column delimiter.
pub const DEFAULT_DELIMITER: u8 = b',';
/// Default quote character.
pub const DEFAULT_QUOTE: u8 = b'"';
/// Default escape character (placed before a quote inside a quoted span).
pub const DEFAULT_ESCAPE: u8 = b'\\';
/// Default limit for record nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;
/// File extension expected by the [`fs`](crate::fs) helpers.
pub const CSV_EXTENSION: &str = "csv";

/// Line terminator emitted by writers.
///
/// Readers always accept `\n`, `\r` and `\r\n`, mixed freely within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineTerminator {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineTerminator {
    /// Terminator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

impl Default for LineTerminator {
    /// `\r\n` on Windows targets, `\n` everywhere else.
    fn default() -> Self {
        if cfg!(windows) { Self::CrLf } else { Self::Lf }
    }
}

/// Behaviour when a quoted span is still open at the end of the buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QuoteMode {
    /// The column silently ends at the buffer boundary.
    #[default]
    Lenient,
    /// Consuming such a column fails with [`CsvError::UnterminatedQuote`].
    Strict,
}

/// Header handling for a single read or write call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HeaderMode {
    /// Read: skip the first line. Write: emit a header line if the record type declares one.
    #[default]
    Default,
    /// No header line on either side.
    NoHeader,
}

impl HeaderMode {
    /// Whether a header line is expected (read) or wanted (write).
    #[must_use]
    pub const fn expects_header(self) -> bool {
        matches!(self, Self::Default)
    }
}

/// The configured characters and limits of one CSV flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dialect {
    /// Column delimiter.
    pub delimiter: u8,
    /// Quote character.
    pub quote: u8,
    /// Escape character. Setting it equal to `quote` gives RFC 4180 `""` doubling.
    pub escape: u8,
    /// Terminator written after every row.
    pub line_terminator: LineTerminator,
    /// Unterminated quote handling.
    pub quote_mode: QuoteMode,
    /// Maximum record nesting depth before the codec reports a recursive definition.
    pub max_depth: usize,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            quote: DEFAULT_QUOTE,
            escape: DEFAULT_ESCAPE,
            line_terminator: LineTerminator::default(),
            quote_mode: QuoteMode::Lenient,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Dialect {
    /// Checks that the characters are ASCII and do not collide.
    ///
    /// The scanner slices the buffer at these bytes, so they must never be
    /// part of a multi-byte UTF-8 sequence.
    pub fn validate(&self) -> Result<()> {
        let chars = [("delimiter", self.delimiter), ("quote", self.quote), ("escape", self.escape)];
        for (name, byte) in chars {
            if !byte.is_ascii() {
                return Err(CsvError::InvalidDialect(format!("{name} {byte:#04x} is not ASCII")));
            }
            if byte == b'\n' || byte == b'\r' {
                return Err(CsvError::InvalidDialect(format!("{name} cannot be a line terminator")));
            }
        }
        if self.delimiter == self.quote {
            return Err(CsvError::InvalidDialect("delimiter and quote are the same".to_string()));
        }
        if self.delimiter == self.escape {
            return Err(CsvError::InvalidDialect("delimiter and escape are the same".to_string()));
        }
        if self.max_depth == 0 {
            return Err(CsvError::InvalidDialect("max_depth must be at least 1".to_string()));
        }
        Ok(())
    }

    pub(crate) fn is_terminator(byte: u8) -> bool {
        byte == b'\n' || byte == b'\r'
    }
}

//! Token kinds, lexemes, and lexer flags.

/// Lead byte marking a length-prefixed binary blob in script or list text.
///
/// A blob is encoded as the sentinel, a 16-bit little-endian payload
/// length, and the payload bytes. The lexer treats such a span as opaque:
/// braces, quotes, and terminators inside the payload do not count.
pub const BIN_SENTINEL: u8 = 0x01;

/// The kind of a lexed token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// End of a command: CR, LF, `;`, or NUL (including the virtual
    /// terminator one past the end of the buffer).
    Cmd,
    /// A complete word.
    Word,
    /// A partial word; must be concatenated with its neighbours to form
    /// a word.
    Part,
    /// A lexical error (unbalanced delimiter, bad variable start,
    /// unterminated quote, ...).
    Error,
}

/// A token returned by the lexer: its kind and byte range.
///
/// `from..to` is the span of the token's content (delimiters included
/// for brace and bracket spans); scanning resumes at `to`. Either bound
/// may sit one past the end of the buffer when the token was produced by
/// the virtual terminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lexeme {
    pub kind: TokenKind,
    pub from: usize,
    pub to: usize,
}

impl Lexeme {
    /// The token's bytes within `buf`, clamped to the real buffer (the
    /// virtual terminator contributes no bytes).
    pub fn bytes<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        let from = self.from.min(buf.len());
        let to = self.to.min(buf.len());
        &buf[from..to]
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    pub fn is_empty(&self) -> bool {
        self.to <= self.from
    }
}

/// Lexer mode flags, updated as tokens are consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    /// Inside a double-quoted section.
    pub quote: bool,
    /// Parsing a variable name (set while lexing the tail of a `$`).
    pub var_name: bool,
    /// A comment is not allowed here. Set after the first token of a
    /// command, cleared again on a `Cmd` token.
    pub no_comment: bool,
}

//! tico-lex - word-level lexer for the Tico command language.
//!
//! The lexer recognizes commands, words, and partial words under the
//! brace/quote/bracket/dollar substitution rules, including the
//! binary-safe value escape. It is a stateless function over a byte
//! slice plus a small flag word; [`Tokenizer`] drives it over a whole
//! buffer.
//!
//! Scripts are byte sequences, not UTF-8 text: the alphabet is the full
//! 8-bit range and embedded NUL bytes are data, not terminators.

mod lexer;
mod token;

#[cfg(test)]
mod edge_cases;

pub use lexer::{bin_size, is_end, is_operator, is_space, is_special, next_token, Tokenizer};
pub use token::{Flags, Lexeme, TokenKind, BIN_SENTINEL};

//! The list representation: whitespace-separated words, brace-quoted
//! when necessary.
//!
//! A list is the argument carrier of every command and a first-class
//! data type. Its textual form is parseable by the lexer into the same
//! sequence of words; binary blobs embed verbatim with their header and
//! stay opaque to brace and whitespace scanning.

use tico_lex::{is_space, is_special, Lexeme, TokenKind, Tokenizer};

use crate::value::Value;

/// A sequence of words in textual list form.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct List {
    raw: Vec<u8>,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reinterpret a value's payload as a list.
    pub fn from_value(v: &Value) -> Self {
        Self {
            raw: v.bytes().to_vec(),
        }
    }

    /// The textual form.
    pub fn bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Size of the textual form in bytes.
    pub fn size(&self) -> usize {
        self.raw.len()
    }

    fn words(&self) -> impl Iterator<Item = Lexeme> + '_ {
        Tokenizer::new(&self.raw).filter(|t| t.kind == TokenKind::Word)
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The word at `index` as a fresh value. Outer braces are stripped;
    /// a binary span decodes back to its payload.
    pub fn at(&self, index: usize) -> Option<Value> {
        let word = self.words().nth(index)?;
        let mut span = word.bytes(&self.raw);
        if span.first() == Some(&b'{') {
            span = &span[1..span.len().saturating_sub(1)];
        }
        Some(Value::from_script(span))
    }

    /// Append a word.
    ///
    /// The word is wrapped in braces when it is empty or contains
    /// whitespace or a lexer-special byte; binary values embed verbatim
    /// in their wire encoding instead.
    pub fn push(&mut self, item: Value) {
        let brace = if item.is_blob() {
            false
        } else {
            item.is_empty()
                || item
                    .bytes()
                    .iter()
                    .any(|&b| is_space(b) || is_special(b, false))
        };
        if !self.raw.is_empty() {
            self.raw.push(b' ');
        }
        if brace {
            self.raw.push(b'{');
        }
        item.push_encoded(&mut self.raw);
        if brace {
            self.raw.push(b'}');
        }
    }
}

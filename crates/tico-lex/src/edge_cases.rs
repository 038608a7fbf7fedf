//! Edge case tests for tico-lex.

use crate::{next_token, Flags, Lexeme, TokenKind, Tokenizer, BIN_SENTINEL};

fn kinds(src: &[u8]) -> Vec<TokenKind> {
    Tokenizer::new(src).map(|t| t.kind).collect()
}

#[test]
fn test_edge_whitespace_only() {
    assert_eq!(kinds(b" \t \t "), vec![TokenKind::Cmd]);
}

#[test]
fn test_edge_terminators_only() {
    assert_eq!(
        kinds(b";;\n"),
        vec![TokenKind::Cmd, TokenKind::Cmd, TokenKind::Cmd, TokenKind::Cmd]
    );
}

#[test]
fn test_edge_comment_without_trailing_newline() {
    assert_eq!(kinds(b"set a 1 ;# done"), vec![
        TokenKind::Word,
        TokenKind::Word,
        TokenKind::Word,
        TokenKind::Cmd,
        TokenKind::Cmd,
    ]);
}

#[test]
fn test_edge_long_word() {
    let word = vec![b'x'; 10_000];
    let tokens: Vec<Lexeme> = Tokenizer::new(&word).collect();
    assert_eq!(tokens[0].kind, TokenKind::Word);
    assert_eq!(tokens[0].len(), 10_000);
}

#[test]
fn test_edge_deeply_nested_braces() {
    let mut src = Vec::new();
    src.extend(std::iter::repeat(b'{').take(64));
    src.push(b'x');
    src.extend(std::iter::repeat(b'}').take(64));
    let tokens: Vec<Lexeme> = Tokenizer::new(&src).collect();
    assert_eq!(tokens[0].kind, TokenKind::Word);
    assert_eq!(tokens[0].len(), src.len());
}

#[test]
fn test_edge_bracket_inside_brace_counts_separately() {
    // Brace matching only counts braces; brackets are plain bytes there.
    assert_eq!(kinds(b"{a [ b}"), vec![TokenKind::Word, TokenKind::Cmd]);
}

#[test]
fn test_edge_blob_spanning_whole_brace_body() {
    let mut src = vec![b'{'];
    src.extend_from_slice(&[BIN_SENTINEL, 4, 0]);
    src.extend_from_slice(b"}}{{");
    src.push(b'}');
    let tokens: Vec<Lexeme> = Tokenizer::new(&src).collect();
    assert_eq!(tokens[0].kind, TokenKind::Word);
    assert_eq!(tokens[0].len(), src.len());
}

#[test]
fn test_edge_blob_with_zero_length() {
    let src = [BIN_SENTINEL, 0, 0, b' '];
    let tokens: Vec<Lexeme> = Tokenizer::new(&src).collect();
    assert_eq!(tokens[0].kind, TokenKind::Word);
    assert_eq!((tokens[0].from, tokens[0].to), (0, 3));
}

#[test]
fn test_edge_quoted_empty_word() {
    assert_eq!(
        kinds(b"\"\""),
        vec![TokenKind::Part, TokenKind::Word, TokenKind::Cmd]
    );
}

#[test]
fn test_edge_closing_brace_first_in_quote_errors() {
    // A bare close delimiter errors even directly after an opening quote.
    assert_eq!(kinds(b"\"}x\""), vec![TokenKind::Part, TokenKind::Error]);
}

#[test]
fn test_edge_dollar_then_terminator_lexes_as_command_end() {
    // The variable sub-lexer sees the terminator and yields Cmd.
    let mut flags = Flags::default();
    let t = next_token(b"$;", 0, &mut flags);
    assert_eq!(t.kind, TokenKind::Cmd);
    assert_eq!(t.to, 2);
}

#[test]
fn test_edge_flags_restored_after_variable() {
    let mut flags = Flags::default();
    let t = next_token(b"$abc rest", 0, &mut flags);
    assert_eq!(t.kind, TokenKind::Word);
    assert!(!flags.quote);
    assert!(!flags.var_name);
}

#[cfg(test)]
mod props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The tokenizer terminates on arbitrary byte soup and never
        /// yields more tokens than bytes (plus the virtual terminator).
        #[test]
        fn prop_tokenizer_terminates(src in proptest::collection::vec(any::<u8>(), 0..256)) {
            let count = Tokenizer::new(&src).count();
            prop_assert!(count <= src.len() + 1);
        }

        /// Lexing is deterministic: the same bytes and flags produce the
        /// same token and advanced position.
        #[test]
        fn prop_lexer_deterministic(
            src in proptest::collection::vec(any::<u8>(), 0..256),
            quote in any::<bool>(),
            var_name in any::<bool>(),
            no_comment in any::<bool>(),
        ) {
            let start = Flags { quote, var_name, no_comment };
            let mut f1 = start;
            let mut f2 = start;
            let t1 = next_token(&src, 0, &mut f1);
            let t2 = next_token(&src, 0, &mut f2);
            prop_assert_eq!(t1, t2);
            prop_assert_eq!(f1, f2);
        }

        /// Every non-error token stays within the buffer plus the
        /// virtual terminator.
        #[test]
        fn prop_spans_in_bounds(src in proptest::collection::vec(any::<u8>(), 0..256)) {
            for t in Tokenizer::new(&src) {
                prop_assert!(t.from <= src.len() + 1);
                prop_assert!(t.to <= src.len() + 1);
                prop_assert!(t.from <= t.to);
            }
        }
    }
}

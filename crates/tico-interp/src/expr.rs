//! The integer expression sublanguage behind `expr`.
//!
//! A Pratt evaluator with one token of lookahead: binding powers select
//! which operators a recursion level may consume, left-associative
//! operators bind their right side one step tighter, and `**` binds
//! right-associatively at its own level. Values are computed on the fly
//! rather than building a tree; `&&` and `||` still parse their right
//! side when short-circuited, but evaluate it dead.

use thiserror::Error;

use tico_lex::{is_operator, is_space, is_special};

use crate::interp::Interp;
use crate::value::scan_integer;

/// Errors of the expression sublanguage. All of them surface to the
/// interpreter as the single expression error kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub(crate) enum ExprError {
    #[error("number expected")]
    NumExpected,
    #[error("invalid number syntax")]
    InvalidNumber,
    #[error("unbalanced parentheses")]
    Parentheses,
    #[error("extra characters after expression")]
    ExtraChars,
    #[error("invalid character in expression")]
    InvalidChar,
    #[error("division by zero")]
    DivideByZero,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    End,
    Number(i64),
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Not,
    BitNot,
    LParen,
    RParen,
    LBrace,
    RBrace,
    /// A lone `=`; lexes like an operator byte but parses nowhere.
    Assign,
}

/// Binding power levels, lowest to highest. Higher numbers bind
/// tighter.
mod bp {
    pub const MIN: u8 = 0;
    pub const LOGICAL_OR: u8 = 2;
    pub const LOGICAL_AND: u8 = 4;
    pub const BITWISE_OR: u8 = 6;
    pub const BITWISE_XOR: u8 = 8;
    pub const BITWISE_AND: u8 = 10;
    pub const EQUALITY: u8 = 12;
    pub const RELATIONAL: u8 = 14;
    pub const SHIFT: u8 = 16;
    pub const ADDITIVE: u8 = 18;
    pub const MULTIPLICATIVE: u8 = 20;
    pub const POWER: u8 = 22;
}

/// Left and right binding power of a binary operator.
///
/// Left-associative levels bind the right side one tighter; `**` keeps
/// its own level on the right, making it right-associative.
fn binary_bp(tok: Token) -> Option<(u8, u8)> {
    use Token::*;
    Some(match tok {
        Or => (bp::LOGICAL_OR, bp::LOGICAL_OR + 1),
        And => (bp::LOGICAL_AND, bp::LOGICAL_AND + 1),
        BitOr => (bp::BITWISE_OR, bp::BITWISE_OR + 1),
        BitXor => (bp::BITWISE_XOR, bp::BITWISE_XOR + 1),
        BitAnd => (bp::BITWISE_AND, bp::BITWISE_AND + 1),
        Eq | Ne => (bp::EQUALITY, bp::EQUALITY + 1),
        Lt | Gt | Le | Ge => (bp::RELATIONAL, bp::RELATIONAL + 1),
        Shl | Shr => (bp::SHIFT, bp::SHIFT + 1),
        Add | Sub => (bp::ADDITIVE, bp::ADDITIVE + 1),
        Mul | Div | Rem => (bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1),
        Pow => (bp::POWER, bp::POWER),
        _ => return None,
    })
}

struct ExprParser<'a, 'i> {
    src: &'a [u8],
    pos: usize,
    peeked: Option<Token>,
    error: Option<ExprError>,
    interp: &'i mut Interp,
}

impl<'a, 'i> ExprParser<'a, 'i> {
    fn set_error(&mut self, error: ExprError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
        // Forcibly end parsing.
        self.pos = self.src.len();
        self.peeked = None;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len() || self.src[self.pos] == 0
    }

    fn skip_ws(&mut self) {
        while self.pos < self.src.len() {
            let b = self.src[self.pos];
            if b == 0 || b > b' ' {
                break;
            }
            self.pos += 1;
        }
    }

    fn peek(&mut self, live: bool) -> Token {
        match self.peeked {
            Some(tok) => tok,
            None => {
                let tok = self.lex(live);
                self.peeked = Some(tok);
                tok
            }
        }
    }

    fn next(&mut self, live: bool) -> Token {
        match self.peeked.take() {
            Some(tok) => tok,
            None => self.lex(live),
        }
    }

    fn lex(&mut self, live: bool) -> Token {
        if self.at_end() {
            return Token::End;
        }
        let c = self.src[self.pos];
        if b"|&^~<>=!-+*/%(){}".contains(&c) {
            self.pos += 1;
            let follow = self.src.get(self.pos).copied();
            let tok = match (c, follow) {
                (b'|', Some(b'|')) => {
                    self.pos += 1;
                    Token::Or
                }
                (b'|', _) => Token::BitOr,
                (b'&', Some(b'&')) => {
                    self.pos += 1;
                    Token::And
                }
                (b'&', _) => Token::BitAnd,
                (b'=', Some(b'=')) => {
                    self.pos += 1;
                    Token::Eq
                }
                (b'=', _) => Token::Assign,
                (b'!', Some(b'=')) => {
                    self.pos += 1;
                    Token::Ne
                }
                (b'!', _) => Token::Not,
                (b'<', Some(b'=')) => {
                    self.pos += 1;
                    Token::Le
                }
                (b'<', Some(b'<')) => {
                    self.pos += 1;
                    Token::Shl
                }
                (b'<', _) => Token::Lt,
                (b'>', Some(b'=')) => {
                    self.pos += 1;
                    Token::Ge
                }
                (b'>', Some(b'>')) => {
                    self.pos += 1;
                    Token::Shr
                }
                (b'>', _) => Token::Gt,
                (b'*', Some(b'*')) => {
                    self.pos += 1;
                    Token::Pow
                }
                (b'*', _) => Token::Mul,
                (b'^', _) => Token::BitXor,
                (b'~', _) => Token::BitNot,
                (b'-', _) => Token::Sub,
                (b'+', _) => Token::Add,
                (b'/', _) => Token::Div,
                (b'%', _) => Token::Rem,
                (b'(', _) => Token::LParen,
                (b')', _) => Token::RParen,
                (b'{', _) => Token::LBrace,
                (b'}', _) => Token::RBrace,
                _ => unreachable!("operator byte covered above"),
            };
            self.skip_ws();
            tok
        } else if c.is_ascii_digit() {
            let v = scan_integer(self.src, &mut self.pos, 0);
            if self
                .src
                .get(self.pos)
                .is_some_and(|&b| b.is_ascii_alphabetic() || b == b'.' || b == b',')
            {
                self.set_error(ExprError::InvalidNumber);
                return Token::End;
            }
            self.skip_ws();
            Token::Number(v)
        } else if c == b'$' {
            self.pos += 1;
            let (start, end) = if self.src.get(self.pos) == Some(&b'{') {
                self.pos += 1;
                let start = self.pos;
                while self.pos < self.src.len()
                    && self.src[self.pos] != b'}'
                    && self.src[self.pos] != 0
                {
                    self.pos += 1;
                }
                if self.src.get(self.pos) != Some(&b'}') {
                    self.set_error(ExprError::InvalidChar);
                    return Token::End;
                }
                let end = self.pos;
                self.pos += 1;
                (start, end)
            } else {
                let start = self.pos;
                while self.pos < self.src.len() {
                    let b = self.src[self.pos];
                    if is_space(b) || is_operator(b) || is_special(b, false) {
                        break;
                    }
                    self.pos += 1;
                }
                (start, self.pos)
            };
            let name = self.src[start..end].to_vec();
            self.skip_ws();
            // The variable's value is re-parsed as a decimal integer.
            // Dead branches of && / || do not read variables at all.
            let v = if live {
                let value = self.interp.var(&name, None);
                let mut p = 0;
                scan_integer(value.bytes(), &mut p, 10)
            } else {
                0
            };
            Token::Number(v)
        } else {
            self.set_error(ExprError::InvalidChar);
            Token::End
        }
    }

    fn parse_primary(&mut self, live: bool) -> i64 {
        match self.next(live) {
            Token::Sub => self.parse_primary(live).wrapping_neg(),
            Token::Add => self.parse_primary(live),
            Token::Not => (self.parse_primary(live) == 0) as i64,
            Token::BitNot => !self.parse_primary(live),
            open @ (Token::LParen | Token::LBrace) => {
                let close = if open == Token::LParen {
                    Token::RParen
                } else {
                    Token::RBrace
                };
                let v = self.parse_bp(bp::MIN, live);
                if self.next(live) != close {
                    self.set_error(ExprError::Parentheses);
                }
                v
            }
            Token::Number(v) => v,
            _ => {
                self.set_error(ExprError::NumExpected);
                0
            }
        }
    }

    fn parse_bp(&mut self, min_bp: u8, live: bool) -> i64 {
        let mut lhs = self.parse_primary(live);
        loop {
            let tok = self.peek(live);
            let Some((lbp, rbp)) = binary_bp(tok) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            self.peeked = None;
            let rhs_live = match tok {
                Token::And => live && lhs != 0,
                Token::Or => live && lhs == 0,
                _ => live,
            };
            let rhs = self.parse_bp(rbp, rhs_live);
            lhs = self.apply(tok, lhs, rhs, rhs_live);
        }
        lhs
    }

    /// Combine two operands. `rhs_live` is false inside a
    /// short-circuited branch, in which case division by zero is not an
    /// error (the branch contributes nothing).
    fn apply(&mut self, op: Token, lhs: i64, rhs: i64, rhs_live: bool) -> i64 {
        use Token::*;
        match op {
            Or => (lhs != 0 || rhs != 0) as i64,
            And => (lhs != 0 && rhs != 0) as i64,
            BitOr => lhs | rhs,
            BitXor => lhs ^ rhs,
            BitAnd => lhs & rhs,
            Eq => (lhs == rhs) as i64,
            Ne => (lhs != rhs) as i64,
            Lt => (lhs < rhs) as i64,
            Gt => (lhs > rhs) as i64,
            Le => (lhs <= rhs) as i64,
            Ge => (lhs >= rhs) as i64,
            // Shift counts are masked to the word width, not checked.
            Shl => lhs.wrapping_shl(rhs as u32),
            Shr => lhs.wrapping_shr(rhs as u32),
            Add => lhs.wrapping_add(rhs),
            Sub => lhs.wrapping_sub(rhs),
            Mul => lhs.wrapping_mul(rhs),
            Div | Rem => {
                if rhs == 0 {
                    if rhs_live {
                        self.set_error(ExprError::DivideByZero);
                    }
                    0
                } else if op == Div {
                    lhs.wrapping_div(rhs)
                } else {
                    lhs.wrapping_rem(rhs)
                }
            }
            Pow => {
                if rhs < 0 {
                    0
                } else {
                    let mut v: i64 = 1;
                    for _ in 0..rhs {
                        v = v.wrapping_mul(lhs);
                    }
                    v
                }
            }
            _ => lhs,
        }
    }
}

/// Evaluate `src` as an integer expression against `interp`'s
/// variables.
pub(crate) fn eval(interp: &mut Interp, src: &[u8]) -> Result<i64, ExprError> {
    let mut parser = ExprParser {
        src,
        pos: 0,
        peeked: None,
        error: None,
        interp,
    };
    parser.skip_ws();
    let v = parser.parse_bp(bp::MIN, true);
    if parser.error.is_none() {
        match parser.next(true) {
            Token::End => {}
            Token::RParen => parser.set_error(ExprError::Parentheses),
            _ => parser.set_error(ExprError::ExtraChars),
        }
    }
    match parser.error {
        Some(error) => Err(error),
        None => Ok(v),
    }
}

// SPDX: CC0-1.0

use crate::eval::OperatorTyp;
use core::{fmt, iter::Peekable, str::CharIndices};
use std::sync::Arc;

/// Byte span of one expression's source text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubStr {
    // shared with every token of the same expression
    src: Arc<String>,
    start: usize,
    end: usize,
}

impl SubStr {
    pub fn new(src: Arc<String>, start: usize, end: usize) -> Self {
        Self { src, start, end }
    }

    pub fn all(src: Arc<String>) -> Self {
        let end = src.len();
        Self::new(src, 0, end)
    }

    /// Zero-width span just past the end of the source.
    pub fn end_of(src: Arc<String>) -> Self {
        let start = src.len();
        Self::new(src, start, start)
    }

    /// Whole text the span points into.
    pub fn source(&self) -> &str {
        &self.src
    }

    /// Characters preceding the span, for aligning carets under it.
    pub fn column(&self) -> usize {
        self.src[..self.start].chars().count()
    }

    /// Width of the span in characters.
    pub fn width(&self) -> usize {
        self.get().chars().count()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn get(&self) -> &str {
        &self.src[self.start..self.end]
    }

    /// Smallest span covering both `self` and `other`.
    pub fn join(&self, other: &Self) -> Self {
        Self::new(
            Arc::clone(&self.src),
            self.start.min(other.start),
            self.end.max(other.end),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokTyp {
    Ident,
    Number,
    Op(OperatorTyp),
    Comma,
    OpenParen,
    CloseParen,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tok {
    pub typ: TokTyp,
    pub loc: SubStr,
}

/// Symbols that commonly appear in pasted formulas but have no meaning
/// in an expression of x.
const UNSUPPORTED: &[char] = &['<', '>', '=', '|', '[', ']', '{', '}'];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LexErrTyp {
    InvalidChar,
    Unsupported(char),
}

impl fmt::Display for LexErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChar => write!(f, "invalid character"),
            Self::Unsupported(chr) => write!(f, "unsupported character '{chr}'"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LexErr {
    pub typ: LexErrTyp,
    pub loc: SubStr,
}

/// Splits an expression into tokens. Yields nothing more after the first
/// error.
#[derive(Debug)]
pub struct Lexer<'src> {
    src: &'src Arc<String>,
    chars: Peekable<CharIndices<'src>>,
    done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src Arc<String>) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
            done: false,
        }
    }

    pub fn src(&self) -> &Arc<String> {
        self.src
    }

    fn span(&self, start: usize, end: usize) -> SubStr {
        SubStr::new(Arc::clone(self.src), start, end)
    }

    /// Advances past every character matching `predicate` and returns the
    /// byte offset just after the last one.
    fn skip_while(&mut self, start: usize, predicate: impl Fn(char) -> bool) -> usize {
        let mut end = start;
        while let Some(&(idx, chr)) = self.chars.peek() {
            if !predicate(chr) {
                break;
            }
            end = idx + chr.len_utf8();
            self.chars.next();
        }
        end
    }

    fn symbol(chr: char) -> Option<TokTyp> {
        Some(match chr {
            '+' => TokTyp::Op(OperatorTyp::Add),
            '-' => TokTyp::Op(OperatorTyp::Sub),
            '*' => TokTyp::Op(OperatorTyp::Mul),
            '/' => TokTyp::Op(OperatorTyp::Div),
            '^' => TokTyp::Op(OperatorTyp::Pow),
            ',' => TokTyp::Comma,
            '(' => TokTyp::OpenParen,
            ')' => TokTyp::CloseParen,
            _ => return None,
        })
    }

    fn fail(&mut self, typ: LexErrTyp, loc: SubStr) -> Option<Result<Tok, LexErr>> {
        self.done = true;
        Some(Err(LexErr { typ, loc }))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Tok, LexErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.skip_while(0, char::is_whitespace);

        let (start, chr) = self.chars.peek().copied()?;
        let typ = if let Some(typ) = Self::symbol(chr) {
            self.chars.next();
            typ
        } else if chr.is_ascii_alphabetic() {
            TokTyp::Ident
        } else if chr.is_ascii_digit() || chr == '.' {
            TokTyp::Number
        } else {
            let loc = self.span(start, start + chr.len_utf8());
            let typ = if UNSUPPORTED.contains(&chr) {
                LexErrTyp::Unsupported(chr)
            } else {
                LexErrTyp::InvalidChar
            };
            return self.fail(typ, loc);
        };

        let end = match typ {
            TokTyp::Ident => self.skip_while(start, |c| c.is_ascii_alphabetic()),
            TokTyp::Number => self.skip_while(start, |c| c.is_ascii_digit() || c == '.'),
            _ => start + chr.len_utf8(),
        };
        Some(Ok(Tok {
            typ,
            loc: self.span(start, end),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Result<(TokTyp, String), LexErrTyp>> {
        let src = Arc::new(src.to_string());
        Lexer::new(&src)
            .map(|tok| {
                tok.map(|t| (t.typ, t.loc.get().to_string()))
                    .map_err(|e| e.typ)
            })
            .collect()
    }

    #[test]
    fn splits_operators_idents_and_numbers() {
        let toks = lex("a*x^2 + 3.5");
        let typs: Vec<TokTyp> = toks.iter().map(|t| t.clone().unwrap().0).collect();
        assert_eq!(
            typs,
            [
                TokTyp::Ident,
                TokTyp::Op(OperatorTyp::Mul),
                TokTyp::Ident,
                TokTyp::Op(OperatorTyp::Pow),
                TokTyp::Number,
                TokTyp::Op(OperatorTyp::Add),
                TokTyp::Number,
            ]
        );
        assert_eq!(toks[6].clone().unwrap().1, "3.5");
    }

    #[test]
    fn keeps_last_token_at_end_of_input() {
        let toks = lex("sin");
        assert_eq!(toks, [Ok((TokTyp::Ident, String::from("sin")))]);
    }

    #[test]
    fn stops_after_invalid_char() {
        let toks = lex("x $ y");
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[1], Err(LexErrTyp::InvalidChar));
    }

    #[test]
    fn flags_unsupported_symbols() {
        let toks = lex("x = 2");
        assert_eq!(toks[1], Err(LexErrTyp::Unsupported('=')));
        assert_eq!(toks.len(), 2);
    }

    #[test]
    fn spans_count_characters_for_carets() {
        let src = Arc::new(String::from("π + x"));
        // 'π' is not a valid character
        let err = Lexer::new(&src).next().unwrap().unwrap_err();
        assert_eq!((err.loc.column(), err.loc.width()), (0, 1));

        let src = Arc::new(String::from("2 * sin"));
        let sin = Lexer::new(&src).nth(2).unwrap().unwrap();
        assert_eq!(sin.loc.get(), "sin");
        assert_eq!((sin.loc.column(), sin.loc.width()), (4, 3));
    }
}

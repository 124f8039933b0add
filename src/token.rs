use std::{fmt, ops::Range};

#[derive(Copy, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Token {
    pub kind: TokenKind,
    lo: usize,
    len: u32,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Token {
        Token {
            kind,
            len: span.len,
            lo: span.lo,
        }
    }

    /// The EOF token for the provided source, positioned one past its end.
    pub fn eof_for(src: &str) -> Token {
        Token::new(TokenKind::Eof, Span::new_of_length(src.len(), 0))
    }

    pub fn span(&self) -> Span {
        Span {
            len: self.len,
            lo: self.lo,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {})", self.kind, self.span())
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Span {
    pub len: u32,
    pub lo: usize,
}

impl Span {
    pub fn new_of_bounds(Range { start: lo, end: hi }: Range<usize>) -> Span {
        debug_assert!(hi >= lo);
        Self::new_of_length(lo, u32::try_from(hi - lo).unwrap())
    }

    pub fn new_of_length(lo: usize, len: u32) -> Span {
        Span { len, lo }
    }

    /// A span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        let lo = self.lo.min(other.lo);
        let hi = (self.lo + self.len as usize).max(other.lo + other.len as usize);
        Span::new_of_bounds(lo..hi)
    }

    /// Shrinks the span by the provided amounts, e.g. `offset(1, -1)` strips
    /// one delimiter from each end.
    pub fn offset(&self, lo: u32, hi: i32) -> Span {
        let len = u32::try_from(i64::from(self.len) + i64::from(hi) - i64::from(lo)).unwrap();
        Span::new_of_length(self.lo + lo as usize, len)
    }

    pub fn substr<'src>(&self, src: &'src str) -> &'src str {
        let lo = self.lo;
        let hi = lo + self.len as usize;
        &src[lo..hi]
    }

    /// One-based line and column of the span's start within `src`.
    pub fn line_column(&self, src: &str) -> (u32, u32) {
        let upto = &src[..self.lo.min(src.len())];
        let line = u32::try_from(upto.matches('\n').count()).unwrap() + 1;
        let line_start = upto.rfind('\n').map_or(0, |i| i + 1);
        let column = u32::try_from(upto[line_start..].chars().count()).unwrap() + 1;
        (line, column)
    }

    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { span: self, inner }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({self}, len: {})", self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = self.lo;
        let hi = lo + self.len as usize;
        write!(f, "{lo}..{hi}")
    }
}

/// A value paired with the source span it originated from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub inner: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Print,

    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Semicolon,
    Comma,

    Identifier,
    Int,
    Float,
    Char,

    Eof,
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "print" => TokenKind::Print,
};

use std::iter::Peekable;

use crate::token::{Span, Spanned, Token, TokenKind, KEYWORDS};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 8_192;

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Lexes the provided string, producing the tokens into the provided buffer.
///
/// The first invalid piece of input aborts lexing; the buffer then holds the
/// tokens produced up to that point.
pub fn lex(src: &str, tokens: &mut Vec<Token>) -> Result<()> {
    Lexer::new(src, tokens).lex()
}

/// A convenience function that allocates a new buffer per lexed input and
/// returns it.
pub fn lex_in_new(src: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY);
    lex(src, &mut tokens)?;
    Ok(tokens)
}

/// The chirp lexer
struct Lexer<'src, 'tok> {
    src: &'src str,
    iter: Peekable<std::str::Chars<'src>>,
    cursor: usize,
    current_lo: usize,
    tokens: &'tok mut Vec<Token>,
}

impl Lexer<'_, '_> {
    /// Scans the source string until the input is exhausted.
    ///
    /// Tokens are written into the provided tokens buffer. Whitespace and
    /// comments are consumed but never produced.
    fn lex(mut self) -> Result<()> {
        assert_eq!(self.tokens.len(), 0, "must pass clean tokens buffer");
        loop {
            let Some(next) = self.scan_token_kind()? else {
                continue;
            };
            let is_eof = matches!(next, TokenKind::Eof);
            self.produce(next);
            if is_eof {
                break Ok(());
            }
        }
    }

    /// Tries to scan the current character. Returns `None` for trivia.
    fn scan_token_kind(&mut self) -> Result<Option<TokenKind>> {
        use TokenKind::*;
        let kind = match self.mark_advance() {
            '\0' => Eof,
            '+' => Plus,
            '-' => Minus,
            '*' => Star,
            '/' => match self.peek() {
                '/' => return self.line_comment(),
                '*' => return self.block_comment(),
                _ => Slash,
            },
            '(' => LParen,
            ')' => RParen,
            ';' => Semicolon,
            ',' => Comma,
            '\'' => self.char_literal()?,
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier_or_keyword(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_whitespace() => return self.whitespace(),
            c => return Err(self.span().wrap(Error::UnexpectedChar(c))),
        };
        Ok(Some(kind))
    }

    fn identifier_or_keyword(&mut self) -> TokenKind {
        let valid_identifier_suffix = |c: char| c.is_ascii_alphanumeric() || c == '_';
        while valid_identifier_suffix(self.peek()) {
            self.advance();
        }
        match KEYWORDS.get(self.substr()).copied() {
            Some(keyword) => keyword,
            None => TokenKind::Identifier,
        }
    }

    /// A digit run is an int; a digit run with a single decimal point is a
    /// float. A leading sign is never part of the literal.
    fn number(&mut self) -> TokenKind {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == '.' {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
            return TokenKind::Float;
        }
        TokenKind::Int
    }

    fn char_literal(&mut self) -> Result<TokenKind> {
        // The opening quote has already been consumed.
        match self.advance() {
            '\0' | '\n' => return Err(self.span().wrap(Error::UnclosedChar)),
            '\'' => return Err(self.span().wrap(Error::EmptyChar)),
            '\\' => {
                let escape = self.advance();
                if !matches!(escape, 'n' | 't' | '\\' | '\'' | '0') {
                    return Err(self.span().wrap(Error::InvalidEscape(escape)));
                }
            }
            _ => (),
        }
        if self.advance() != '\'' {
            return Err(self.span().wrap(Error::UnclosedChar));
        }
        Ok(TokenKind::Char)
    }

    fn whitespace(&mut self) -> Result<Option<TokenKind>> {
        while self.peek().is_ascii_whitespace() {
            self.advance();
        }
        Ok(None)
    }

    fn line_comment(&mut self) -> Result<Option<TokenKind>> {
        assert_eq!(self.advance(), '/');
        while !matches!(self.peek(), '\n' | '\0') {
            self.advance();
        }
        Ok(None)
    }

    fn block_comment(&mut self) -> Result<Option<TokenKind>> {
        assert_eq!(self.advance(), '*');
        loop {
            match self.advance() {
                '\0' => return Err(self.span().wrap(Error::UnclosedComment)),
                '*' if self.peek() == '/' => {
                    self.advance();
                    return Ok(None);
                }
                _ => (),
            }
        }
    }
}

impl Lexer<'_, '_> {
    /// Constructs a new lexer with the default state.
    fn new<'src, 'tok>(src: &'src str, tokens: &'tok mut Vec<Token>) -> Lexer<'src, 'tok> {
        Lexer {
            src,
            iter: src.chars().peekable(),
            cursor: 0,
            current_lo: 0,
            tokens,
        }
    }

    /// Starts a new token "mark" and advances the iterator.
    fn mark_advance(&mut self) -> char {
        self.current_lo = self.cursor;
        self.advance()
    }

    /// Returns the next character and advances the iterator.
    fn advance(&mut self) -> char {
        self.iter
            .next()
            .inspect(|c| self.cursor += c.len_utf8())
            .unwrap_or('\0')
    }

    /// Returns the next character without advancing the iterator.
    fn peek(&mut self) -> char {
        self.iter.peek().copied().unwrap_or('\0')
    }

    /// Returns the current span.
    fn span(&self) -> Span {
        Span::new_of_bounds(self.current_lo..self.cursor)
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &str {
        self.span().substr(self.src)
    }

    /// Produces a token using the marked bounds.
    fn produce(&mut self, kind: TokenKind) {
        self.tokens.push(Token::new(kind, self.span()));
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    UnexpectedChar(char),
    UnclosedComment,
    UnclosedChar,
    EmptyChar,
    InvalidEscape(char),
}

pub mod extract {
    use std::num::ParseIntError;

    use super::*;

    pub fn int(token: Token, src: &str) -> Result<i64, ParseIntError> {
        debug_assert_eq!(token.kind, TokenKind::Int);
        token.span().substr(src).parse()
    }

    pub fn float(token: Token, src: &str) -> f64 {
        debug_assert_eq!(token.kind, TokenKind::Float);
        let text = token.span().substr(src);
        text.parse().expect("digit runs with a dot always parse")
    }

    pub fn ident(token: Token, src: &str) -> Box<str> {
        debug_assert_eq!(token.kind, TokenKind::Identifier);
        token.span().substr(src).to_string().into_boxed_str()
    }

    pub fn char_lit(token: Token, src: &str) -> char {
        debug_assert_eq!(token.kind, TokenKind::Char);
        let inner = token.span().offset(1, -1).substr(src);
        let mut chars = inner.chars();
        match chars.next().expect("char token is never empty") {
            '\\' => match chars.next().expect("escape is never empty") {
                'n' => '\n',
                't' => '\t',
                '\\' => '\\',
                '\'' => '\'',
                '0' => '\0',
                other => unreachable!("escape {other:?} rejected by the lexer"),
            },
            c => c,
        }
    }
}

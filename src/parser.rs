use crate::{
    ast::{BinaryOperator, Expr, ExprKind, Ident, Program, Statement, UnaryOperator, Untyped},
    lexer::{self, extract},
    token::{Spanned, Token, TokenKind},
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Parses a whole program. The first error aborts the parse.
pub fn parse_program(src: &str, tokens: &mut Vec<Token>) -> Result<Program<Untyped>> {
    parse(src, tokens, Parser::parse_program)
}

/// Parses a single expression spanning the whole input.
pub fn parse_expr(src: &str, tokens: &mut Vec<Token>) -> Result<Expr<Untyped>> {
    parse(src, tokens, Parser::parse_expr)
}

fn parse<'src, 'tok, T>(
    src: &'src str,
    tokens: &'tok mut Vec<Token>,
    f: impl for<'a> FnOnce(&'a mut Parser<'src, 'tok>) -> Result<T>,
) -> Result<T> {
    assert!(tokens.is_empty());

    lexer::lex(src, tokens).map_err(|e| e.span.wrap(Error::Lexer(e.inner)))?;
    let mut p = Parser::new(src, tokens);
    let parsed = f(&mut p)?;
    p.consume(TokenKind::Eof)?;
    Ok(parsed)
}

struct Parser<'src, 'tok> {
    src: &'src str,
    tokens: &'tok [Token],
    cursor: usize,
}

impl Parser<'_, '_> {
    fn parse_program(&mut self) -> Result<Program<Untyped>> {
        let mut statements = Vec::with_capacity(8);
        while self.except([]) {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Statement<Untyped>> {
        let start = self.consume(TokenKind::Print)?;
        let expr = self.parse_expr()?;
        let end = self.consume(TokenKind::Semicolon)?;
        Ok(Statement::Print {
            expr,
            span: start.span().to(end.span()),
        })
    }

    fn parse_expr(&mut self) -> Result<Expr<Untyped>> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr<Untyped>> {
        let lhs_token = self.advance();
        let mut lhs = self.parse_nud(lhs_token)?;

        loop {
            let op_token = self.peek();

            if let Some((lbp, rbp)) = Self::infix_binding_power(op_token.kind) {
                if lbp < min_bp {
                    // Operator binds less tightly than the minimum required
                    break;
                }

                self.advance(); // Operator
                lhs = self.parse_led(op_token, lhs, rbp)?;
            } else {
                // Not an infix operator
                break;
            }
        }

        Ok(lhs)
    }

    /// nud: Parses tokens that start an expression
    /// (prefix operators, literals, calls, grouping)
    fn parse_nud(&mut self, token: Token) -> Result<Expr<Untyped>> {
        let (kind, span) = match token.kind {
            TokenKind::Int => {
                let Ok(parsed) = extract::int(token, self.src) else {
                    return Err(token.span().wrap(Error::ParseInt));
                };
                (ExprKind::Int(parsed), token.span())
            }
            TokenKind::Float => (
                ExprKind::Float(extract::float(token, self.src)),
                token.span(),
            ),
            TokenKind::Char => (
                ExprKind::Char(extract::char_lit(token, self.src)),
                token.span(),
            ),

            // Call: the only place an identifier may appear
            TokenKind::Identifier => {
                let callee = Ident {
                    name: extract::ident(token, self.src),
                    span: token.span(),
                };
                self.consume(TokenKind::LParen)?;
                let args =
                    self.parse_list(TokenKind::RParen, TokenKind::Comma, Parser::parse_expr)?;
                let end = self.consume(TokenKind::RParen)?;
                (
                    ExprKind::Call { callee, args },
                    token.span().to(end.span()),
                )
            }

            // Grouping: ( expr )
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                let end = self.consume(TokenKind::RParen)?;
                (ExprKind::Paren(Box::new(expr)), token.span().to(end.span()))
            }

            // Prefix operators: -, +
            kind @ (TokenKind::Minus | TokenKind::Plus) => {
                let op = match kind {
                    TokenKind::Minus => UnaryOperator::Neg,
                    _ => UnaryOperator::Plus,
                };
                // SAFETY: Should have prefix due to above match
                let ((), rbp) = Self::prefix_binding_power(kind).unwrap();

                let expr = self.parse_expr_bp(rbp)?;

                let span = token.span().to(expr.span);
                let unary = ExprKind::Unary {
                    op,
                    expr: Box::new(expr),
                };
                (unary, span)
            }

            other => {
                let error = Error::UnexpectedTokenInExpr { token: other };
                return Err(token.span().wrap(error));
            }
        };

        Ok(Expr {
            kind,
            span,
            info: (),
        })
    }

    /// led: Parses the infix operators that follow a left-hand-side expression
    fn parse_led(&mut self, op_token: Token, lhs: Expr<Untyped>, rbp: u8) -> Result<Expr<Untyped>> {
        let op = match op_token.kind {
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Sub,
            TokenKind::Star => BinaryOperator::Mul,
            TokenKind::Slash => BinaryOperator::Div,
            other => unreachable!("{other:?} is not an infix operator"),
        };
        // Parse right operand with correct precedence
        let rhs = self.parse_expr_bp(rbp)?;

        let span = lhs.span.to(rhs.span);
        let binary = ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
        Ok(Expr {
            kind: binary,
            span,
            info: (),
        })
    }

    /// Parses `item (delim item)*` until `end_delim` is found. Does **NOT**
    /// consume the end delimiter.
    fn parse_list<T>(
        &mut self,
        end_delim: TokenKind,
        separator: TokenKind,
        parse_item: impl Fn(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        debug_assert_ne!(end_delim, separator);

        let mut items = Vec::new();
        while self.except([end_delim]) {
            items.push(parse_item(self)?);
            // Without a separator the list must be over; the caller's consume
            // of the end delimiter reports the error otherwise.
            if !self.take(separator) {
                break;
            }
        }
        Ok(items)
    }

    fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8)> {
        let bp = match kind {
            // Addition/Subtraction (left-associative)
            TokenKind::Plus | TokenKind::Minus => (1, 2),

            // Multiplication/Division (left-associative)
            TokenKind::Star | TokenKind::Slash => (3, 4),

            _ => return None,
        };
        Some(bp)
    }

    // Prefix operators bind tighter than any infix operator.
    fn prefix_binding_power(kind: TokenKind) -> Option<((), u8)> {
        match kind {
            TokenKind::Minus | TokenKind::Plus => Some(((), 5)),
            _ => None,
        }
    }
}

impl Parser<'_, '_> {
    fn new<'src, 'tok>(src: &'src str, tokens: &'tok [Token]) -> Parser<'src, 'tok> {
        Parser {
            src,
            tokens,
            cursor: 0,
        }
    }

    /// Returns the current token.
    #[inline]
    fn peek(&self) -> Token {
        match self.tokens.get(self.cursor) {
            Some(token) => *token,
            None => Token::eof_for(self.src),
        }
    }

    /// Returns the current token and advances.
    fn advance(&mut self) -> Token {
        let c = self.peek();
        self.cursor += 1;
        c
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one. If not, fails.
    fn consume(&mut self, expect: TokenKind) -> Result<Token> {
        let c = self.peek();
        if self.is(expect) {
            self.advance();
            Ok(c)
        } else {
            Err(c.span().wrap(Error::Unexpected {
                actual: c.kind,
                expected: expect,
            }))
        }
    }

    /// Returns true while the current token does *not* match one of the
    /// provided ones. [`TokenKind::Eof`] is implicitly included in the list.
    ///
    /// This won't advance the cursor.
    fn except(&mut self, except: impl IntoIterator<Item = TokenKind>) -> bool {
        let c = self.peek();
        for e in except {
            if c.kind == e {
                return false;
            }
        }
        c.kind != TokenKind::Eof
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    UnexpectedTokenInExpr {
        token: TokenKind,
    },
    Unexpected {
        actual: TokenKind,
        expected: TokenKind,
    },
    ParseInt,
    /// The lexer failed before the parser saw a single token.
    Lexer(lexer::Error),
}

#[cfg(test)]
mod tests {
    use crate::util::test_utils::tree_tests;

    tree_tests!(
        use parser;

        fn test_integer_literal_expr() {
            let expr = "12345";
            let tree_ok = "int 12345 (0..5)";
        }

        fn test_float_literal_expr() {
            let expr = "2.5";
            let tree_ok = "float 2.5 (0..3)";
        }

        fn test_char_literal_expr() {
            let expr = "'a'";
            let tree_ok = "char 'a' (0..3)";
        }

        fn test_escaped_char_literal_expr() {
            let expr = r"'\n'";
            let tree_ok = r"char '\n' (0..4)";
        }

        fn test_parenthesized_expr() {
            let expr = "(1)";
            let tree_ok = "
                paren (0..3)
                  int 1 (1..2)
            ";
        }

        fn test_unary_negation_expr() {
            let expr = "-7";
            let tree_ok = "
                unary Neg (0..2)
                  int 7 (1..2)
            ";
        }

        fn test_unary_plus_expr() {
            let expr = "+7";
            let tree_ok = "
                unary Plus (0..2)
                  int 7 (1..2)
            ";
        }

        fn test_double_negation_expr() {
            let expr = "--7";
            let tree_ok = "
                unary Neg (0..3)
                  unary Neg (1..3)
                    int 7 (2..3)
            ";
        }

        fn test_binary_addition_expr() {
            let expr = "1 + 2";
            let tree_ok = "
                binary Add (0..5)
                  int 1 (0..1)
                  int 2 (4..5)
            ";
        }

        fn test_binary_division_expr() {
            let expr = "1 / 2";
            let tree_ok = "
                binary Div (0..5)
                  int 1 (0..1)
                  int 2 (4..5)
            ";
        }

        fn test_equal_precedence_associates_left() {
            let expr = "1 - 2 - 3";
            let tree_ok = "
                binary Sub (0..9)
                  binary Sub (0..5)
                    int 1 (0..1)
                    int 2 (4..5)
                  int 3 (8..9)
            ";
        }

        fn test_precedence_mul_over_add() {
            let expr = "1 + 2 * 3";
            let tree_ok = "
                binary Add (0..9)
                  int 1 (0..1)
                  binary Mul (4..9)
                    int 2 (4..5)
                    int 3 (8..9)
            ";
        }

        fn test_precedence_unary_over_mul() {
            let expr = "-2 * 3";
            let tree_ok = "
                binary Mul (0..6)
                  unary Neg (0..2)
                    int 2 (1..2)
                  int 3 (5..6)
            ";
        }

        fn test_precedence_paren_rebinds() {
            let expr = "(1 + 2) * 3";
            let tree_ok = "
                binary Mul (0..11)
                  paren (0..7)
                    binary Add (1..6)
                      int 1 (1..2)
                      int 2 (4..5)
                  int 3 (10..11)
            ";
        }

        fn test_nested_parens() {
            let expr = "(1 * 2 + 3) - (1 + 2 * 3)";
            let tree_ok = "
                binary Sub (0..25)
                  paren (0..11)
                    binary Add (1..10)
                      binary Mul (1..6)
                        int 1 (1..2)
                        int 2 (5..6)
                      int 3 (9..10)
                  paren (14..25)
                    binary Add (15..24)
                      int 1 (15..16)
                      binary Mul (19..24)
                        int 2 (19..20)
                        int 3 (23..24)
            ";
        }

        fn test_call_expr_one_arg() {
            let expr = "print_int(42)";
            let tree_ok = "
                call print_int (0..13)
                  arguments
                    int 42 (10..12)
            ";
        }

        fn test_call_expr_no_args() {
            let expr = "print_int()";
            let tree_ok = "
                call print_int (0..11)
            ";
        }

        fn test_call_expr_multiple_args() {
            let expr = "print_int(1, 2)";
            let tree_ok = "
                call print_int (0..15)
                  arguments
                    int 1 (10..11)
                    int 2 (13..14)
            ";
        }

        fn test_call_expr_nested_arith() {
            let expr = "print_float(1.5 + 2.5) * 3";
            let tree_ok = "
                binary Mul (0..26)
                  call print_float (0..22)
                    arguments
                      binary Add (12..21)
                        float 1.5 (12..15)
                        float 2.5 (18..21)
                  int 3 (25..26)
            ";
        }

        fn test_print_statement() {
            let program = "print 1 + 2;";
            let tree_ok = "
                print (0..12)
                  binary Add (6..11)
                    int 1 (6..7)
                    int 2 (10..11)
            ";
        }

        fn test_statements_in_source_order() {
            let program = "
                print 1;
                print 2.5;
                print 'c';
            ";
            let tree_ok = "
                print (17..25)
                  int 1 (23..24)
                print (42..52)
                  float 2.5 (48..51)
                print (69..79)
                  char 'c' (75..78)
            ";
        }

        fn test_empty_program() {
            let program = "";
            let tree_ok = "";
        }

        fn test_comments_are_skipped() {
            let program = "print /* inline */ 1; // trailing";
            let tree_ok = "
                print (0..21)
                  int 1 (19..20)
            ";
        }

        fn test_error_missing_semicolon() {
            let program = "print 1";
            let expected_errors = &["7..7: expected token Semicolon, but got Eof"];
        }

        fn test_error_statement_must_be_print() {
            let program = "1 + 2;";
            let expected_errors = &["0..1: expected token Print, but got Int"];
        }

        fn test_error_expr_unexpected_token() {
            let expr = "1 + ;";
            let expected_errors = &["4..5: unexpected token Semicolon in expression"];
        }

        fn test_error_expr_unmatched_paren_open() {
            let expr = "(1 + 2";
            let expected_errors = &["6..6: expected token RParen, but got Eof"];
        }

        fn test_error_expr_trailing_input() {
            let expr = "1 + 2)";
            let expected_errors = &["5..6: expected token Eof, but got RParen"];
        }

        fn test_error_bare_identifier() {
            let expr = "x + 1";
            let expected_errors = &["2..3: expected token LParen, but got Plus"];
        }

        fn test_error_call_missing_separator() {
            let expr = "print_int(1 2)";
            let expected_errors = &["12..13: expected token RParen, but got Int"];
        }

        fn test_error_parse_int_too_large() {
            let expr = "999999999999999999999999999999"; // Exceeds i64
            let expected_errors = &["0..30: parse int error, out of bounds"];
        }

        fn test_error_first_error_aborts() {
            let program = "print 1 +; print 2;";
            let expected_errors = &["9..10: unexpected token Semicolon in expression"];
        }

        fn test_error_lexer_unexpected_char() {
            let expr = "1 @ 2";
            let expected_errors = &["2..3: unexpected character '@' at line 1, column 3"];
        }

        fn test_error_lexer_unclosed_comment() {
            let program = "print 1; /* unclosed";
            let expected_errors = &["9..20: unclosed comment at line 1, column 10"];
        }

        fn test_error_lexer_unclosed_char() {
            let expr = "'a + 1";
            let expected_errors = &["0..3: unclosed character literal at line 1, column 1"];
        }
    );
}

use crate::{
    lexer, parser,
    token::Spanned,
    type_checker,
    util::fmt::{Context, Show},
};

impl Show for Spanned<lexer::Error> {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &Context<'_>) -> std::fmt::Result {
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }

        use lexer::Error::*;
        match error {
            UnexpectedChar(c) => write!(f, "unexpected character {c:?}")?,
            UnclosedComment => write!(f, "unclosed comment")?,
            UnclosedChar => write!(f, "unclosed character literal")?,
            EmptyChar => write!(f, "empty character literal")?,
            InvalidEscape(c) => write!(f, "invalid escape sequence '\\{c}'")?,
        }

        let (line, column) = span.line_column(ctx.src);
        write!(f, " at line {line}, column {column}")
    }
}

impl Show for Spanned<parser::Error> {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &Context<'_>) -> std::fmt::Result {
        let Spanned { span, inner: error } = self;

        use parser::Error::*;
        if let Lexer(inner) = error {
            // Lexer failures keep their own rendering, line/column included.
            return span.wrap(*inner).show(f, ctx);
        }

        if f.alternate() {
            write!(f, "{span}: ")?;
        }

        match error {
            UnexpectedTokenInExpr { token } => {
                write!(f, "unexpected token {token:?} in expression")
            }
            Unexpected { actual, expected } => {
                write!(f, "expected token {expected:?}, but got {actual:?}")
            }
            ParseInt => write!(f, "parse int error, out of bounds"),
            Lexer(_) => unreachable!("handled above"),
        }
    }
}

impl Show for Spanned<type_checker::Error> {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, _: &Context<'_>) -> std::fmt::Result {
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }

        use type_checker::Error::*;
        match error {
            InvalidUnaryOperand { op, operand } => {
                write!(f, "cannot apply unary operator {op} to operand of type {operand}")
            }
            InvalidBinaryOperands { op, lhs, rhs } => {
                write!(f, "cannot apply operator {op} to operands of type {lhs} and {rhs}")
            }
            UndefinedFunction { name } => write!(f, "undefined function {name}"),
            IncorrectNumberOfArguments { actual, expected } => write!(
                f,
                "incorrect number of arguments. expected {expected}, but got {actual}"
            ),
            ArgumentMismatch { actual, expected } => {
                write!(f, "expected argument of type {expected}, but got {actual}")
            }
        }
    }
}

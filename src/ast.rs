// program ::= statement*
// statement ::= 'print' expr ';'
// expr ::= term (('+' | '-') term)*
// term ::= unary (('*' | '/') unary)*
// unary ::= ('-' | '+') unary | primary
// primary ::= INT | FLOAT | CHAR
//           | ID '(' [expr (',' expr)*] ')'
//           | '(' expr ')'

// Precedence
//
// unary - +
// * /
// + -

use std::fmt;

use crate::{token::Span, types::Ty};

/// Per-phase information attached to every expression node: nothing before
/// type checking, the resolved type after.
pub trait Info {
    type Ty: Copy + fmt::Debug + PartialEq;
}

/// An AST fresh out of the parser.
#[derive(Debug, PartialEq)]
pub struct Untyped;

/// An AST that passed the type checker.
#[derive(Debug, PartialEq)]
pub struct Typed;

impl Info for Untyped {
    type Ty = ();
}

impl Info for Typed {
    type Ty = Ty;
}

#[derive(Debug, PartialEq)]
pub struct Program<I: Info> {
    pub statements: Vec<Statement<I>>,
}

#[derive(Debug, PartialEq)]
pub enum Statement<I: Info> {
    Print { expr: Expr<I>, span: Span },
}

#[derive(Debug, PartialEq)]
pub struct Expr<I: Info> {
    pub kind: ExprKind<I>,
    pub span: Span,
    /// `()` before type checking; the resolved [`Ty`] after.
    pub info: I::Ty,
}

#[derive(Debug, PartialEq)]
pub enum ExprKind<I: Info> {
    Unary {
        op: UnaryOperator,
        expr: Box<Expr<I>>,
    },
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr<I>>,
        rhs: Box<Expr<I>>,
    },
    /// A call to one of the runtime entry points.
    Call {
        callee: Ident,
        args: Vec<Expr<I>>,
    },
    Paren(Box<Expr<I>>),
    Int(i64),
    Float(f64),
    Char(char),
}

#[derive(Debug, PartialEq)]
pub struct Ident {
    pub name: Box<str>,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Neg,
    Plus,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOperator::Neg => "-",
            UnaryOperator::Plus => "+",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
        })
    }
}

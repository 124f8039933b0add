use crate::{
    ast::{
        BinaryOperator, Expr, ExprKind, Ident, Program, Statement, Typed, UnaryOperator, Untyped,
    },
    ir::RuntimeFn,
    token::{Span, Spanned},
    types::Ty,
};

/// On failure, carries the best-effort annotated tree alongside the errors.
pub type CheckResult<T> = Result<T, (T, Vec<Spanned<Error>>)>;

pub struct Checker {
    errors: Vec<Spanned<Error>>,
}

impl Checker {
    pub fn new() -> Checker {
        Checker {
            errors: Vec::with_capacity(8),
        }
    }

    /// Annotates every expression with its resolved type, in one bottom-up
    /// walk. All independent errors are collected before failing.
    pub fn check(mut self, program: Program<Untyped>) -> CheckResult<Program<Typed>> {
        let statements = program
            .statements
            .into_iter()
            .map(|statement| self.check_statement(statement))
            .collect();
        self.finish(Program { statements })
    }

    /// [`Checker::check`], for a bare expression.
    pub fn check_expr(mut self, expr: Expr<Untyped>) -> CheckResult<Expr<Typed>> {
        let expr = self.check_expr_inner(expr);
        self.finish(expr)
    }

    fn finish<T>(self, checked: T) -> CheckResult<T> {
        if self.errors.is_empty() {
            Ok(checked)
        } else {
            Err((checked, self.errors))
        }
    }

    fn check_statement(&mut self, statement: Statement<Untyped>) -> Statement<Typed> {
        match statement {
            // Print accepts any of the three primitive types; the operand's
            // resolved type later selects the runtime entry point.
            Statement::Print { expr, span } => Statement::Print {
                expr: self.check_expr_inner(expr),
                span,
            },
        }
    }

    fn check_expr_inner(&mut self, expr: Expr<Untyped>) -> Expr<Typed> {
        let span = expr.span;
        let (kind, ty) = match expr.kind {
            ExprKind::Int(value) => (ExprKind::Int(value), Ty::Int),
            ExprKind::Float(value) => (ExprKind::Float(value), Ty::Float),
            ExprKind::Char(value) => (ExprKind::Char(value), Ty::Char),

            ExprKind::Paren(inner) => {
                let inner = self.check_expr_inner(*inner);
                let ty = inner.info;
                (ExprKind::Paren(Box::new(inner)), ty)
            }

            ExprKind::Unary { op, expr: inner } => {
                let inner = self.check_expr_inner(*inner);
                let ty = self.check_unary(op, &inner, span);
                (
                    ExprKind::Unary {
                        op,
                        expr: Box::new(inner),
                    },
                    ty,
                )
            }

            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.check_expr_inner(*lhs);
                let rhs = self.check_expr_inner(*rhs);
                let ty = self.check_binary(op, &lhs, &rhs, span);
                (
                    ExprKind::Binary {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    ty,
                )
            }

            ExprKind::Call { callee, args } => {
                let args: Vec<_> = args
                    .into_iter()
                    .map(|arg| self.check_expr_inner(arg))
                    .collect();
                let ty = self.check_call(&callee, &args, span);
                (ExprKind::Call { callee, args }, ty)
            }
        };
        Expr { kind, span, info: ty }
    }

    fn check_unary(&mut self, op: UnaryOperator, operand: &Expr<Typed>, span: Span) -> Ty {
        let ty = operand.info;
        if ty.is_numeric() {
            ty
        } else {
            self.errors
                .push(span.wrap(Error::InvalidUnaryOperand { op, operand: ty }));
            // Poison: keep checking the surroundings as ints
            Ty::Int
        }
    }

    fn check_binary(
        &mut self,
        op: BinaryOperator,
        lhs: &Expr<Typed>,
        rhs: &Expr<Typed>,
        span: Span,
    ) -> Ty {
        match Ty::promote(lhs.info, rhs.info) {
            Some(ty) => ty,
            None => {
                self.errors.push(span.wrap(Error::InvalidBinaryOperands {
                    op,
                    lhs: lhs.info,
                    rhs: rhs.info,
                }));
                Ty::Int
            }
        }
    }

    /// The only callable names are the runtime entry points: one argument,
    /// exactly the parameter type, and an always-zero integer result.
    fn check_call(&mut self, callee: &Ident, args: &[Expr<Typed>], span: Span) -> Ty {
        let Some(func) = RuntimeFn::by_name(&callee.name) else {
            self.errors.push(callee.span.wrap(Error::UndefinedFunction {
                name: callee.name.clone(),
            }));
            return Ty::Int;
        };
        if args.len() != 1 {
            self.errors.push(span.wrap(Error::IncorrectNumberOfArguments {
                actual: args.len(),
                expected: 1,
            }));
        } else if args[0].info != func.param() {
            self.errors.push(args[0].span.wrap(Error::ArgumentMismatch {
                actual: args[0].info,
                expected: func.param(),
            }));
        }
        Ty::Int
    }
}

impl Default for Checker {
    fn default() -> Checker {
        Checker::new()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    InvalidUnaryOperand {
        op: UnaryOperator,
        operand: Ty,
    },
    InvalidBinaryOperands {
        op: BinaryOperator,
        lhs: Ty,
        rhs: Ty,
    },
    UndefinedFunction {
        name: Box<str>,
    },
    IncorrectNumberOfArguments {
        actual: usize,
        expected: usize,
    },
    ArgumentMismatch {
        actual: Ty,
        expected: Ty,
    },
}

use std::io::Write;

use crate::{ast::*, types::Ty};

const INDENT_WIDTH: usize = 2;

pub fn print_program_string<I: InfoWriter>(program: &Program<I>) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_program(&mut buf, program).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_expr_string<I: InfoWriter>(expr: &Expr<I>) -> String {
    let mut buf = Vec::with_capacity(512);
    print_expr(&mut buf, 0, expr).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_program<I: InfoWriter>(
    w: &mut impl Write,
    program: &Program<I>,
) -> std::io::Result<()> {
    for statement in &program.statements {
        print_statement(w, 0, statement)?;
    }
    Ok(())
}

fn print_statement<I: InfoWriter>(
    w: &mut impl Write,
    i: usize,
    statement: &Statement<I>,
) -> std::io::Result<()> {
    match statement {
        Statement::Print { expr, span } => {
            sp(w, i)?;
            writeln!(w, "print ({span})")?;
            print_expr(w, i + 1, expr)?;
        }
    }
    Ok(())
}

pub fn print_expr<I: InfoWriter>(
    w: &mut impl Write,
    i: usize,
    expr: &Expr<I>,
) -> std::io::Result<()> {
    sp(w, i)?;
    let info = expr.info.write_resolved(); // inferred type, for typed ASTs
    let span = expr.span;
    match &expr.kind {
        ExprKind::Unary {
            op,
            expr: inner_expr,
        } => {
            writeln!(w, "unary {op:?} ({span}{info})")?;
            print_expr(w, i + 1, inner_expr)?;
        }
        ExprKind::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {op:?} ({span}{info})")?;
            print_expr(w, i + 1, lhs)?;
            print_expr(w, i + 1, rhs)?;
        }
        ExprKind::Call { callee, args } => {
            writeln!(w, "call {} ({span}{info})", callee.name)?;
            if !args.is_empty() {
                sp(w, i + 1)?;
                writeln!(w, "arguments")?;
                for arg in args {
                    print_expr(w, i + 2, arg)?;
                }
            }
        }
        ExprKind::Paren(inner_expr) => {
            writeln!(w, "paren ({span}{info})")?;
            print_expr(w, i + 1, inner_expr)?;
        }
        ExprKind::Int(val) => {
            writeln!(w, "int {val} ({span}{info})")?;
        }
        ExprKind::Float(val) => {
            writeln!(w, "float {val:?} ({span}{info})")?;
        }
        ExprKind::Char(val) => {
            writeln!(w, "char {val:?} ({span}{info})")?;
        }
    }
    Ok(())
}

fn sp(w: &mut impl Write, i: usize) -> std::io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}

pub trait InfoWriter: Info<Ty: WriteTy> {}

impl<I> InfoWriter for I
where
    I: Info,
    I::Ty: WriteTy,
{
}

pub trait WriteTy {
    fn write_resolved(&self) -> impl std::fmt::Display;
}

impl WriteTy for () {
    fn write_resolved(&self) -> impl std::fmt::Display {
        ""
    }
}

impl WriteTy for Ty {
    fn write_resolved(&self) -> impl std::fmt::Display {
        pub struct TyWriter(Ty);

        impl std::fmt::Display for TyWriter {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, " %: {}", self.0)
            }
        }

        TyWriter(*self)
    }
}

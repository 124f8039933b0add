use std::{fmt, io};

use crate::ir::{BinOp, CompiledUnit, Instr, Literal, Reg, RuntimeFn};

/// The externally-linked entry points generated code calls for observable
/// output. All three return an integer that generated code ignores.
pub trait Runtime {
    fn print_int(&mut self, value: i64) -> i64;
    fn print_float(&mut self, value: f64) -> i64;
    /// The argument is a character code.
    fn print_char(&mut self, code: i64) -> i64;
}

/// The reference [`Runtime`]: writes to the provided sink.
pub struct StdRuntime<W> {
    writer: W,
}

impl<W> StdRuntime<W> {
    pub fn new(writer: W) -> StdRuntime<W> {
        StdRuntime { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> Runtime for StdRuntime<W> {
    fn print_int(&mut self, value: i64) -> i64 {
        writeln!(self.writer, "Out: {value}").expect("failed to write to sink");
        0
    }

    /// Six fractional digits, locale-independent.
    fn print_float(&mut self, value: f64) -> i64 {
        writeln!(self.writer, "Out: {value:.6}").expect("failed to write to sink");
        0
    }

    /// Writes the single character, with no trailing newline.
    fn print_char(&mut self, code: i64) -> i64 {
        let c = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        write!(self.writer, "{c}").expect("failed to write to sink");
        0
    }
}

/// Executes a compiled unit against the provided runtime, standing in for
/// the external backend so the pipeline is observable end to end.
///
/// Runtime calls happen in instruction order, which the generator guarantees
/// is source order.
pub fn execute<R: Runtime>(unit: &CompiledUnit, runtime: &mut R) -> Result<(), Error> {
    let mut regs: Vec<Option<Value>> = vec![None; unit.regs.len()];

    for instr in &unit.instrs {
        match *instr {
            Instr::Const { dst, value } => set(&mut regs, dst, Value::from(value)),
            Instr::Convert { dst, src } => {
                let Value::Int(v) = get(&regs, src) else {
                    unreachable!("convert reads an int register");
                };
                set(&mut regs, dst, Value::Float(v as f64));
            }
            Instr::BinOp { op, dst, lhs, rhs } => {
                let value = match (get(&regs, lhs), get(&regs, rhs)) {
                    (Value::Int(a), Value::Int(b)) => Value::Int(match op {
                        BinOp::Add => a.wrapping_add(b),
                        BinOp::Sub => a.wrapping_sub(b),
                        BinOp::Mul => a.wrapping_mul(b),
                        BinOp::Div => {
                            if b == 0 {
                                return Err(Error::DivisionByZero);
                            }
                            a.wrapping_div(b)
                        }
                    }),
                    (Value::Float(a), Value::Float(b)) => Value::Float(match op {
                        BinOp::Add => a + b,
                        BinOp::Sub => a - b,
                        BinOp::Mul => a * b,
                        BinOp::Div => a / b,
                    }),
                    _ => unreachable!("binary operands share a numeric type"),
                };
                set(&mut regs, dst, value);
            }
            Instr::CallRuntime { func, arg } => {
                match (func, get(&regs, arg)) {
                    (RuntimeFn::PrintInt, Value::Int(v)) => runtime.print_int(v),
                    (RuntimeFn::PrintFloat, Value::Float(v)) => runtime.print_float(v),
                    (RuntimeFn::PrintChar, Value::Char(c)) => {
                        runtime.print_char(i64::from(u32::from(c)))
                    }
                    _ => unreachable!("argument type matches the runtime signature"),
                };
            }
        }
    }
    Ok(())
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Value {
    Int(i64),
    Float(f64),
    Char(char),
}

impl From<Literal> for Value {
    fn from(value: Literal) -> Value {
        match value {
            Literal::Int(v) => Value::Int(v),
            Literal::Float(v) => Value::Float(v),
            Literal::Char(c) => Value::Char(c),
        }
    }
}

fn get(regs: &[Option<Value>], reg: Reg) -> Value {
    regs[reg.index()].expect("register read before its single write")
}

fn set(regs: &mut [Option<Value>], reg: Reg, value: Value) {
    let slot = &mut regs[reg.index()];
    debug_assert!(slot.is_none(), "register written twice");
    *slot = Some(value);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    DivisionByZero,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DivisionByZero => f.write_str("division by zero"),
        }
    }
}

impl std::error::Error for Error {}

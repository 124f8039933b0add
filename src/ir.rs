use std::fmt;

use crate::{ast::BinaryOperator, types::Ty};

/// A virtual register. Ids increase monotonically within a unit and are never
/// reused; a register is written exactly once.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Reg(pub u32);

impl Reg {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Char(char),
}

impl Literal {
    pub fn ty(self) -> Ty {
        match self {
            Literal::Int(_) => Ty::Int,
            Literal::Float(_) => Ty::Float,
            Literal::Char(_) => Ty::Char,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v:?}"),
            // Chars travel as their code, which is what the runtime receives.
            Literal::Char(c) => write!(f, "{}", u32::from(*c)),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl From<BinaryOperator> for BinOp {
    fn from(op: BinaryOperator) -> BinOp {
        match op {
            BinaryOperator::Add => BinOp::Add,
            BinaryOperator::Sub => BinOp::Sub,
            BinaryOperator::Mul => BinOp::Mul,
            BinaryOperator::Div => BinOp::Div,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Div => "div",
        })
    }
}

/// The runtime entry points generated code is permitted to call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RuntimeFn {
    PrintInt,
    PrintFloat,
    PrintChar,
}

impl RuntimeFn {
    pub const ALL: &'static [RuntimeFn] =
        &[RuntimeFn::PrintInt, RuntimeFn::PrintFloat, RuntimeFn::PrintChar];

    /// The linked symbol name, which is also the source-level callee name.
    pub const fn symbol(self) -> &'static str {
        match self {
            RuntimeFn::PrintInt => "print_int",
            RuntimeFn::PrintFloat => "print_float",
            RuntimeFn::PrintChar => "print_char",
        }
    }

    pub fn by_name(name: &str) -> Option<RuntimeFn> {
        Self::ALL.iter().copied().find(|f| f.symbol() == name)
    }

    /// The entry point's parameter type; the argument must match it exactly.
    pub const fn param(self) -> Ty {
        match self {
            RuntimeFn::PrintInt => Ty::Int,
            RuntimeFn::PrintFloat => Ty::Float,
            RuntimeFn::PrintChar => Ty::Char,
        }
    }

    /// Selects the entry point for printing a value of the provided type.
    pub const fn for_operand(ty: Ty) -> RuntimeFn {
        match ty {
            Ty::Int => RuntimeFn::PrintInt,
            Ty::Float => RuntimeFn::PrintFloat,
            Ty::Char => RuntimeFn::PrintChar,
        }
    }
}

impl fmt::Display for RuntimeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Instr {
    Const { dst: Reg, value: Literal },
    /// Widens an int register into a float register.
    Convert { dst: Reg, src: Reg },
    BinOp { op: BinOp, dst: Reg, lhs: Reg, rhs: Reg },
    CallRuntime { func: RuntimeFn, arg: Reg },
}

/// The complete lowering of one compilation unit: a single straight-line
/// instruction sequence plus the metadata the external backend needs.
#[derive(Debug, PartialEq, Default)]
pub struct CompiledUnit {
    pub instrs: Vec<Instr>,
    /// Type of every allocated register, indexed by register id.
    pub regs: Vec<Ty>,
    /// Runtime symbols the unit calls, in first-use order.
    pub imports: Vec<RuntimeFn>,
}

impl CompiledUnit {
    pub fn reg_ty(&self, reg: Reg) -> Ty {
        self.regs[reg.index()]
    }
}

impl fmt::Display for CompiledUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for import in &self.imports {
            writeln!(f, "import {import}")?;
        }
        for instr in &self.instrs {
            match *instr {
                Instr::Const { dst, value } => {
                    writeln!(f, "{dst} = const {} {value}", ty_mnemonic(self.reg_ty(dst)))?;
                }
                Instr::Convert { dst, src } => {
                    writeln!(f, "{dst} = convert float {src}")?;
                }
                Instr::BinOp { op, dst, lhs, rhs } => {
                    writeln!(f, "{dst} = {op} {} {lhs}, {rhs}", ty_mnemonic(self.reg_ty(dst)))?;
                }
                Instr::CallRuntime { func, arg } => {
                    writeln!(f, "call {func} {arg}")?;
                }
            }
        }
        Ok(())
    }
}

fn ty_mnemonic(ty: Ty) -> &'static str {
    match ty {
        Ty::Int => "int",
        Ty::Float => "float",
        Ty::Char => "char",
    }
}

use crate::{
    ast::{Expr, ExprKind, Program, Statement, Typed, UnaryOperator},
    ir::{BinOp, CompiledUnit, Instr, Literal, Reg, RuntimeFn},
    types::Ty,
};

/// Lowers a type-checked program into a compiled unit.
///
/// Generation is total: checked input cannot fail to lower, and any
/// inconsistency reaching this stage is a defect upstream, reported by
/// panicking rather than by a user-facing error.
pub fn generate(program: &Program<Typed>) -> CompiledUnit {
    let mut g = Generator::new();
    g.gen_program(program);
    g.unit
}

struct Generator {
    unit: CompiledUnit,
}

impl Generator {
    fn new() -> Generator {
        Generator {
            unit: CompiledUnit::default(),
        }
    }

    fn gen_program(&mut self, program: &Program<Typed>) {
        for statement in &program.statements {
            self.gen_statement(statement);
        }
    }

    fn gen_statement(&mut self, statement: &Statement<Typed>) {
        match statement {
            // One runtime call per print, entry point selected by the
            // operand's resolved type.
            Statement::Print { expr, .. } => {
                let arg = self.gen_expr(expr);
                self.call_runtime(RuntimeFn::for_operand(expr.info), arg);
            }
        }
    }

    /// Emits the instructions computing `expr`, returning the register that
    /// holds its result. Every sub-expression gets a fresh register.
    fn gen_expr(&mut self, expr: &Expr<Typed>) -> Reg {
        match &expr.kind {
            ExprKind::Int(value) => self.constant(Literal::Int(*value)),
            ExprKind::Float(value) => self.constant(Literal::Float(*value)),
            ExprKind::Char(value) => self.constant(Literal::Char(*value)),

            ExprKind::Paren(inner) => self.gen_expr(inner),

            ExprKind::Unary { op, expr: inner } => {
                let operand = self.gen_expr(inner);
                match op {
                    UnaryOperator::Plus => operand,
                    // Negation within the fixed instruction set: 0 - x
                    UnaryOperator::Neg => {
                        let zero = self.constant(match expr.info {
                            Ty::Int => Literal::Int(0),
                            Ty::Float => Literal::Float(0.0),
                            Ty::Char => unreachable!("char negation rejected by the type checker"),
                        });
                        self.bin_op(BinOp::Sub, expr.info, zero, operand)
                    }
                }
            }

            ExprKind::Binary { op, lhs, rhs } => {
                let ty = expr.info;
                let lhs = self.gen_operand(lhs, ty);
                let rhs = self.gen_operand(rhs, ty);
                self.bin_op((*op).into(), ty, lhs, rhs)
            }

            ExprKind::Call { callee, args } => {
                let func = RuntimeFn::by_name(&callee.name)
                    .expect("callee validated by the type checker");
                let [arg] = args.as_slice() else {
                    unreachable!("arity validated by the type checker");
                };
                let arg = self.gen_expr(arg);
                self.call_runtime(func, arg);
                // The runtime entry points always return zero; that is the
                // value of a call expression.
                self.constant(Literal::Int(0))
            }
        }
    }

    /// Emits a binary operand, widening it when the checker promoted an int
    /// operand into a float operation. The conversion is always explicit in
    /// the emitted instructions.
    fn gen_operand(&mut self, expr: &Expr<Typed>, target: Ty) -> Reg {
        let reg = self.gen_expr(expr);
        if expr.info == Ty::Int && target == Ty::Float {
            let dst = self.fresh(Ty::Float);
            self.unit.instrs.push(Instr::Convert { dst, src: reg });
            return dst;
        }
        reg
    }

    fn constant(&mut self, value: Literal) -> Reg {
        let dst = self.fresh(value.ty());
        self.unit.instrs.push(Instr::Const { dst, value });
        dst
    }

    fn bin_op(&mut self, op: BinOp, ty: Ty, lhs: Reg, rhs: Reg) -> Reg {
        let dst = self.fresh(ty);
        self.unit.instrs.push(Instr::BinOp { op, dst, lhs, rhs });
        dst
    }

    fn call_runtime(&mut self, func: RuntimeFn, arg: Reg) {
        if !self.unit.imports.contains(&func) {
            self.unit.imports.push(func);
        }
        self.unit.instrs.push(Instr::CallRuntime { func, arg });
    }

    /// Allocates the next register. Ids only ever grow; the counter lives in
    /// the generator, so independent compilations cannot interfere.
    fn fresh(&mut self, ty: Ty) -> Reg {
        let id = u32::try_from(self.unit.regs.len()).expect("register id overflow");
        self.unit.regs.push(ty);
        Reg(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;
    use pretty_assertions::assert_eq;

    fn compile_ok(src: &str) -> CompiledUnit {
        compile(src).expect("should compile")
    }

    #[test]
    fn test_print_int_addition() {
        let unit = compile_ok("print 2 + 3;");
        assert_eq!(
            unit.instrs,
            [
                Instr::Const { dst: Reg(0), value: Literal::Int(2) },
                Instr::Const { dst: Reg(1), value: Literal::Int(3) },
                Instr::BinOp { op: BinOp::Add, dst: Reg(2), lhs: Reg(0), rhs: Reg(1) },
                Instr::CallRuntime { func: RuntimeFn::PrintInt, arg: Reg(2) },
            ]
        );
        assert_eq!(unit.regs, [Ty::Int, Ty::Int, Ty::Int]);
        assert_eq!(unit.imports, [RuntimeFn::PrintInt]);
    }

    #[test]
    fn test_mixed_promotion_is_explicit() {
        let unit = compile_ok("print 1 + 2.5;");
        assert_eq!(
            unit.instrs,
            [
                Instr::Const { dst: Reg(0), value: Literal::Int(1) },
                Instr::Convert { dst: Reg(1), src: Reg(0) },
                Instr::Const { dst: Reg(2), value: Literal::Float(2.5) },
                Instr::BinOp { op: BinOp::Add, dst: Reg(3), lhs: Reg(1), rhs: Reg(2) },
                Instr::CallRuntime { func: RuntimeFn::PrintFloat, arg: Reg(3) },
            ]
        );
        assert_eq!(unit.regs, [Ty::Int, Ty::Float, Ty::Float, Ty::Float]);
    }

    #[test]
    fn test_print_char_selects_exact_entry_point() {
        let unit = compile_ok("print 'a';");
        assert_eq!(
            unit.instrs,
            [
                Instr::Const { dst: Reg(0), value: Literal::Char('a') },
                Instr::CallRuntime { func: RuntimeFn::PrintChar, arg: Reg(0) },
            ]
        );
        assert_eq!(unit.imports, [RuntimeFn::PrintChar]);
    }

    #[test]
    fn test_one_call_per_print_in_source_order() {
        let unit = compile_ok("print 1; print 'x'; print 2.5; print 4;");
        let calls: Vec<_> = unit
            .instrs
            .iter()
            .filter_map(|instr| match instr {
                Instr::CallRuntime { func, .. } => Some(*func),
                _ => None,
            })
            .collect();
        assert_eq!(
            calls,
            [
                RuntimeFn::PrintInt,
                RuntimeFn::PrintChar,
                RuntimeFn::PrintFloat,
                RuntimeFn::PrintInt,
            ]
        );
        assert_eq!(
            unit.imports,
            [RuntimeFn::PrintInt, RuntimeFn::PrintChar, RuntimeFn::PrintFloat]
        );
    }

    #[test]
    fn test_negation_lowers_to_zero_sub() {
        let unit = compile_ok("print -4;");
        assert_eq!(
            unit.instrs,
            [
                Instr::Const { dst: Reg(0), value: Literal::Int(4) },
                Instr::Const { dst: Reg(1), value: Literal::Int(0) },
                Instr::BinOp { op: BinOp::Sub, dst: Reg(2), lhs: Reg(1), rhs: Reg(0) },
                Instr::CallRuntime { func: RuntimeFn::PrintInt, arg: Reg(2) },
            ]
        );
    }

    #[test]
    fn test_unary_plus_is_free() {
        let unit = compile_ok("print +4;");
        assert_eq!(
            unit.instrs,
            [
                Instr::Const { dst: Reg(0), value: Literal::Int(4) },
                Instr::CallRuntime { func: RuntimeFn::PrintInt, arg: Reg(0) },
            ]
        );
    }

    #[test]
    fn test_call_expression_value_is_zero() {
        let unit = compile_ok("print print_int(7) + 1;");
        assert_eq!(
            unit.instrs,
            [
                Instr::Const { dst: Reg(0), value: Literal::Int(7) },
                Instr::CallRuntime { func: RuntimeFn::PrintInt, arg: Reg(0) },
                Instr::Const { dst: Reg(1), value: Literal::Int(0) },
                Instr::Const { dst: Reg(2), value: Literal::Int(1) },
                Instr::BinOp { op: BinOp::Add, dst: Reg(3), lhs: Reg(1), rhs: Reg(2) },
                Instr::CallRuntime { func: RuntimeFn::PrintInt, arg: Reg(3) },
            ]
        );
    }

    #[test]
    fn test_registers_increase_and_are_never_reused() {
        let unit = compile_ok("print 1 + 2 * 3 - 4; print 5.5 / 2.0;");
        let mut writes = Vec::new();
        for instr in &unit.instrs {
            match *instr {
                Instr::Const { dst, .. }
                | Instr::Convert { dst, .. }
                | Instr::BinOp { dst, .. } => writes.push(dst.0),
                Instr::CallRuntime { .. } => (),
            }
        }
        let expected: Vec<_> = (0..u32::try_from(unit.regs.len()).unwrap()).collect();
        assert_eq!(writes, expected);
    }

    #[test]
    fn test_empty_program_compiles_to_empty_unit() {
        let unit = compile_ok("");
        assert_eq!(unit, CompiledUnit::default());
    }
}

//! A small fluent builder over [`crate::cfg::Function`], in the style of
//! the teacher's `OperationBuilder` (`core/builder.rs`) and this crate's
//! own earlier `ExtIRBuilder` (block-pointer-plus-push-methods). Tests
//! use this instead of hand-assembling `Function` internals.

use color_eyre::eyre::{ensure, Report};

use crate::cfg::{BinOp, BlockId, Function, Instruction, Operand, Predicate, Terminator, Var};
use crate::config::Config;

pub struct FunctionBuilder {
    func: Function,
    block_ptr: BlockId,
    default_signed: bool,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> FunctionBuilder {
        let func = Function::empty(name);
        let entry = func.entry();
        FunctionBuilder {
            func,
            block_ptr: entry,
            default_signed: Config::default().signed_default,
        }
    }

    pub fn entry(&self) -> BlockId {
        self.func.entry()
    }

    pub fn current_block(&self) -> BlockId {
        self.block_ptr
    }

    /// Appends a new block and moves the builder's insertion point to it.
    pub fn push_block(&mut self) -> BlockId {
        let id = self.func.push_block();
        self.block_ptr = id;
        id
    }

    pub fn set_current_block(&mut self, block: BlockId) {
        self.block_ptr = block;
    }

    pub fn push_add(&mut self, lhs: Operand, rhs: Operand) -> Var {
        self.push_binop(BinOp::Add, lhs, rhs)
    }

    pub fn push_sub(&mut self, lhs: Operand, rhs: Operand) -> Var {
        self.push_binop(BinOp::Sub, lhs, rhs)
    }

    pub fn push_other_binop(&mut self, name: &'static str, lhs: Operand, rhs: Operand) -> Var {
        self.push_binop(BinOp::Other(name), lhs, rhs)
    }

    fn push_binop(&mut self, op: BinOp, lhs: Operand, rhs: Operand) -> Var {
        let var = self.func.fresh_var();
        self.func
            .push_def(self.block_ptr, var, Instruction::BinaryOperator { op, lhs, rhs });
        var
    }

    pub fn push_cmp(&mut self, pred: Predicate, signed: bool, lhs: Operand, rhs: Operand) -> Var {
        let var = self.func.fresh_var();
        self.func.push_def(
            self.block_ptr,
            var,
            Instruction::Cmp { pred, signed, lhs, rhs },
        );
        var
    }

    /// Like `push_cmp`, but takes signedness from the builder's configured
    /// default instead of an explicit argument.
    pub fn push_cmp_default(&mut self, pred: Predicate, lhs: Operand, rhs: Operand) -> Var {
        self.push_cmp(pred, self.default_signed, lhs, rhs)
    }

    pub fn push_phi(&mut self, incoming: Vec<(Operand, BlockId)>) -> Var {
        let var = self.func.fresh_var();
        self.func
            .push_def(self.block_ptr, var, Instruction::Phi { incoming });
        var
    }

    /// Allocates a `Var` without defining it yet. For the common
    /// forward-reference a φ-node needs: the incoming value from a
    /// not-yet-built successor block.
    pub fn reserve_var(&mut self) -> Var {
        self.func.fresh_var()
    }

    /// Defines a previously reserved `Var` as a binary op in the current
    /// block.
    pub fn define_binop(&mut self, var: Var, op: BinOp, lhs: Operand, rhs: Operand) {
        self.func
            .push_def(self.block_ptr, var, Instruction::BinaryOperator { op, lhs, rhs });
    }

    pub fn push_unhandled(&mut self, kind: &'static str) -> Var {
        let var = self.func.fresh_var();
        self.func.push_def(self.block_ptr, var, Instruction::Unknown(kind));
        var
    }

    pub fn set_jump(&mut self, target: BlockId) {
        self.func.set_terminator(self.block_ptr, Terminator::Jump(target));
    }

    pub fn set_branch(&mut self, cond: Var, if_true: BlockId, if_false: BlockId) {
        self.func
            .set_terminator(self.block_ptr, Terminator::Branch { cond, if_true, if_false });
    }

    pub fn set_return(&mut self, value: Option<Operand>) {
        self.func.set_terminator(self.block_ptr, Terminator::Return(value));
    }

    /// Finalizes the function: recomputes the predecessor map and checks
    /// every block was given a real terminator by the caller. An IR
    /// built with a dangling default `Return(None)` the caller never set
    /// is a genuine invariant violation, not an analysis outcome, hence
    /// `color_eyre::Report` rather than a `Diagnostic`.
    pub fn finish(mut self) -> Result<Function, Report> {
        ensure!(
            self.func.block_ids().len() > 0,
            "function '{}' has no blocks",
            self.func.name()
        );
        self.func.recompute_predecessors();
        Ok(self.func)
    }
}

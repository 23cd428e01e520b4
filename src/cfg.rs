//! A read-only, fixed-shape SSA control-flow graph.
//!
//! This is a concretization of the teacher's open `Intrinsic`-dialect IR
//! (`core/ir.rs`) down to the one instruction set this analysis needs:
//! binary arithmetic, comparisons, branches, and phi-nodes. There is no
//! extension mechanism here on purpose — see `DESIGN.md`.

use std::collections::HashMap;
use std::fmt;

/// An opaque SSA value identity, unique within one [`Function`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(usize);

impl Var {
    pub(crate) fn new(id: usize) -> Var {
        Var(id)
    }

    pub fn id(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// An opaque basic-block identity, unique within one [`Function`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(usize);

impl BlockId {
    pub(crate) fn new(id: usize) -> BlockId {
        BlockId(id)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// Either a reference to an SSA value or a compile-time constant.
/// Constants have no identity in the range store (spec Data Model §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Value(Var),
    Const(i32),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Value(v) => write!(f, "{}", v),
            Operand::Const(k) => write!(f, "{}", k),
        }
    }
}

/// The two opcodes the lattice gives real semantics to; everything else
/// is `Other` and always transfers to the unknown interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Other(&'static str),
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinOp::Add => write!(f, "add"),
            BinOp::Sub => write!(f, "sub"),
            BinOp::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Signed and unsigned comparison predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Predicate {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Predicate {
    /// Flips a predicate's operand order: `K < v` becomes `v > K`.
    pub fn flip(self) -> Predicate {
        match self {
            Predicate::Lt => Predicate::Gt,
            Predicate::Le => Predicate::Ge,
            Predicate::Gt => Predicate::Lt,
            Predicate::Ge => Predicate::Le,
            Predicate::Eq => Predicate::Eq,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Predicate::Lt => "<",
            Predicate::Le => "<=",
            Predicate::Gt => ">",
            Predicate::Ge => ">=",
            Predicate::Eq => "==",
        };
        write!(f, "{}", s)
    }
}

/// The instruction classes the analysis recognizes (spec §6).
#[derive(Clone, Debug)]
pub enum Instruction {
    BinaryOperator {
        op: BinOp,
        lhs: Operand,
        rhs: Operand,
    },
    Cmp {
        pred: Predicate,
        signed: bool,
        lhs: Operand,
        rhs: Operand,
    },
    Phi {
        incoming: Vec<(Operand, BlockId)>,
    },
    Load,
    Store,
    Call {
        args: Vec<Operand>,
    },
    Select {
        cond: Operand,
        if_true: Operand,
        if_false: Operand,
    },
    /// Catch-all for any instruction kind outside the recognized set.
    Unknown(&'static str),
}

impl Instruction {
    /// A short tag used in diagnostics and reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Instruction::BinaryOperator { .. } => "binop",
            Instruction::Cmp { .. } => "cmp",
            Instruction::Phi { .. } => "phi",
            Instruction::Load => "load",
            Instruction::Store => "store",
            Instruction::Call { .. } => "call",
            Instruction::Select { .. } => "select",
            Instruction::Unknown(name) => name,
        }
    }
}

/// One SSA definition: the value it names, and the instruction that defines it.
#[derive(Clone, Debug)]
pub struct Def {
    pub var: Var,
    pub inst: Instruction,
}

/// A block's control-transfer instruction. Every block has exactly one.
#[derive(Clone, Copy, Debug)]
pub enum Terminator {
    Return(Option<Operand>),
    Jump(BlockId),
    Branch {
        cond: Var,
        if_true: BlockId,
        if_false: BlockId,
    },
}

impl Terminator {
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Return(_) => Vec::new(),
            Terminator::Jump(s) => vec![*s],
            Terminator::Branch {
                if_true, if_false, ..
            } => vec![*if_true, *if_false],
        }
    }
}

/// A maximal straight-line instruction sequence, terminated by one
/// control-flow instruction.
#[derive(Clone, Debug)]
pub struct BasicBlock {
    defs: Vec<Def>,
    terminator: Terminator,
}

impl Default for BasicBlock {
    fn default() -> BasicBlock {
        BasicBlock {
            defs: Vec::new(),
            terminator: Terminator::Return(None),
        }
    }
}

impl BasicBlock {
    pub fn defs(&self) -> &[Def] {
        &self.defs
    }

    pub fn terminator(&self) -> &Terminator {
        &self.terminator
    }
}

/// A single function: an ordered list of basic blocks, the first of
/// which is the entry block. Read-only from the analysis's perspective;
/// construction happens through [`crate::builder::FunctionBuilder`].
#[derive(Clone, Debug)]
pub struct Function {
    name: String,
    blocks: Vec<BasicBlock>,
    next_var: usize,
    predecessors: HashMap<BlockId, Vec<BlockId>>,
}

impl Function {
    pub(crate) fn empty(name: impl Into<String>) -> Function {
        Function {
            name: name.into(),
            blocks: vec![BasicBlock::default()],
            next_var: 0,
            predecessors: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> BlockId {
        BlockId::new(0)
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.index()]
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &BasicBlock)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (BlockId::new(i), b))
    }

    pub fn block_ids(&self) -> Vec<BlockId> {
        (0..self.blocks.len()).map(BlockId::new).collect()
    }

    /// Predecessors computed from every block's terminator. Spec §4.2's
    /// `predecessors()` capability.
    pub fn predecessors(&self, id: BlockId) -> &[BlockId] {
        self.predecessors
            .get(&id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn fresh_var(&mut self) -> Var {
        let v = Var::new(self.next_var);
        self.next_var += 1;
        v
    }

    pub(crate) fn push_block(&mut self) -> BlockId {
        self.blocks.push(BasicBlock::default());
        BlockId::new(self.blocks.len() - 1)
    }

    pub(crate) fn push_def(&mut self, blk: BlockId, var: Var, inst: Instruction) {
        self.blocks[blk.index()].defs.push(Def { var, inst });
    }

    pub(crate) fn set_terminator(&mut self, blk: BlockId, term: Terminator) {
        self.blocks[blk.index()].terminator = term;
    }

    /// Recompute the predecessor map from every block's terminator.
    /// Called once by the builder when the function is finished.
    pub(crate) fn recompute_predecessors(&mut self) {
        self.predecessors.clear();
        for (id, block) in self.blocks.iter().enumerate() {
            for succ in block.terminator.successors() {
                self.predecessors
                    .entry(succ)
                    .or_default()
                    .push(BlockId::new(id));
            }
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "fn {}:", self.name)?;
        for (id, block) in self.blocks() {
            writeln!(f, "{}:", id)?;
            for def in block.defs() {
                writeln!(f, "  {} = {:?}", def.var, def.inst)?;
            }
            writeln!(f, "  {:?}", block.terminator())?;
        }
        Ok(())
    }
}

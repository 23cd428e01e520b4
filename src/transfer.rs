//! Per-instruction abstract transfer functions (C4).
//!
//! Shaped after the teacher's `LatticeSemantics<L>::propagate` split
//! (`core/absint.rs`, `tests/concrete.rs`): each instruction kind gets its
//! own small function instead of one large match arm buried in the
//! solver.

use crate::cfg::{BinOp, BlockId, Function, Instruction, Operand, Var};
use crate::diagnostics::Diagnostic;
use crate::heuristic;
use crate::lattice::Interval;
use crate::predicate::{Comparison, PredicateCache};
use crate::store::RangeStore;

/// Applies one `BinaryOperator`. Only `Add`/`Sub` between at least one
/// constant have defined semantics (spec §4.4); anything else, including
/// `value op value`, conservatively binds to `⊤` with a diagnostic — the
/// prototype this is ported from never computed real arithmetic on two
/// non-constant operands either.
pub fn binary_op(
    store: &mut RangeStore,
    diagnostics: &mut Vec<Diagnostic>,
    block: BlockId,
    var: Var,
    op: BinOp,
    lhs: Operand,
    rhs: Operand,
) {
    match op {
        BinOp::Add | BinOp::Sub => {
            let is_const = |o: &Operand| matches!(o, Operand::Const(_));
            if !is_const(&lhs) && !is_const(&rhs) {
                diagnostics.push(Diagnostic::MixedReferenceBinaryOp { block, var });
                store.set(block, var, Interval::top());
                return;
            }
            let x = store.get(block, lhs);
            let y = store.get(block, rhs);
            let result = match op {
                BinOp::Add => Interval::add(x, y),
                BinOp::Sub => Interval::sub(x, y),
                BinOp::Other(_) => unreachable!(),
            };
            store.set(block, var, result);
        }
        BinOp::Other(name) => {
            diagnostics.push(Diagnostic::UnhandledInstruction { block, var, kind: name });
            store.set(block, var, Interval::top());
        }
    }
}

/// Records a `CmpInst` in the predicate cache. The comparison itself has
/// no interval result worth storing — only the branch that later reads
/// `var` as a condition acts on it.
pub fn cmp(predicates: &mut PredicateCache, var: Var, cmp: Comparison) {
    predicates.record(var, cmp);
}

/// Any instruction outside the recognized set: bind to `⊤`, emit a
/// diagnostic (spec §7).
pub fn unhandled(store: &mut RangeStore, diagnostics: &mut Vec<Diagnostic>, block: BlockId, var: Var, inst: &Instruction) {
    diagnostics.push(Diagnostic::UnhandledInstruction {
        block,
        var,
        kind: inst.kind_name(),
    });
    store.set(block, var, Interval::top());
}

/// `PHINode` transfer: meet the naive join of incoming facts with the
/// value's previous interval in this block (so repeated visits only ever
/// tighten, never re-widen), then try the loop trip-count heuristic,
/// which replaces that naive result outright when it applies.
pub fn phi(
    store: &mut RangeStore,
    predicates: &PredicateCache,
    func: &Function,
    block: BlockId,
    var: Var,
    incoming: &[(Operand, BlockId)],
) {
    let mut iter = incoming.iter();
    let joined = match iter.next() {
        Some((op0, blk0)) => {
            let mut acc = store.get(*blk0, *op0);
            for (op, blk) in iter {
                acc = Interval::join(acc, store.get(*blk, *op));
            }
            acc
        }
        None => Interval::top(),
    };

    let current = store.get_var(block, var);
    let mut result = Interval::meet(current, joined);

    if let Some(refined) = heuristic::try_trip_count(func, predicates, block, var, incoming) {
        result = Interval::meet(current, refined);
    }

    store.set(block, var, result);
}

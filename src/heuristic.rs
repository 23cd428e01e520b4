//! Loop trip-count heuristic (C6): replaces the naive φ-join (which
//! widens a monotone induction variable straight to `±∞`) with a
//! closed-form bound derived from the loop's own exit test.
//!
//! Grounded in `BranchRange.cpp`'s `searchInBasicBlock` (finds the
//! constant-step update) and `maxTripcount` (turns the exit comparison
//! into a trip count and a final window).

use crate::cfg::{BinOp, BlockId, Function, Instruction, Operand, Predicate, Var};
use crate::lattice::{to_endpoint, Endpoint, Interval};
use crate::narrow;
use crate::predicate::PredicateCache;

/// Attempts the heuristic for a two-incoming φ-node. Returns `None` if
/// the shape doesn't match (no constant/monotone-step incoming pair, no
/// recognizable exit test, or an `==` exit predicate the heuristic
/// doesn't define a trip count for).
pub fn try_trip_count(
    func: &Function,
    predicates: &PredicateCache,
    block: BlockId,
    phi_var: Var,
    incoming: &[(Operand, BlockId)],
) -> Option<Interval> {
    if incoming.len() != 2 {
        return None;
    }
    let (op0, blk0) = incoming[0];
    let (op1, blk1) = incoming[1];
    let (k, value_operand, back_blk) = match (op0, op1) {
        (Operand::Const(k), Operand::Value(v)) => (k, v, blk1),
        (Operand::Value(v), Operand::Const(k)) => (k, v, blk0),
        _ => return None,
    };

    let step = find_step(func, back_blk, phi_var, value_operand)?;
    let (pred, _signed, k_exit) = find_exit_test(func, predicates, block, phi_var)
        .or_else(|| find_exit_test(func, predicates, back_blk, phi_var))?;
    if matches!(pred, Predicate::Eq) {
        return None;
    }

    let diff = (k_exit as i64) - (k as i64);
    let base_t = diff.unsigned_abs();
    let t = match pred {
        Predicate::Lt | Predicate::Gt => base_t,
        Predicate::Le | Predicate::Ge => base_t + 1,
        Predicate::Eq => unreachable!(),
    } as i64;

    let result = if step >= 0 {
        let hi = (k as i64) + (step as i64) * t;
        Interval::new(Endpoint::Finite(k), to_endpoint(hi))
    } else {
        let lo = (k as i64) - ((-step) as i64) * t;
        Interval::new(to_endpoint(lo), Endpoint::Finite(k))
    };
    Some(result.canonicalize())
}

/// Looks for `value_operand = phi_var {+,-} const` in `back_blk`, the
/// loop's self-referencing predecessor, and returns the signed step.
fn find_step(func: &Function, back_blk: BlockId, phi_var: Var, value_operand: Var) -> Option<i32> {
    for def in func.block(back_blk).defs() {
        if def.var != value_operand {
            continue;
        }
        if let Instruction::BinaryOperator { op, lhs, rhs } = &def.inst {
            let step = match (op, lhs, rhs) {
                (BinOp::Add, Operand::Value(p), Operand::Const(c)) if *p == phi_var => Some(*c),
                (BinOp::Add, Operand::Const(c), Operand::Value(p)) if *p == phi_var => Some(*c),
                (BinOp::Sub, Operand::Value(p), Operand::Const(c)) if *p == phi_var => Some(-*c),
                _ => None,
            };
            if step.is_some() {
                return step;
            }
        }
    }
    None
}

/// Looks for a conditional terminator in `blk` comparing `phi_var`
/// against a constant, and returns that comparison in normalized form.
fn find_exit_test(
    func: &Function,
    predicates: &PredicateCache,
    blk: BlockId,
    phi_var: Var,
) -> Option<(Predicate, bool, i32)> {
    if let crate::cfg::Terminator::Branch { cond, .. } = func.block(blk).terminator() {
        let cmp = predicates.get(*cond)?;
        let (var, pred, signed, k) = narrow::normalize(&cmp)?;
        if var == phi_var {
            return Some((pred, signed, k));
        }
    }
    None
}

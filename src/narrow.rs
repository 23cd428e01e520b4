//! Branch narrowing (C5): deriving taken/not-taken intervals for the
//! compared value from a `CmpInst` against a constant.
//!
//! Grounded in `BranchRange.cpp`'s `computeCmpRange`. Where that function
//! and the table in the specification disagree (its unsigned `>` arm looks
//! transcribed wrong), this follows the table — the prototype is reference
//! material, not ground truth, where the two conflict on a point the table
//! states explicitly.

use crate::cfg::{Operand, Predicate, Var};
use crate::lattice::{to_endpoint, Endpoint, Interval};
use crate::predicate::Comparison;

/// Puts a comparison into canonical `value <pred> constant` form,
/// flipping the predicate if the constant was on the left. `None` if
/// neither or both operands are constants — there's no value to narrow.
pub fn normalize(cmp: &Comparison) -> Option<(Var, Predicate, bool, i32)> {
    match (cmp.lhs, cmp.rhs) {
        (Operand::Value(v), Operand::Const(k)) => Some((v, cmp.pred, cmp.signed, k)),
        (Operand::Const(k), Operand::Value(v)) => Some((v, cmp.pred.flip(), cmp.signed, k)),
        _ => None,
    }
}

pub enum NarrowResult {
    Refined {
        var: Var,
        taken: Interval,
        not_taken: Interval,
    },
    Unrefinable,
}

fn checked_add1(k: i32) -> Endpoint {
    to_endpoint(k as i64 + 1)
}

fn checked_sub1(k: i32) -> Endpoint {
    to_endpoint(k as i64 - 1)
}

/// Clamps a lower bound up to zero. Used by the unsigned `<`/`>` arms,
/// where a negative or `-inf` lower bound is unreachable under unsigned
/// comparison.
fn clamp_nonneg(i: Interval) -> Interval {
    let lo = match i.lo {
        Endpoint::NegInf => Endpoint::Finite(0),
        Endpoint::Finite(x) if x < 0 => Endpoint::Finite(0),
        other => other,
    };
    Interval::new(lo, i.hi)
}

fn table(pred: Predicate, k: i32) -> (Interval, Interval) {
    match pred {
        Predicate::Lt => (
            Interval::new(Endpoint::NegInf, checked_sub1(k)),
            Interval::new(Endpoint::Finite(k), Endpoint::PosInf),
        ),
        Predicate::Le => (
            Interval::new(Endpoint::NegInf, Endpoint::Finite(k)),
            Interval::new(checked_add1(k), Endpoint::PosInf),
        ),
        Predicate::Gt => (
            Interval::new(checked_add1(k), Endpoint::PosInf),
            Interval::new(Endpoint::NegInf, Endpoint::Finite(k)),
        ),
        Predicate::Ge => (
            Interval::new(Endpoint::Finite(k), Endpoint::PosInf),
            Interval::new(Endpoint::NegInf, checked_sub1(k)),
        ),
        Predicate::Eq => (Interval::point(k), Interval::top()),
    }
}

/// Computes the taken/not-taken intervals for the compared value, per
/// spec §4.5's table.
pub fn narrow(cmp: &Comparison) -> NarrowResult {
    match normalize(cmp) {
        None => NarrowResult::Unrefinable,
        Some((var, pred, signed, k)) => {
            let (mut taken, mut not_taken) = table(pred, k);
            if !signed && matches!(pred, Predicate::Lt | Predicate::Gt) {
                taken = clamp_nonneg(taken);
                not_taken = clamp_nonneg(not_taken);
            }
            NarrowResult::Refined {
                var,
                taken: taken.canonicalize(),
                not_taken: not_taken.canonicalize(),
            }
        }
    }
}

//! Non-fatal diagnostics the solver collects while it runs (spec §7).
//!
//! Every condition here is an expected, handled outcome — none of them
//! abort the analysis. A `color_eyre::Report` is reserved for genuine
//! IR-level invariant violations the CFG view itself would refuse to
//! represent, never for one of these.

use std::fmt;

use crate::cfg::{BlockId, Var};

#[derive(Debug, Clone)]
pub enum Diagnostic {
    /// An instruction outside the recognized set; result bound to `⊤`.
    UnhandledInstruction {
        block: BlockId,
        var: Var,
        kind: &'static str,
    },
    /// A conditional branch whose condition has no recorded comparison;
    /// both successors get the unrefined join.
    PredicateCacheMiss { block: BlockId, cond: Var },
    /// A comparison between two non-constant values; narrowing has no
    /// constant to pin to, so the compared value binds to `⊤` instead.
    UnrefinableComparison { block: BlockId, cond: Var },
    /// A binary add/sub between two non-constant values; the original
    /// prototype only ever refines `value op constant` forms.
    MixedReferenceBinaryOp { block: BlockId, var: Var },
    /// The worklist solver hit its iteration cap with work still queued.
    IterationCapReached { max_iters: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Diagnostic::UnhandledInstruction { block, var, kind } => {
                write!(f, "{}: {} <- unhandled instruction '{}', bound to TOP", block, var, kind)
            }
            Diagnostic::PredicateCacheMiss { block, cond } => {
                write!(f, "{}: branch on {} has no recorded comparison, both arms unrefined", block, cond)
            }
            Diagnostic::UnrefinableComparison { block, cond } => {
                write!(f, "{}: comparison {} has no constant operand, not narrowed", block, cond)
            }
            Diagnostic::MixedReferenceBinaryOp { block, var } => {
                write!(f, "{}: {} <- binary op between two values, bound to TOP", block, var)
            }
            Diagnostic::IterationCapReached { max_iters } => {
                write!(f, "worklist did not converge within {} iterations", max_iters)
            }
        }
    }
}

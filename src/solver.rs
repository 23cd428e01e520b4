//! The worklist fixed-point solver (C7).
//!
//! Shaped after `interp.rs`/`type_propagation.rs`'s `Interpreter` (a
//! `prepare`/`step`/`result` cycle around a mutable frame): `analyze` is
//! the pure entry point, `Solver` is the mutable frame it drives to a
//! fixed point.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info_span};

use crate::cfg::{BlockId, Function, Instruction, Terminator, Var};
use crate::config::Config;
use crate::diagnostics::Diagnostic;
use crate::lattice::Interval;
use crate::narrow::{self, NarrowResult};
use crate::predicate::{Comparison, PredicateCache};
use crate::report::Report;
use crate::store::RangeStore;
use crate::transfer;

struct Solver<'f> {
    func: &'f Function,
    config: &'f Config,
    store: RangeStore,
    predicates: PredicateCache,
    diagnostics: Vec<Diagnostic>,
    worklist: VecDeque<BlockId>,
    queued: HashSet<BlockId>,
}

impl<'f> Solver<'f> {
    fn new(func: &'f Function, config: &'f Config) -> Solver<'f> {
        let entry = func.entry();
        let mut store = RangeStore::default();
        store.mark_visited(entry);
        let mut queued = HashSet::new();
        queued.insert(entry);
        Solver {
            func,
            config,
            store,
            predicates: PredicateCache::default(),
            diagnostics: Vec::new(),
            worklist: VecDeque::from([entry]),
            queued,
        }
    }

    fn enqueue(&mut self, block: BlockId) {
        if self.queued.insert(block) {
            self.worklist.push_back(block);
        }
    }

    fn run(&mut self) -> (usize, bool) {
        let mut iter = 0usize;
        while let Some(block) = self.worklist.front().copied() {
            if iter >= self.config.max_iters {
                return (iter, true);
            }
            self.worklist.pop_front();
            self.queued.remove(&block);
            iter += 1;
            debug!(iter, block = block.index(), "processing block");
            self.process_block(block);
        }
        (iter, false)
    }

    fn process_block(&mut self, block: BlockId) {
        for def in self.func.block(block).defs() {
            match &def.inst {
                Instruction::BinaryOperator { op, lhs, rhs } => {
                    transfer::binary_op(&mut self.store, &mut self.diagnostics, block, def.var, *op, *lhs, *rhs);
                }
                Instruction::Cmp { pred, signed, lhs, rhs } => {
                    transfer::cmp(
                        &mut self.predicates,
                        def.var,
                        Comparison {
                            pred: *pred,
                            signed: *signed,
                            lhs: *lhs,
                            rhs: *rhs,
                        },
                    );
                }
                Instruction::Phi { incoming } => {
                    transfer::phi(&mut self.store, &self.predicates, self.func, block, def.var, incoming);
                }
                other => {
                    transfer::unhandled(&mut self.store, &mut self.diagnostics, block, def.var, other);
                }
            }
        }

        match *self.func.block(block).terminator() {
            Terminator::Return(_) => {}
            Terminator::Jump(succ) => {
                if self.propagate_unconditional(block, succ) {
                    self.enqueue(succ);
                }
            }
            Terminator::Branch { cond, if_true, if_false } => {
                let (changed_true, changed_false) = self.propagate_conditional(block, cond, if_true, if_false);
                if changed_true {
                    self.enqueue(if_true);
                }
                if changed_false {
                    self.enqueue(if_false);
                }
            }
        }
    }

    /// Copies `from`'s facts into `to` on first visit, joins them in
    /// otherwise (spec §4.7).
    fn propagate_unconditional(&mut self, from: BlockId, to: BlockId) -> bool {
        let newly_visited = !self.store.visited(to);
        self.store.mark_visited(to);
        let src = self.store.sorted_entries(from);
        let mut changed = newly_visited;
        for (v, i) in src {
            let value = if newly_visited {
                i
            } else {
                let old = self.store.get_var(to, v);
                let joined = Interval::join(old, i);
                debug_assert!(old <= joined, "{} join-updated {} -> {} in {}, shrank", v, old, joined, to);
                joined
            };
            if self.store.set(to, v, value) {
                changed = true;
            }
        }
        changed
    }

    /// Like `propagate_unconditional`, but the compared value is met
    /// against its branch-narrowed interval instead of joined plainly.
    fn propagate_refined(&mut self, from: BlockId, to: BlockId, refined_var: Var, refined: Interval) -> bool {
        let newly_visited = !self.store.visited(to);
        self.store.mark_visited(to);
        let src = self.store.sorted_entries(from);
        let mut changed = newly_visited;
        let mut saw_refined = false;
        for (v, i) in src {
            let value = if v == refined_var {
                // Meet-narrowing, not join: the one exemption the
                // monotonicity property carves out for branch-refined
                // installs (spec §8).
                saw_refined = true;
                Interval::meet(self.store.get_var(from, v), refined)
            } else if newly_visited {
                i
            } else {
                let old = self.store.get_var(to, v);
                let joined = Interval::join(old, i);
                debug_assert!(old <= joined, "{} join-updated {} -> {} in {}, shrank", v, old, joined, to);
                joined
            };
            if self.store.set(to, v, value) {
                changed = true;
            }
        }
        if !saw_refined {
            let value = Interval::meet(self.store.get_var(from, refined_var), refined);
            if self.store.set(to, refined_var, value) {
                changed = true;
            }
        }
        changed
    }

    fn propagate_conditional(
        &mut self,
        from: BlockId,
        cond: Var,
        if_true: BlockId,
        if_false: BlockId,
    ) -> (bool, bool) {
        match self.predicates.get(cond) {
            None => {
                self.diagnostics.push(Diagnostic::PredicateCacheMiss { block: from, cond });
                let t = self.propagate_unconditional(from, if_true);
                let f = self.propagate_unconditional(from, if_false);
                (t, f)
            }
            Some(comparison) => match narrow::narrow(&comparison) {
                NarrowResult::Unrefinable => {
                    self.diagnostics.push(Diagnostic::UnrefinableComparison { block: from, cond });
                    let t = self.propagate_unconditional(from, if_true);
                    let f = self.propagate_unconditional(from, if_false);
                    (t, f)
                }
                NarrowResult::Refined { var, taken, not_taken } => {
                    let t = self.propagate_refined(from, if_true, var, taken);
                    let f = self.propagate_refined(from, if_false, var, not_taken);
                    (t, f)
                }
            },
        }
    }
}

/// Runs the interval analysis to a fixed point and returns the report.
/// Pure: no process-wide state, safe to call concurrently on distinct
/// functions (spec Design Notes §9).
pub fn analyze(func: &Function, config: &Config) -> Report {
    let span = info_span!("analyze", function = func.name());
    let _guard = span.enter();

    let mut solver = Solver::new(func, config);
    let (iterations, hit_cap) = solver.run();
    if hit_cap {
        solver.diagnostics.push(Diagnostic::IterationCapReached { max_iters: config.max_iters });
    }

    Report {
        function_name: func.name().to_string(),
        store: solver.store,
        diagnostics: solver.diagnostics,
        all_blocks: func.block_ids(),
        iterations,
        hit_iteration_cap: hit_cap,
        config: config.clone(),
    }
}

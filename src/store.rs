//! Per-block, per-value interval facts (C3).

use std::collections::HashMap;

use crate::cfg::{BlockId, Operand, Var};
use crate::lattice::Interval;

/// `Σ: BlockId -> (Var -> Interval)`, with the read-default of `⊤` on a
/// value miss and a constant's own point interval for `Operand::Const`.
/// "Visited" is tracked by sub-map presence, not by a separate set —
/// entry-block seeding and `Jump`/`Branch` propagation both go through
/// `mark_visited`.
#[derive(Debug, Default, Clone)]
pub struct RangeStore {
    blocks: HashMap<BlockId, HashMap<Var, Interval>>,
}

impl RangeStore {
    pub fn visited(&self, block: BlockId) -> bool {
        self.blocks.contains_key(&block)
    }

    pub fn mark_visited(&mut self, block: BlockId) {
        self.blocks.entry(block).or_default();
    }

    pub fn get(&self, block: BlockId, operand: Operand) -> Interval {
        match operand {
            Operand::Const(k) => Interval::point(k),
            Operand::Value(v) => self.get_var(block, v),
        }
    }

    pub fn get_var(&self, block: BlockId, var: Var) -> Interval {
        self.blocks
            .get(&block)
            .and_then(|m| m.get(&var))
            .copied()
            .unwrap_or_else(Interval::top)
    }

    /// Installs a new interval for `var` in `block`. Returns whether the
    /// value changed, which the solver uses to decide whether a successor
    /// needs re-enqueuing.
    pub fn set(&mut self, block: BlockId, var: Var, interval: Interval) -> bool {
        let interval = interval.canonicalize();
        let map = self.blocks.entry(block).or_default();
        match map.get(&var) {
            Some(prev) if *prev == interval => false,
            _ => {
                map.insert(var, interval);
                true
            }
        }
    }

    /// Entries for `block` sorted by `Var` id, for deterministic reporting.
    pub fn sorted_entries(&self, block: BlockId) -> Vec<(Var, Interval)> {
        let mut entries: Vec<(Var, Interval)> = self
            .blocks
            .get(&block)
            .map(|m| m.iter().map(|(&v, &i)| (v, i)).collect())
            .unwrap_or_default();
        entries.sort_by_key(|(v, _)| v.id());
        entries
    }
}

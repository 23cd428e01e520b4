//! The reporter (C8): renders the final store as per-block, per-value
//! lines with a derived bit-width, in the teacher's colorized, indented
//! `Display` style (`core/display.rs`).

use std::fmt;

use yansi::Paint;
use {indenter::indented, std::fmt::Write as _};

use crate::cfg::BlockId;
use crate::config::Config;
use crate::diagnostics::Diagnostic;
use crate::lattice::Endpoint;
use crate::store::RangeStore;

#[derive(Debug)]
pub struct Report {
    pub function_name: String,
    pub store: RangeStore,
    pub diagnostics: Vec<Diagnostic>,
    pub all_blocks: Vec<BlockId>,
    pub iterations: usize,
    pub hit_iteration_cap: bool,
    pub config: Config,
}

impl Report {
    /// `⌈log2(max(range, 2))⌉ + 1` (spec §4.8).
    pub fn bit_width(lo: i32, hi: i32) -> u32 {
        let range = (hi as i64 - lo as i64 + 1) as f64;
        (range.max(2.0).log2().ceil() as u32) + 1
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.hit_iteration_cap {
            writeln!(f, "{}", Paint::red("(MAX ITERATIONS LIMIT)").bold())?;
        }
        writeln!(f, "{}", Paint::white(format!("fn {}:", self.function_name)).bold())?;

        for &block in &self.all_blocks {
            if !self.store.visited(block) {
                if self.config.report_unvisited {
                    writeln!(indented(f).with_str("  "), "{}: {}", block, Paint::yellow("unreachable").dimmed())?;
                }
                continue;
            }
            writeln!(f, "{}:", Paint::white(block).bold())?;
            for (var, interval) in self.store.sorted_entries(block) {
                let mut fmter = indented(f).with_str("  ");
                match (interval.lo, interval.hi) {
                    (Endpoint::Finite(lo), Endpoint::Finite(hi)) => {
                        let range = hi as i64 - lo as i64 + 1;
                        let bits = Report::bit_width(lo, hi);
                        writeln!(fmter, "{}({}, {}) = {} {{{} bit}}", var, lo, hi, range, bits)?;
                    }
                    (lo, hi) => {
                        writeln!(fmter, "{}({}, {}) = {}", var, lo, hi, Paint::cyan("MAX"))?;
                    }
                }
            }
        }

        if !self.diagnostics.is_empty() {
            writeln!(f, "{}", Paint::magenta("--- diagnostics ---").dimmed())?;
            for diagnostic in &self.diagnostics {
                writeln!(indented(f).with_str("  "), "{}", diagnostic)?;
            }
        }

        Ok(())
    }
}

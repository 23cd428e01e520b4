#![doc = include_str!("../README.md")]

pub mod builder;
pub mod cfg;
pub mod config;
pub mod diagnostics;
pub mod heuristic;
pub mod lattice;
pub mod narrow;
pub mod predicate;
pub mod report;
pub mod solver;
pub mod store;

pub use builder::FunctionBuilder;
pub use cfg::{BasicBlock, BinOp, Function, Instruction, Operand, Predicate, Terminator, Var};
pub use config::Config;
pub use diagnostics::Diagnostic;
pub use lattice::{Endpoint, Interval};
pub use report::Report;
pub use solver::analyze;
pub use store::RangeStore;

extern crate color_eyre;
extern crate tracing;
extern crate tracing_subscriber;

/// Initializes a global `tracing` subscriber and installs `color_eyre`'s
/// panic/error report hooks. Mirrors `core::diagnostics`'s setup
/// convention: a binary embedding this crate calls this once, at
/// startup, not per-analysis.
pub fn diagnostics_setup() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::try_init()
        .map_err(|e| color_eyre::eyre::eyre!("failed to install tracing subscriber: {}", e))?;
    Ok(())
}

//! Analysis configuration (spec §6).

/// Tunables for one `analyze()` run. Mirrors the prototype's single
/// literal knob (`maxLoops = 1000`) plus the two ambient switches this
/// port adds: which signedness to assume absent explicit typing, and
/// whether the report should call out unreached blocks.
#[derive(Debug, Clone)]
pub struct Config {
    pub max_iters: usize,
    pub signed_default: bool,
    pub report_unvisited: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            max_iters: 1000,
            signed_default: true,
            report_unvisited: false,
        }
    }
}

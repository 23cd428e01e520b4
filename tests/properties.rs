//! Cross-cutting quantified properties (spec §8): monotonicity of the
//! join-based propagation, and determinism of the solver's output.

use rangeflow::cfg::BlockId;
use rangeflow::lattice::{Endpoint, Interval};
use rangeflow::{analyze, BinOp, Config, FunctionBuilder, Operand, Predicate};

#[test]
fn join_never_shrinks_the_subset_order() {
    // The same relation the solver's debug assertions check on every
    // join-path propagation (solver.rs's `propagate_unconditional` and
    // `propagate_refined`): joining in a new fact can only grow the
    // stored interval under `<=`.
    let cases = [
        (Interval::point(3), Interval::point(3)),
        (Interval::point(3), Interval::point(4)),
        (
            Interval::new(Endpoint::Finite(0), Endpoint::Finite(5)),
            Interval::new(Endpoint::Finite(-2), Endpoint::Finite(2)),
        ),
        (Interval::top(), Interval::point(0)),
        (
            Interval::new(Endpoint::NegInf, Endpoint::Finite(0)),
            Interval::new(Endpoint::Finite(0), Endpoint::PosInf),
        ),
    ];
    for (a, b) in cases {
        let joined = Interval::join(a, b);
        assert!(a <= joined, "{} did not stay <= its join with {} ({})", a, b, joined);
        assert!(b <= joined, "{} did not stay <= its join with {} ({})", b, a, joined);
    }
}

#[test]
fn subset_ordering_is_none_for_incomparable_intervals() {
    let a = Interval::new(Endpoint::Finite(0), Endpoint::Finite(5));
    let b = Interval::new(Endpoint::Finite(3), Endpoint::Finite(8));
    assert_eq!(a.partial_cmp(&b), None);
}

/// Builds a counted ascending loop (`i = 0; while i < bound { i += 1 }`)
/// and returns it along with the header block's `i` phi and its id.
fn ascending_loop(name: &str, bound: i32) -> (rangeflow::Function, BlockId, rangeflow::Var) {
    let mut b = FunctionBuilder::new(name);
    let entry = b.entry();
    let header = b.push_block();
    let body = b.push_block();
    let exit = b.push_block();
    let i_next = b.reserve_var();

    b.set_current_block(entry);
    b.set_jump(header);

    b.set_current_block(header);
    let i_phi = b.push_phi(vec![(Operand::Const(0), entry), (Operand::Value(i_next), body)]);
    let cond = b.push_cmp_default(Predicate::Lt, Operand::Value(i_phi), Operand::Const(bound));
    b.set_branch(cond, body, exit);

    b.set_current_block(body);
    b.define_binop(i_next, BinOp::Add, Operand::Value(i_phi), Operand::Const(1));
    b.set_jump(header);

    b.set_current_block(exit);
    b.set_return(Some(Operand::Value(i_phi)));

    (b.finish().unwrap(), header, i_phi)
}

#[test]
fn ascending_loop_header_interval_is_a_superset_of_its_seed() {
    // A real multi-iteration fixed-point run, not just raw `Interval`
    // values in isolation: if the solver's join-path debug assertions
    // ever fired, this test would panic before the assert below runs.
    let (func, header, i_phi) = ascending_loop("monotonic_loop", 20);
    let report = analyze(&func, &Config::default());
    let fact = report.store.get_var(header, i_phi);
    assert!(Interval::point(0) <= fact, "fixed point {} lost the loop's initial value", fact);
}

#[test]
fn two_runs_on_the_same_function_render_byte_identical_reports() {
    let (func, _, _) = ascending_loop("deterministic_sample", 10);
    let config = Config::default();

    let report_a = analyze(&func, &config);
    let report_b = analyze(&func, &config);
    assert_eq!(format!("{}", report_a), format!("{}", report_b));
}

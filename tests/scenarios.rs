//! End-to-end scenarios against the worklist solver.

use rangeflow::lattice::Endpoint;
use rangeflow::{analyze, BinOp, Config, Diagnostic, FunctionBuilder, Interval, Operand, Predicate};

#[test]
fn straight_line_add() {
    let mut b = FunctionBuilder::new("straight_line_add");
    let entry = b.entry();
    let y = b.push_add(Operand::Const(3), Operand::Const(4));
    b.set_return(Some(Operand::Value(y)));
    let func = b.finish().unwrap();

    let report = analyze(&func, &Config::default());
    assert_eq!(report.store.get_var(entry, y), Interval::point(7));
    assert!(report.diagnostics.is_empty());
}

#[test]
fn counted_loop_ascending() {
    let mut b = FunctionBuilder::new("counted_loop_ascending");
    let entry = b.entry();
    let header = b.push_block();
    let body = b.push_block();
    let exit = b.push_block();

    let i_next = b.reserve_var();

    b.set_current_block(entry);
    b.set_jump(header);

    b.set_current_block(header);
    let i_phi = b.push_phi(vec![(Operand::Const(0), entry), (Operand::Value(i_next), body)]);
    let cond = b.push_cmp_default(Predicate::Lt, Operand::Value(i_phi), Operand::Const(10));
    b.set_branch(cond, body, exit);

    b.set_current_block(body);
    b.define_binop(i_next, BinOp::Add, Operand::Value(i_phi), Operand::Const(1));
    b.set_jump(header);

    b.set_current_block(exit);
    b.set_return(Some(Operand::Value(i_phi)));

    let func = b.finish().unwrap();
    let report = analyze(&func, &Config::default());

    assert_eq!(
        report.store.get_var(header, i_phi),
        Interval::new(Endpoint::Finite(0), Endpoint::Finite(10))
    );
}

#[test]
fn counted_loop_descending() {
    let mut b = FunctionBuilder::new("counted_loop_descending");
    let entry = b.entry();
    let header = b.push_block();
    let body = b.push_block();
    let exit = b.push_block();

    let i_next = b.reserve_var();

    b.set_current_block(entry);
    b.set_jump(header);

    b.set_current_block(header);
    let i_phi = b.push_phi(vec![(Operand::Const(100), entry), (Operand::Value(i_next), body)]);
    let cond = b.push_cmp(Predicate::Gt, true, Operand::Value(i_phi), Operand::Const(0));
    b.set_branch(cond, body, exit);

    b.set_current_block(body);
    b.define_binop(i_next, BinOp::Sub, Operand::Value(i_phi), Operand::Const(1));
    b.set_jump(header);

    b.set_current_block(exit);
    b.set_return(Some(Operand::Value(i_phi)));

    let func = b.finish().unwrap();
    let report = analyze(&func, &Config::default());

    assert_eq!(
        report.store.get_var(header, i_phi),
        Interval::new(Endpoint::Finite(0), Endpoint::Finite(100))
    );
}

#[test]
fn two_branch_merge_narrows_each_side() {
    let mut b = FunctionBuilder::new("two_branch_merge");
    let entry = b.entry();
    let neg_branch = b.push_block();
    let pos_branch = b.push_block();
    let merge = b.push_block();

    b.set_current_block(entry);
    let x = b.push_unhandled("param");
    let cond = b.push_cmp(Predicate::Lt, true, Operand::Value(x), Operand::Const(0));
    b.set_branch(cond, neg_branch, pos_branch);

    b.set_current_block(neg_branch);
    let y_neg = b.push_sub(Operand::Const(0), Operand::Value(x));
    b.set_jump(merge);

    b.set_current_block(pos_branch);
    b.set_jump(merge);

    b.set_current_block(merge);
    let y = b.push_phi(vec![(Operand::Value(y_neg), neg_branch), (Operand::Value(x), pos_branch)]);
    b.set_return(Some(Operand::Value(y)));

    let func = b.finish().unwrap();
    let report = analyze(&func, &Config::default());

    assert_eq!(
        report.store.get_var(neg_branch, x),
        Interval::new(Endpoint::NegInf, Endpoint::Finite(-1))
    );
    assert_eq!(
        report.store.get_var(pos_branch, x),
        Interval::new(Endpoint::Finite(0), Endpoint::PosInf)
    );
    assert_eq!(
        report.store.get_var(merge, y),
        Interval::new(Endpoint::Finite(0), Endpoint::PosInf)
    );
}

#[test]
fn unhandled_opcode_binds_to_top_with_diagnostic() {
    let mut b = FunctionBuilder::new("unhandled_opcode");
    let entry = b.entry();
    let x = b.push_add(Operand::Const(0), Operand::Const(10));
    let y = b.push_other_binop("mul", Operand::Value(x), Operand::Const(2));
    b.set_return(Some(Operand::Value(y)));
    let func = b.finish().unwrap();

    let report = analyze(&func, &Config::default());
    assert!(report.store.get_var(entry, y).is_top());
    assert!(report
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::UnhandledInstruction { kind, .. } if *kind == "mul")));
}

#[test]
fn mixed_reference_binary_op_binds_to_top() {
    let mut b = FunctionBuilder::new("mixed_reference");
    let entry = b.entry();
    let x = b.push_unhandled("param_a");
    let y = b.push_unhandled("param_b");
    let z = b.push_add(Operand::Value(x), Operand::Value(y));
    b.set_return(Some(Operand::Value(z)));
    let func = b.finish().unwrap();

    let report = analyze(&func, &Config::default());
    assert!(report.store.get_var(entry, z).is_top());
    assert!(report
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::MixedReferenceBinaryOp { var, .. } if *var == z)));
}

#[test]
fn predicate_cache_miss_leaves_both_arms_unrefined() {
    // A branch on a value that was never defined by a `CmpInst`: there's
    // no comparison to narrow with, so both successors just inherit the
    // joined facts unrefined.
    let mut b = FunctionBuilder::new("predicate_cache_miss");
    let entry = b.entry();
    let if_true = b.push_block();
    let if_false = b.push_block();

    b.set_current_block(entry);
    let cond = b.push_unhandled("opaque_bool");
    b.set_branch(cond, if_true, if_false);

    b.set_current_block(if_true);
    b.set_return(None);

    b.set_current_block(if_false);
    b.set_return(None);

    let func = b.finish().unwrap();
    let report = analyze(&func, &Config::default());

    assert!(report
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::PredicateCacheMiss { cond: c, .. } if *c == cond)));
}

#[test]
fn iteration_cap_is_reported_when_hit() {
    let mut b = FunctionBuilder::new("iteration_cap");
    let entry = b.entry();
    let header = b.push_block();
    let body = b.push_block();

    let i_next = b.reserve_var();

    b.set_current_block(entry);
    b.set_jump(header);

    b.set_current_block(header);
    let i_phi = b.push_phi(vec![(Operand::Const(0), entry), (Operand::Value(i_next), body)]);
    let cond = b.push_cmp(Predicate::Lt, true, Operand::Value(i_phi), Operand::Const(10));
    b.set_branch(cond, body, header);

    b.set_current_block(body);
    b.define_binop(i_next, BinOp::Add, Operand::Value(i_phi), Operand::Const(1));
    b.set_jump(header);

    let func = b.finish().unwrap();
    let config = Config {
        max_iters: 1,
        ..Config::default()
    };
    let report = analyze(&func, &config);

    assert!(report.hit_iteration_cap);
    assert!(matches!(report.diagnostics.last(), Some(Diagnostic::IterationCapReached { max_iters: 1 })));
}

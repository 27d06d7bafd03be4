//! End-to-end graph-coloring scenario (§8, S3): objective = number of
//! distinct colors in use, constraint = number of violated edges. Built
//! entirely from composable library invariants — `IsEqualInvariant` +
//! `OrInvariant` per color, `RelationalInvariant` + `SumInvariant` per
//! edge set, `ComparatorInvariant` as the hard constraint.

use crate::dag::{Dag, NodeKind};
use crate::invariants::aggregate::{ComparatorInvariant, ObjectiveInvariant};
use crate::invariants::arithmetic::SumInvariant;
use crate::invariants::boolean::{IsEqualInvariant, OrInvariant};
use crate::invariants::relational::{RelOp, RelationalInvariant};
use crate::{DecisionValue, Move};

/// Builds a triangle (nodes 0-1-2, all pairwise adjacent) colorable with
/// up to `max_color` colors, reporting the combined score
/// `objective + 10 * constraint` the way an external caller displays it.
fn build_triangle(max_color: i64, initial: [i64; 3]) -> Dag {
    let initial_vals: Vec<DecisionValue> = initial.iter().map(|&c| DecisionValue::Int(c)).collect();
    let domains = vec![(1, max_color); 3];
    let mut dag = Dag::new(&initial_vals, &domains, 1e9);

    let mut used_colors = Vec::new();
    for color in 1..=max_color {
        let is_eq: Vec<u32> = (0..3)
            .map(|node| dag.add_invariant(format!("node{node}_is_{color}"), Box::new(IsEqualInvariant { v: color }), NodeKind::Other, &[node]))
            .collect();
        let initial_true_count = initial.iter().filter(|&&c| c == color).count() as u32;
        let used = dag.add_invariant(format!("color{color}_used"), Box::new(OrInvariant::new(initial_true_count)), NodeKind::Other, &is_eq);
        used_colors.push(used);
    }
    let color_count = dag.add_invariant("color_count", Box::new(SumInvariant), NodeKind::Other, &used_colors);
    dag.add_invariant("objective", Box::new(ObjectiveInvariant), NodeKind::Other, &[color_count]);

    let edges = [(0u32, 1u32), (1, 2), (2, 0)];
    let violations: Vec<u32> = edges
        .iter()
        .map(|&(a, b)| {
            dag.add_invariant(
                format!("edge_{a}_{b}"),
                Box::new(RelationalInvariant::new(RelOp::NotEqual, a, b, initial[a as usize], initial[b as usize])),
                NodeKind::Other,
                &[a, b],
            )
        })
        .collect();
    let violation_sum = dag.add_invariant("violation_sum", Box::new(SumInvariant), NodeKind::Other, &violations);
    let initial_violations = edges.iter().filter(|&&(a, b)| initial[a as usize] == initial[b as usize]).count() as f64;
    dag.add_invariant(
        "edges_ok",
        Box::new(ComparatorInvariant::new(0.0, initial_violations)),
        NodeKind::Other,
        &[violation_sum],
    );

    dag.init().unwrap();
    dag
}

fn combined(objective: f64, constraint: f64, alpha: f64) -> f64 {
    objective + alpha * constraint
}

#[test]
fn s3_monochrome_triangle_is_infeasible_and_recoloring_fixes_it() {
    let mut dag = build_triangle(3, [1, 1, 1]);

    let baseline = dag.run_init();
    assert_eq!(baseline.objective, 1.0, "only color 1 is in use");
    assert_eq!(baseline.constraint, 3.0, "all three edges are monochrome");
    assert!(!baseline.feasible);
    assert_eq!(combined(baseline.objective, baseline.constraint, 10.0), 31.0);

    let mv = Move::new(vec![(1, DecisionValue::Int(2)), (2, DecisionValue::Int(3))]);
    let result = dag.run_delta(&mv);
    // Colors 2 and 3 newly come into use (color 1 stays in use via node 0),
    // so color_count goes from 1 to 3: objective_delta == 2. All three
    // edges go from violated to satisfied: constraint_delta == -3.
    assert_eq!(result.objective_delta, 2.0);
    assert_eq!(result.constraint_delta, -3.0);
    assert!(result.feasible);
    assert_eq!(combined(result.objective_delta, result.constraint_delta, 10.0), -28.0);

    dag.commit();
    // A full re-derivation after commit must agree with the delta just
    // applied (§8 testable property 5: delta-full consistency).
    let after = dag.run_init();
    assert_eq!(after.objective, 3.0, "all three colors now in use");
    assert_eq!(after.constraint, 0.0);
    assert!(after.feasible);
    assert_eq!(combined(after.objective, after.constraint, 10.0), 3.0);
}

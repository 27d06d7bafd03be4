//! End-to-end successor-array TSP scenario (§8, S4): each city's decision
//! variable is its successor city; `ElementInvariant` looks up the fixed
//! distance-table row for that city, `SumInvariant` totals the tour length,
//! and `AllDifferentInvariant` penalizes successor collisions (a necessary,
//! not sufficient, condition for a single Hamiltonian cycle — subtour
//! elimination is out of scope here).

use crate::dag::{Dag, NodeKind};
use crate::invariants::aggregate::{ComparatorInvariant, ObjectiveInvariant};
use crate::invariants::arithmetic::SumInvariant;
use crate::invariants::indexing::ElementInvariant;
use crate::invariants::setcount::AllDifferentInvariant;
use crate::{DecisionValue, Move};

const DIST: [[i64; 4]; 4] = [[0, 10, 15, 20], [10, 0, 35, 25], [15, 35, 0, 12], [20, 25, 12, 0]];

/// Wires a 4-city successor-array tour: `objective = Σ dist[i][succ(i)]`,
/// `constraint = max(0, collisions − 0)` over the successor values.
fn build_tour(initial_succ: [i64; 4]) -> Dag {
    let initial_vals: Vec<DecisionValue> = initial_succ.iter().map(|&s| DecisionValue::Int(s)).collect();
    let domains = vec![(0, 3); 4];
    let mut dag = Dag::new(&initial_vals, &domains, 1e9);

    let legs: Vec<u32> = (0..4u32)
        .map(|city| {
            dag.add_invariant(
                format!("leg_{city}"),
                Box::new(ElementInvariant { out_index: 4 + city, elements: DIST[city as usize].to_vec() }),
                NodeKind::Other,
                &[city],
            )
        })
        .collect();
    let total = dag.add_invariant("total_distance", Box::new(SumInvariant), NodeKind::Other, &legs);
    dag.add_invariant("objective", Box::new(ObjectiveInvariant), NodeKind::Other, &[total]);

    let collisions = dag.add_invariant(
        "collisions",
        Box::new(AllDifferentInvariant::new(&initial_succ)),
        NodeKind::Other,
        &[0, 1, 2, 3],
    );
    dag.add_invariant("tour_ok", Box::new(ComparatorInvariant::new(0.0, 0.0)), NodeKind::Other, &[collisions]);

    dag.init().unwrap();
    dag
}

#[test]
fn s4_successor_swap_shortens_tour_but_breaks_the_permutation() {
    let mut dag = build_tour([1, 2, 3, 0]);

    let baseline = dag.run_init();
    assert_eq!(baseline.objective, 77.0, "0->1->2->3->0: 10+35+12+20");
    assert_eq!(baseline.constraint, 0.0);
    assert!(baseline.feasible);

    // City 1's successor moves from 2 to 3, city 3's from 0 to 2: both
    // legs get shorter, but city 2 is now nobody's successor while city 3
    // is claimed twice.
    let mv = Move::new(vec![(1, DecisionValue::Int(3)), (3, DecisionValue::Int(2))]);
    let result = dag.run_delta(&mv);
    assert_eq!(result.objective_delta, -18.0, "(25+12) - (35+20)");
    assert_eq!(result.constraint_delta, 1.0, "successor value 3 is now claimed by both city 1 and city 2");
    assert!(!result.feasible);

    dag.commit();
    let after = dag.run_init();
    assert_eq!(after.objective, 59.0);
    assert_eq!(after.constraint, 1.0);
    assert!(!after.feasible);
}

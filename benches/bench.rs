use ripplecore::dag::message::ResultFull;
use ripplecore::dag::{Dag, NodeKind};
use ripplecore::invariants::aggregate::{ComparatorInvariant, ObjectiveInvariant};
use ripplecore::invariants::arithmetic::{ScalarProductInvariant, SumInvariant};
use ripplecore::invariants::boolean::{IsEqualInvariant, OrInvariant};
use ripplecore::invariants::relational::{RelOp, RelationalInvariant};
use ripplecore::{DecisionValue, Move};

const KNAPSACK_SIZE: u32 = 64;
const COLORING_NODES: u32 = 32;
const COLORING_COLORS: i64 = 8;

fn build_knapsack(n: u32) -> Dag {
    let domains = vec![(0, 1); n as usize];
    let initial = vec![DecisionValue::Int(0); n as usize];
    let mut dag = Dag::new(&initial, &domains, f64::INFINITY);
    let weight_sum = dag.add_invariant(
        "weight_sum",
        Box::new(ScalarProductInvariant::new((0..n).map(|i| (i, (i % 7 + 1) as f64)).collect())),
        NodeKind::Other,
        &(0..n).collect::<Vec<_>>(),
    );
    let value_sum_negated = dag.add_invariant(
        "value_sum_negated",
        Box::new(ScalarProductInvariant::new((0..n).map(|i| (i, -((i % 11 + 1) as f64))).collect())),
        NodeKind::Other,
        &(0..n).collect::<Vec<_>>(),
    );
    dag.add_invariant("objective", Box::new(ObjectiveInvariant), NodeKind::Other, &[value_sum_negated]);
    dag.add_invariant("capacity", Box::new(ComparatorInvariant::new((n as f64) * 2.0, 0.0)), NodeKind::Other, &[weight_sum]);
    dag.init().expect("benchmark DAG must be well-formed");
    dag
}

fn build_coloring(n: u32, max_color: i64) -> Dag {
    let domains = vec![(1, max_color); n as usize];
    let initial = vec![DecisionValue::Int(1); n as usize];
    let mut dag = Dag::new(&initial, &domains, f64::INFINITY);

    let mut used_colors = Vec::new();
    for color in 1..=max_color {
        let is_eq: Vec<u32> = (0..n).map(|node| dag.add_invariant(format!("n{node}_is_{color}"), Box::new(IsEqualInvariant { v: color }), NodeKind::Other, &[node])).collect();
        let initial_true_count = if color == 1 { n } else { 0 };
        used_colors.push(dag.add_invariant(format!("color{color}_used"), Box::new(OrInvariant::new(initial_true_count)), NodeKind::Other, &is_eq));
    }
    let color_count = dag.add_invariant("color_count", Box::new(SumInvariant), NodeKind::Other, &used_colors);
    dag.add_invariant("objective", Box::new(ObjectiveInvariant), NodeKind::Other, &[color_count]);

    let edges: Vec<(u32, u32)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
    let violations: Vec<u32> = edges
        .iter()
        .map(|&(a, b)| dag.add_invariant(format!("edge_{a}_{b}"), Box::new(RelationalInvariant::new(RelOp::NotEqual, a, b, 1, 1)), NodeKind::Other, &[a, b]))
        .collect();
    let violation_sum = dag.add_invariant("violation_sum", Box::new(SumInvariant), NodeKind::Other, &violations);
    dag.add_invariant("edges_ok", Box::new(ComparatorInvariant::new(0.0, n as f64)), NodeKind::Other, &[violation_sum]);

    dag.init().expect("benchmark DAG must be well-formed");
    dag
}

#[divan::bench]
fn knapsack_full_fixpoint() -> ResultFull {
    let mut dag = build_knapsack(KNAPSACK_SIZE);
    dag.run_init()
}

#[divan::bench]
fn knapsack_delta_hot_loop(bencher: divan::Bencher) {
    let mut dag = build_knapsack(KNAPSACK_SIZE);
    let mv = Move::new(vec![(0, DecisionValue::Int(1)), (1, DecisionValue::Int(1))]);
    bencher.bench_local(|| dag.run_delta(&mv));
}

#[divan::bench]
fn graph_coloring_full_fixpoint() -> ResultFull {
    let mut dag = build_coloring(COLORING_NODES, COLORING_COLORS);
    dag.run_init()
}

#[divan::bench]
fn graph_coloring_delta_hot_loop(bencher: divan::Bencher) {
    let mut dag = build_coloring(COLORING_NODES, COLORING_COLORS);
    let mv = Move::new(vec![(0, DecisionValue::Int(2))]);
    bencher.bench_local(|| dag.run_delta(&mv));
}

fn main() {
    divan::main();
}

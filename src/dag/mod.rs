//! The DAG core: invariants as nodes with parent/child adjacency, a
//! topological order, message plumbing, and the run-mode traversal that
//! drives incremental (re-)evaluation.

pub mod invariant;
pub mod message;

use crate::{CoreError, DecisionValue, Move, StructuralError};

use invariant::Invariant;
use message::{DAGMessage, InputSlot, ResultDelta, ResultFull, VarMessage};

/// One of the four traversal modes described in §4.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Init,
    Full,
    Delta,
    Output,
}

/// A builder-relevant descriptor attached to each node at construction
/// time, so the DAG → CP translator (§4.7) can recover the parameters it
/// needs (a scale factor, a relation operator, a table) without having to
/// downcast the opaque `Box<dyn Invariant>`.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The sentinel head of a decision variable.
    Sentinel { var_index: u32, domain: (i64, i64) },
    /// `ScaleInvariant(alpha)`.
    Scale { alpha: f64 },
    /// `ElementInvariant(elements)`.
    Element { elements: Vec<i64> },
    /// DAG-level `OrInvariant` over boolean parents.
    Or,
    /// `RelationalInvariant{op=NotEqual}` over two integer parents.
    NotEqual,
    /// Standalone `ComparatorInvariant(limit)`.
    Comparator { limit: f64 },
    /// `Composite(AmongInvariant(set), ComparatorInvariant(limit))`.
    AmongUpComposite { set: Vec<i64>, limit: f64 },
    /// Anything without a CP translation.
    Other,
}

/// A [`invariant::Invariant`] that is, at the same time, the head of a
/// decision variable: it has no parents and simply republishes the
/// variable's current value on every run.
#[derive(Debug, Clone)]
struct SentinelInvariant {
    var_index: u32,
    current: DecisionValue,
}

impl Invariant for SentinelInvariant {
    fn input_type(&self) -> message::InputType {
        message::InputType::Single
    }

    fn category(&self) -> invariant::Category {
        invariant::Category::Stateful
    }

    fn init(&mut self, _slot: &InputSlot) -> DAGMessage {
        DAGMessage::SingleVarFull(VarMessage {
            index: self.var_index,
            value: self.current,
        })
    }

    fn eval_full(&self, _slot: &InputSlot) -> DAGMessage {
        DAGMessage::SingleVarFull(VarMessage {
            index: self.var_index,
            value: self.current,
        })
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        // The move itself is injected into this node's own slot by the
        // traversal seed, as a `MoveDelta`; echo it straight through.
        slot.single.clone().unwrap_or(DAGMessage::NoMessage)
    }

    fn commit(&mut self, slot: &InputSlot) {
        if let Some(DAGMessage::MoveDelta { new, .. }) = &slot.single {
            self.current = new.value;
        }
    }
}

/// The unique sink appended by `init`: folds whatever `ObjectiveDelta` /
/// `ConstraintDelta` messages reached it into a single [`ResultDelta`].
#[derive(Debug, Clone, Default)]
struct ResultInvariant {
    current_constraint: f64,
    current_objective: f64,
}

impl Invariant for ResultInvariant {
    fn input_type(&self) -> message::InputType {
        message::InputType::Multi
    }

    fn category(&self) -> invariant::Category {
        invariant::Category::Stateful
    }

    fn is_hard_constraint(&self) -> bool {
        true
    }

    fn init(&mut self, slot: &InputSlot) -> DAGMessage {
        // A full run re-establishes ground truth rather than accumulating
        // on top of whatever state a previous run left behind, so this
        // can be safely called again later (e.g. to audit the DAG after a
        // run of commits) without drifting from the true aggregate.
        let objective = slot.multi_sum_like(&DAGMessage::ObjectiveFull(message::Scalar::ZERO)).0;
        let constraint = slot.multi_sum_like(&DAGMessage::ConstraintFull(message::Scalar::ZERO)).0;
        self.current_objective = objective;
        self.current_constraint = constraint;
        DAGMessage::ResultFull(ResultFull {
            objective,
            constraint,
            feasible: constraint == 0.0,
        })
    }

    fn eval_full(&self, slot: &InputSlot) -> DAGMessage {
        let objective = slot.multi_sum_like(&DAGMessage::ObjectiveFull(message::Scalar::ZERO)).0;
        let constraint = slot.multi_sum_like(&DAGMessage::ConstraintFull(message::Scalar::ZERO)).0;
        DAGMessage::ResultFull(ResultFull {
            objective,
            constraint,
            feasible: constraint == 0.0,
        })
    }

    fn eval_delta(&self, slot: &InputSlot) -> DAGMessage {
        let objective_delta = slot.multi_sum_like(&DAGMessage::ObjectiveDelta(message::Scalar::ZERO)).0;
        let constraint_delta = slot.multi_sum_like(&DAGMessage::ConstraintDelta(message::Scalar::ZERO)).0;
        DAGMessage::ResultDelta(ResultDelta {
            objective_delta,
            constraint_delta,
            feasible: self.current_constraint + constraint_delta == 0.0,
        })
    }

    fn commit(&mut self, slot: &InputSlot) {
        self.current_objective += slot.multi_sum_like(&DAGMessage::ObjectiveDelta(message::Scalar::ZERO)).0;
        self.current_constraint += slot.multi_sum_like(&DAGMessage::ConstraintDelta(message::Scalar::ZERO)).0;
    }
}

/// A directed acyclic graph of invariants: the engine's single most
/// central data structure (§3).
#[derive(Clone)]
pub struct Dag {
    invariants: Vec<Box<dyn Invariant>>,
    names: Vec<String>,
    kinds: Vec<NodeKind>,
    parents: Vec<Vec<u32>>,
    children: Vec<Vec<u32>>,
    var_to_first_invariant: Vec<u32>,
    early_stop_threshold: f64,
    is_init: bool,
    n_vars: u32,
    slots: Vec<InputSlot>,
    touched: Vec<bool>,
    /// The variables' current values, authoritative for building `MoveDelta`
    /// envelopes; kept in sync with accepted moves by `commit`.
    current_values: Vec<DecisionValue>,
    pending_move: Vec<(u32, DecisionValue)>,
}

impl Dag {
    /// Creates a DAG with one sentinel `SentinelInvariant` per decision
    /// value in `initial_assignment`, each tagged with its domain bounds
    /// for the benefit of the CP builder.
    pub fn new(initial_assignment: &[DecisionValue], domains: &[(i64, i64)], early_stop_threshold: f64) -> Self {
        assert_eq!(initial_assignment.len(), domains.len());
        let n_vars = initial_assignment.len() as u32;
        let invariants: Vec<Box<dyn Invariant>> = initial_assignment
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                Box::new(SentinelInvariant {
                    var_index: i as u32,
                    current: v,
                }) as Box<dyn Invariant>
            })
            .collect();
        let names = (0..n_vars).map(|i| format!("decision_var[{i}]")).collect();
        let kinds = domains
            .iter()
            .enumerate()
            .map(|(i, &domain)| NodeKind::Sentinel { var_index: i as u32, domain })
            .collect();
        let parents = vec![Vec::new(); n_vars as usize];
        let children = vec![Vec::new(); n_vars as usize];
        let var_to_first_invariant = (0..n_vars).collect();
        Self {
            invariants,
            names,
            kinds,
            parents,
            children,
            var_to_first_invariant,
            early_stop_threshold,
            is_init: false,
            n_vars,
            slots: Vec::new(),
            touched: Vec::new(),
            current_values: initial_assignment.to_vec(),
            pending_move: Vec::new(),
        }
    }

    /// Adds a non-sentinel invariant with the given parents. Panics
    /// (programmer error) if called after `init`.
    pub fn add_invariant(&mut self, name: impl Into<String>, invariant: Box<dyn Invariant>, kind: NodeKind, parents: &[u32]) -> u32 {
        assert!(!self.is_init, "cannot mutate DAG shape after init");
        let idx = self.invariants.len() as u32;
        self.invariants.push(invariant);
        self.names.push(name.into());
        self.kinds.push(kind);
        self.parents.push(parents.to_vec());
        self.children.push(Vec::new());
        for &p in parents {
            self.children[p as usize].push(idx);
        }
        idx
    }

    pub fn kind(&self, idx: u32) -> &NodeKind {
        &self.kinds[idx as usize]
    }

    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    pub fn is_init(&self) -> bool {
        self.is_init
    }

    pub fn using_cp(&self, idx: u32) -> bool {
        !matches!(self.kinds[idx as usize], NodeKind::Other)
    }

    pub fn name(&self, idx: u32) -> &str {
        &self.names[idx as usize]
    }

    pub fn parents(&self, idx: u32) -> &[u32] {
        &self.parents[idx as usize]
    }

    pub fn var_to_first_invariant(&self, var: u32) -> u32 {
        self.var_to_first_invariant[var as usize]
    }

    pub fn sink(&self) -> u32 {
        self.invariants.len() as u32 - 1
    }

    /// Appends the sink, runs Kahn's algorithm, and renumbers every
    /// array into topological order.
    pub fn init(&mut self) -> Result<(), CoreError> {
        assert!(!self.is_init, "DAG already initialized");

        let leaves: Vec<u32> = (0..self.invariants.len() as u32).filter(|&i| self.children[i as usize].is_empty()).collect();
        if leaves.is_empty() && self.invariants.len() as u32 == self.n_vars {
            return Err(CoreError::Structural(StructuralError::MissingSink));
        }
        self.add_invariant("result", Box::new(ResultInvariant::default()), NodeKind::Other, &leaves);

        let n = self.invariants.len();
        for i in self.n_vars as usize..n - 1 {
            if self.parents[i].is_empty() {
                return Err(CoreError::Structural(StructuralError::OrphanInvariant(i as u32)));
            }
        }

        let mut in_degree: Vec<u32> = self.parents.iter().map(|p| p.len() as u32).collect();
        let mut queue: std::collections::VecDeque<u32> = (0..n as u32).filter(|&i| in_degree[i as usize] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(i) = queue.pop_front() {
            order.push(i);
            for &c in &self.children[i as usize] {
                in_degree[c as usize] -= 1;
                if in_degree[c as usize] == 0 {
                    queue.push_back(c);
                }
            }
        }
        if order.len() != n {
            return Err(CoreError::Structural(StructuralError::Cycle));
        }

        let mut rank = vec![0u32; n];
        for (new_idx, &old_idx) in order.iter().enumerate() {
            rank[old_idx as usize] = new_idx as u32;
        }
        let remap = |ids: &[u32]| -> Vec<u32> { ids.iter().map(|&i| rank[i as usize]).collect() };

        let mut new_invariants: Vec<Option<Box<dyn Invariant>>> = self.invariants.drain(..).map(Some).collect();
        self.invariants = order.iter().map(|&old| new_invariants[old as usize].take().unwrap()).collect();
        self.names = order.iter().map(|&old| std::mem::take(&mut self.names[old as usize])).collect::<Vec<_>>();
        self.kinds = order.iter().map(|&old| self.kinds[old as usize].clone()).collect();
        self.parents = order.iter().map(|&old| remap(&self.parents[old as usize])).collect();
        self.children = order.iter().map(|&old| remap(&self.children[old as usize])).collect();
        self.var_to_first_invariant = self.var_to_first_invariant.iter().map(|&old| rank[old as usize]).collect();

        self.slots = vec![InputSlot::default(); n];
        self.touched = vec![false; n];
        self.is_init = true;
        Ok(())
    }

    fn should_early_stop(&self, m: &DAGMessage) -> bool {
        matches!(m, DAGMessage::ConstraintDelta(s) if s.0 > self.early_stop_threshold)
    }

    /// Seeds `istouched` for a move: every sentinel of a touched
    /// variable, every direct child of those, and the sink (to
    /// guarantee the aggregator always runs).
    fn seed_touched(&mut self, touched_vars: impl Iterator<Item = u32>) {
        for s in self.touched.iter_mut() {
            *s = false;
        }
        for v in touched_vars {
            let i = self.var_to_first_invariant(v) as usize;
            self.touched[i] = true;
            for &c in &self.children[i] {
                self.touched[c as usize] = true;
            }
        }
        let sink = self.sink() as usize;
        self.touched[sink] = true;
    }

    /// Runs a `DeltaRun` for `mv` and returns the sink's `ResultDelta`
    /// without mutating any invariant's committed state. Returns `None`
    /// if early-stopped, with the early-stop result placed in `Ok`.
    pub fn run_delta(&mut self, mv: &Move) -> ResultDelta {
        assert!(self.is_init, "run_delta on an uninitialized DAG");
        for slot in &mut self.slots {
            slot.clear();
        }
        self.seed_touched(mv.touched_vars());
        self.pending_move = mv.assignments.clone();
        for (var, value) in &mv.assignments {
            let i = self.var_to_first_invariant(*var) as usize;
            let old = self.current_values[*var as usize];
            self.slots[i].single = Some(DAGMessage::MoveDelta {
                old: VarMessage { index: *var, value: old },
                new: VarMessage { index: *var, value: *value },
            });
        }

        let n = self.invariants.len();
        for i in 0..n {
            if !self.touched[i] {
                continue;
            }
            let m = self.invariants[i].eval_delta(&self.slots[i]);
            if self.should_early_stop(&m) {
                return ResultDelta {
                    objective_delta: f64::INFINITY,
                    constraint_delta: f64::INFINITY,
                    feasible: false,
                };
            }
            if m.is_no_message() || m.is_zero() {
                continue;
            }
            for &c in self.children[i].clone().iter() {
                let input_type = self.invariants[c as usize].input_type();
                self.slots[c as usize].push(input_type, m.clone());
                self.touched[c as usize] = true;
            }
            if i == self.sink() as usize {
                if let DAGMessage::ResultDelta(rd) = m {
                    return rd;
                }
            }
        }

        ResultDelta {
            objective_delta: 0.0,
            constraint_delta: 0.0,
            feasible: true,
        }
    }

    /// Commits a just-evaluated delta: calls `commit` on every touched
    /// invariant and advances `current_values`. Programmer error to call
    /// after an early-stopped run.
    pub fn commit(&mut self) {
        assert!(self.is_init, "commit on an uninitialized DAG");
        let n = self.invariants.len();
        for i in 0..n {
            if self.touched[i] {
                self.invariants[i].commit(&self.slots[i]);
            }
        }
        for (var, value) in self.pending_move.drain(..) {
            self.current_values[var as usize] = value;
        }
    }

    /// Runs an `InitRun`: every node is touched, `init` is called, and
    /// each invariant records full state from `initial`.
    pub fn run_init(&mut self) -> ResultFull {
        assert!(self.is_init, "run_init before DAG::init");
        for slot in &mut self.slots {
            slot.clear();
        }
        for t in &mut self.touched {
            *t = true;
        }
        let n = self.invariants.len();
        let mut last = DAGMessage::NoMessage;
        for i in 0..n {
            let m = self.invariants[i].init(&self.slots[i]);
            if m.is_no_message() {
                continue;
            }
            for &c in self.children[i].clone().iter() {
                let input_type = self.invariants[c as usize].input_type();
                self.slots[c as usize].push(input_type, m.clone());
            }
            last = m;
        }
        match last {
            DAGMessage::ResultFull(r) => r,
            _ => ResultFull {
                objective: 0.0,
                constraint: 0.0,
                feasible: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::invariant::test_support::EchoInvariant;
    use crate::dag::message::InputType;

    #[test]
    fn init_appends_sink_and_detects_missing_parent() {
        let mut dag = Dag::new(&[DecisionValue::Int(1)], &[(0, 10)], 1e9);
        dag.add_invariant(
            "echo",
            Box::new(EchoInvariant { input_type: InputType::Single }),
            NodeKind::Other,
            &[0],
        );
        assert!(dag.init().is_ok());
        assert_eq!(dag.name(dag.sink()), "result");
    }

    #[test]
    fn orphan_invariant_is_rejected() {
        let mut dag = Dag::new(&[DecisionValue::Int(1)], &[(0, 10)], 1e9);
        dag.add_invariant("orphan", Box::new(EchoInvariant { input_type: InputType::Single }), NodeKind::Other, &[]);
        let err = dag.init().unwrap_err();
        assert!(matches!(err, CoreError::Structural(StructuralError::OrphanInvariant(_))));
    }

    #[test]
    fn run_delta_and_commit_advance_current_values() {
        let mut dag = Dag::new(&[DecisionValue::Int(1), DecisionValue::Int(2)], &[(0, 10), (0, 10)], 1e9);
        dag.add_invariant(
            "sum",
            Box::new(crate::invariants::arithmetic::SumInvariant),
            NodeKind::Other,
            &[0, 1],
        );
        dag.init().unwrap();
        let mv = Move::new(vec![(0, DecisionValue::Int(5))]);
        let result = dag.run_delta(&mv);
        assert!(result.feasible);
        dag.commit();
        assert_eq!(dag.current_values[0], DecisionValue::Int(5));
    }

    #[test]
    fn vector_node_sums_both_sentinel_parents_correctly() {
        // Regression test: a child's InputSlot must be filled according to
        // its OWN input_type, not the producing parent's. Both sentinels
        // are `Single`-typed; the sum node is `Vector`-typed and must see
        // both contributions, not just the last one written.
        let mut dag = Dag::new(&[DecisionValue::Int(1), DecisionValue::Int(2)], &[(0, 10), (0, 10)], 1e9);
        let sum = dag.add_invariant(
            "sum",
            Box::new(crate::invariants::arithmetic::SumInvariant),
            NodeKind::Other,
            &[0, 1],
        );
        dag.add_invariant(
            "objective",
            Box::new(crate::invariants::aggregate::ObjectiveInvariant),
            NodeKind::Other,
            &[sum],
        );
        dag.init().unwrap();
        let mv = Move::new(vec![(0, DecisionValue::Int(5)), (1, DecisionValue::Int(9))]);
        let result = dag.run_delta(&mv);
        // sum goes from 1+2=3 to 5+9=14, delta=11
        assert_eq!(result.objective_delta, 11.0);
        assert!(result.feasible);
    }
}

use derive_more::{Display, Error};

pub mod builder;
pub mod callback;
pub mod cp;
pub mod dag;
pub mod domain;
pub mod invariants;
pub mod trail;

#[cfg(test)]
pub mod tests;

/// Plain-struct engine configuration: no proc-macro option registry, since
/// there is no continuous-solver option surface left to generate one for.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub early_stop_threshold: f64,
    pub parallel_batch_size: usize,
    pub iteration_limit: Option<usize>,
    pub time_limit_secs: Option<u64>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            early_stop_threshold: f64::INFINITY,
            parallel_batch_size: 64,
            iteration_limit: None,
            time_limit_secs: None,
        }
    }
}

impl EngineOptions {
    pub fn with_early_stop_threshold(mut self, threshold: f64) -> Self {
        self.early_stop_threshold = threshold;
        self
    }

    pub fn with_parallel_batch_size(mut self, size: usize) -> Self {
        self.parallel_batch_size = size;
        self
    }

    pub fn with_iteration_limit(mut self, limit: usize) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    pub fn with_time_limit_secs(mut self, secs: u64) -> Self {
        self.time_limit_secs = Some(secs);
        self
    }
}

/// Status codes for the local-search engine and the outer optimize loop.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Status {
    #[default]
    /// The engine or outer loop is still running.
    InProgress,
    /// A batch of moves converged on an improving assignment.
    Converged,
    /// The evaluated move (or the whole problem) is infeasible.
    Infeasible,
    /// The outer loop stopped due to a time limit.
    TimeLimit,
    /// The outer loop stopped due to an iteration limit.
    IterationLimit,
    /// The outer loop was interrupted (e.g., by Ctrl-C).
    Interrupted,
}

/// Errors surfaced across the DAG/CP boundary.
///
/// Structural and programmer errors (§7 of the design) are not unified
/// here: a cycle or missing sink is detected once, at `DAG::init`, and is
/// fatal, so it is returned as a `CoreError`; committing an early-stopped
/// run or mutating an initialized DAG's shape is a programmer error and
/// panics instead, because continuing would violate an invariant the rest
/// of the engine relies on.
#[derive(Debug, Display, Error, PartialEq, Eq, Clone)]
pub enum CoreError {
    /// The DAG's shape is invalid.
    #[display("{_0}")]
    Structural(StructuralError),
    /// The CP model proved the whole problem infeasible at construction.
    #[display("CP model is infeasible")]
    Infeasible,
}

/// Ways a DAG can fail `init`'s shape checks.
#[derive(Debug, Display, Error, PartialEq, Eq, Clone, Copy)]
pub enum StructuralError {
    /// Kahn's algorithm did not emit every node: the adjacency contains a cycle.
    #[display("DAG contains a cycle")]
    Cycle,
    /// No invariant has out-degree zero before the sink is appended.
    #[display("DAG has no sink invariant")]
    MissingSink,
    /// A non-sentinel invariant has no parent.
    #[display("invariant {_0} has no parent")]
    OrphanInvariant(#[error(not(source))] u32),
}

/// A decision value: the atomic unit every invariant input is ultimately
/// derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DecisionValue {
    #[display("{_0}")]
    Int(i64),
    #[display("{_0}")]
    Binary(bool),
}

impl DecisionValue {
    pub fn is_zero(&self) -> bool {
        match self {
            DecisionValue::Int(v) => *v == 0,
            DecisionValue::Binary(b) => !*b,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            DecisionValue::Int(v) => *v,
            DecisionValue::Binary(b) => *b as i64,
        }
    }
}

impl Default for DecisionValue {
    fn default() -> Self {
        DecisionValue::Int(0)
    }
}

/// A single decision variable owned by the optimization model.
///
/// Mutated only by `apply_move`, which is the outer model's job; the core
/// only ever reads `current_value` and `domain`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionVariable {
    pub index: u32,
    pub domain: Vec<DecisionValue>,
    pub current_value: DecisionValue,
}

impl DecisionVariable {
    pub fn new(index: u32, domain: Vec<DecisionValue>, current_value: DecisionValue) -> Self {
        debug_assert!(
            domain.contains(&current_value),
            "current_value must belong to domain"
        );
        Self {
            index,
            domain,
            current_value,
        }
    }

    /// Assigns a new current value. Panics (programmer error) if the value
    /// is not in the domain.
    pub fn apply_move(&mut self, value: DecisionValue) {
        debug_assert!(
            self.domain.contains(&value),
            "apply_move value must belong to domain"
        );
        self.current_value = value;
    }
}

/// A proposed change in the values of a subset of decision variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Move {
    pub assignments: Vec<(u32, DecisionValue)>,
}

impl Move {
    pub fn new(assignments: Vec<(u32, DecisionValue)>) -> Self {
        Self { assignments }
    }

    pub fn touched_vars(&self) -> impl Iterator<Item = u32> + '_ {
        self.assignments.iter().map(|(idx, _)| *idx)
    }
}
